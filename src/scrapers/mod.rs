use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

mod amazon;
mod fetcher;
mod probe;
mod session;

pub use amazon::extract_fields;
pub use fetcher::PageFetcher;
pub use session::HttpSession;

/// A single browser-like session: one current page at a time, navigated
/// sequentially. Not shared between callers.
#[async_trait]
pub trait PageSession: Send {
    /// Load `url` as the current page. Errors only on transport failure.
    async fn navigate(&mut self, url: &Url) -> Result<()>;

    /// Raw HTML of the current page, empty before the first navigation.
    fn page_source(&self) -> &str;

    /// Block until `css` is present on the current page or `timeout` elapses.
    async fn wait_for(&mut self, css: &str, timeout: Duration) -> bool;

    /// Nudge lazy-loaded content into the page.
    async fn scroll(&mut self) -> Result<()> {
        Ok(())
    }

    fn page_title(&self) -> String {
        let document = Html::parse_document(self.page_source());
        let selector = match Selector::parse("title") {
            Ok(selector) => selector,
            Err(_) => return String::new(),
        };
        document
            .select(&selector)
            .next()
            .map(|title| crate::parsers::clean_text(&title.text().collect::<String>()))
            .unwrap_or_default()
    }
}

/// Whether the current page contains an element matching `css`.
pub fn has_element(source: &str, css: &str) -> bool {
    match Selector::parse(css) {
        Ok(selector) => Html::parse_document(source).select(&selector).next().is_some(),
        Err(_) => false,
    }
}
