use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{has_element, PageSession};

/// Page session backed by plain HTTP. Each navigation replaces the current
/// document; the page never changes afterwards, so readiness is checked once.
pub struct HttpSession {
    client: Client,
    source: String,
}

impl HttpSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            source: String::new(),
        }
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        self.source.clear();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to load {}", url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, url);
        }

        self.source = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        debug!("Loaded {} ({} bytes)", url, self.source.len());
        Ok(())
    }

    fn page_source(&self) -> &str {
        &self.source
    }

    async fn wait_for(&mut self, css: &str, _timeout: Duration) -> bool {
        has_element(&self.source, css)
    }
}
