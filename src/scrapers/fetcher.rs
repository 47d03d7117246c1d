use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

use super::PageSession;
use crate::config::{Config, JitterRange};
use crate::models::ProductIdentifier;
use crate::utils::delay::jitter;

/// Bounded retry at the fetch boundary: `max_attempts` tries, waiting a
/// random backoff that grows with each failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: JitterRange,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry.max_attempts.max(1),
            backoff: config.delays.retry_backoff,
        }
    }

    pub fn backoff_after(&self, attempt: u32) -> JitterRange {
        self.backoff.scaled(attempt)
    }
}

/// Drives one page session to product pages and reports whether each one
/// finished loading. Page content is read back through [`page_source`].
///
/// [`page_source`]: PageFetcher::page_source
pub struct PageFetcher<S> {
    session: S,
    base_url: Url,
    ready_selector: String,
    timeout: Duration,
    retry: RetryPolicy,
    before_navigation: JitterRange,
    after_navigation: JitterRange,
}

impl<S: PageSession> PageFetcher<S> {
    pub fn new(session: S, config: &Config) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).with_context(|| format!("Invalid base URL {}", base))?;

        Ok(Self {
            session,
            base_url,
            ready_selector: config.ready_selector.clone(),
            timeout: config.timeout(),
            retry: RetryPolicy::from_config(config),
            before_navigation: config.delays.before_navigation,
            after_navigation: config.delays.after_navigation,
        })
    }

    /// `<base_url>/<identifier>`, with the identifier percent-encoded as a
    /// single path segment.
    pub fn product_url(&self, id: &ProductIdentifier) -> Result<Url> {
        if matches!(id.as_str(), "." | "..") {
            bail!("Cannot build product URL for {}", id);
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Cannot build product URL for {} from {}", id, self.base_url))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    pub fn page_source(&self) -> &str {
        self.session.page_source()
    }

    #[cfg(test)]
    fn session(&self) -> &S {
        &self.session
    }

    /// Load the product page, retrying per the policy. `false` means the
    /// identifier should be skipped for this run.
    pub async fn load(&mut self, id: &ProductIdentifier) -> bool {
        let attempts = self.retry.max_attempts;
        for attempt in 1..=attempts {
            if self.try_load(id).await {
                return true;
            }
            if attempt < attempts {
                info!("Retrying {} (attempt {}/{})", id, attempt + 1, attempts);
                jitter(self.retry.backoff_after(attempt)).await;
            }
        }
        error!("Could not load product page for {} after {} attempts", id, attempts);
        false
    }

    async fn try_load(&mut self, id: &ProductIdentifier) -> bool {
        let url = match self.product_url(id) {
            Ok(url) => url,
            Err(e) => {
                warn!("{:#}", e);
                return false;
            }
        };

        jitter(self.before_navigation).await;

        if let Err(e) = self.session.navigate(&url).await {
            warn!("Navigation failed for {}: {:#}", id, e);
            return false;
        }

        if !self.session.wait_for(&self.ready_selector, self.timeout).await {
            warn!("Timeout loading page for {}", id);
            if looks_like_captcha(&self.session.page_title(), self.session.page_source()) {
                error!("CAPTCHA page served for {}; the IP may be temporarily blocked", id);
            }
            return false;
        }

        jitter(self.after_navigation).await;

        if let Err(e) = self.session.scroll().await {
            warn!("Could not scroll page for {}: {:#}", id, e);
        }
        true
    }
}

/// Best-effort anti-bot page heuristic.
pub fn looks_like_captcha(title: &str, source: &str) -> bool {
    title.to_lowercase().contains("captcha") || source.to_lowercase().contains("robot")
}
