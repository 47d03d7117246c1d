use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub ready_selector: String,
    pub delays: DelayConfig,
    pub retry: RetryConfig,
    /// Upper bound on images kept per product. `0` keeps every image found.
    pub max_images: usize,
    pub workers: usize,
    pub output_suffix: String,
    pub user_agents: Vec<String>,
    /// `ip:port` or `ip:port:username:password`
    pub proxies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub before_navigation: JitterRange,
    pub after_navigation: JitterRange,
    pub between_items: JitterRange,
    pub retry_backoff: JitterRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min_seconds: f64,
    pub max_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl JitterRange {
    pub const fn new(min_seconds: f64, max_seconds: f64) -> Self {
        Self {
            min_seconds,
            max_seconds,
        }
    }

    /// Bounds ordered low to high, clamped at zero.
    pub fn bounds(&self) -> (f64, f64) {
        let a = self.min_seconds.max(0.0);
        let b = self.max_seconds.max(0.0);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn scaled(&self, factor: u32) -> Self {
        let factor = f64::from(factor.max(1));
        Self::new(self.min_seconds * factor, self.max_seconds * factor)
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            before_navigation: JitterRange::new(1.0, 3.0),
            after_navigation: JitterRange::new(3.0, 5.0),
            between_items: JitterRange::new(2.5, 4.0),
            retry_backoff: JitterRange::new(5.0, 10.0),
        }
    }
}

#[cfg(test)]
impl JitterRange {
    pub const ZERO: JitterRange = JitterRange::new(0.0, 0.0);
}

#[cfg(test)]
impl DelayConfig {
    pub fn none() -> Self {
        Self {
            before_navigation: JitterRange::ZERO,
            after_navigation: JitterRange::ZERO,
            between_items: JitterRange::ZERO,
            retry_backoff: JitterRange::ZERO,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.com/dp/".to_string(),
            timeout_seconds: 20,
            ready_selector: "#productTitle".to_string(),
            delays: DelayConfig::default(),
            retry: RetryConfig::default(),
            max_images: 5,
            workers: 3,
            output_suffix: "_update".to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0".to_string(),
            ],
            proxies: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults, then `path` (or `amazon_import.*` in the working directory
    /// when absent), then `AMAZON_IMPORT__*` environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("amazon_import").required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix("AMAZON_IMPORT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("user_agents")
                    .with_list_parse_key("proxies")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn image_cap(&self) -> Option<usize> {
        (self.max_images > 0).then_some(self.max_images)
    }
}
