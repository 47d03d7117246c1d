use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use reqwest::{Client, ClientBuilder, Proxy};
use std::time::Duration;

use crate::config::Config;

const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Proxy endpoint parsed from `ip:port` or `ip:port:username:password`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    pub host: String,
    pub port: u16,
    pub credentials: Option<(String, String)>,
}

impl ProxySpec {
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        let (host, port, credentials) = match parts.as_slice() {
            [host, port] => (*host, *port, None),
            [host, port, user, pass] => (*host, *port, Some((user.to_string(), pass.to_string()))),
            _ => return None,
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            port: port.parse().ok()?,
            credentials,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn to_reqwest(&self) -> Result<Proxy> {
        let proxy = Proxy::all(self.url())
            .with_context(|| format!("Invalid proxy {}:{}", self.host, self.port))?;
        Ok(match &self.credentials {
            Some((user, pass)) => proxy.basic_auth(user, pass),
            None => proxy,
        })
    }
}

/// Client for one session: random user agent from the config, proxy picked
/// by rotating `slot` over the configured list.
pub fn create_client(config: &Config, slot: usize) -> Result<Client> {
    let user_agent = config
        .user_agents
        .choose(&mut rand::thread_rng())
        .map(String::as_str)
        .unwrap_or(FALLBACK_USER_AGENT);

    let mut builder = ClientBuilder::new()
        .user_agent(user_agent)
        .cookie_store(true)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10));

    let proxies: Vec<ProxySpec> = config
        .proxies
        .iter()
        .filter_map(|raw| ProxySpec::parse(raw))
        .collect();
    if let Some(proxy) = proxies.get(slot % proxies.len().max(1)) {
        builder = builder.proxy(proxy.to_reqwest()?);
    }

    builder.build().context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_authenticated_proxies() {
        assert_eq!(
            ProxySpec::parse("10.0.0.1:8080"),
            Some(ProxySpec {
                host: "10.0.0.1".into(),
                port: 8080,
                credentials: None,
            })
        );
        let auth = ProxySpec::parse(" 10.0.0.2:3128:alice:s3cret ").unwrap();
        assert_eq!(auth.credentials, Some(("alice".into(), "s3cret".into())));
        assert_eq!(auth.url(), "http://10.0.0.2:3128");
    }

    #[test]
    fn rejects_malformed_proxies() {
        assert_eq!(ProxySpec::parse("10.0.0.1"), None);
        assert_eq!(ProxySpec::parse("10.0.0.1:port"), None);
        assert_eq!(ProxySpec::parse("a:1:b"), None);
        assert_eq!(ProxySpec::parse(":8080"), None);
    }

    #[test]
    fn builds_client_with_rotating_proxy() {
        let config = Config {
            proxies: vec!["10.0.0.1:8080".into(), "bogus".into()],
            ..Config::default()
        };
        assert!(create_client(&config, 0).is_ok());
        assert!(create_client(&config, 7).is_ok());
    }
}
