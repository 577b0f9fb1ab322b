// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Everything tunable about a crawl run lives in one value that is handed to
// the Fetcher when it is built. There is no global state, so two runs with
// different settings can exist side by side (the tests rely on this).
//
// The defaults are the fixed constants the crawler always used:
// 5 connections per host, 10 matches per selector, plain http://.
// A JSON file can override any subset of them.
// =============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MAX_CONNECTIONS_PER_HOST: usize = 5;
pub const SEARCH_LIMIT: usize = 10;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/110.0";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Upper bound on simultaneous in-flight requests to one host
    pub max_connections_per_host: usize,
    /// Upper bound on matches any single selector query may return
    pub search_limit: usize,
    /// Total per-request timeout (connect + headers + body)
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Extra request headers sent with every GET
    pub headers: BTreeMap<String, String>,
    /// Scheme prefixed onto every site, no negotiation
    pub scheme: String,
    /// Pattern searched for in id / class / alt attributes
    pub logo_pattern: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
        );
        headers.insert("Accept-Encoding".to_string(), "gzip, deflate, br".to_string());
        headers.insert("Pragma".to_string(), "no-cache".to_string());

        Self {
            max_connections_per_host: MAX_CONNECTIONS_PER_HOST,
            search_limit: SEARCH_LIMIT,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            user_agent: USER_AGENT.to_string(),
            headers,
            scheme: "http".to_string(),
            logo_pattern: "logo".to_string(),
        }
    }
}

impl CrawlConfig {
    /// Loads a config from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config: CrawlConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    // A limit of 0 would deadlock every request to a host, so clamp it.
    pub fn connections_per_host(&self) -> usize {
        self.max_connections_per_host.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_connections_per_host, 5);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.scheme, "http");
        assert_eq!(config.headers.get("Pragma").map(String::as_str), Some("no-cache"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{"max_connections_per_host": 2, "timeout_secs": 3}"#).unwrap();
        assert_eq!(config.max_connections_per_host, 2);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.logo_pattern, "logo");
    }

    #[test]
    fn test_zero_connections_is_clamped() {
        let config = CrawlConfig {
            max_connections_per_host: 0,
            ..CrawlConfig::default()
        };
        assert_eq!(config.connections_per_host(), 1);
    }
}
