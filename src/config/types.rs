use crate::crawler::CustomerTier;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Tiered-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retries: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Returns the per-fetch retry budget for a customer tier
    pub fn retries_for(&self, tier: CustomerTier) -> u32 {
        match tier {
            CustomerTier::Standard => self.retries.standard,
            CustomerTier::Priority => self.retries.priority,
        }
    }

    /// Returns the cache freshness window
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }
}

/// Frontier traversal bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of URLs fetched per crawl request
    #[serde(rename = "max-nodes")]
    pub max_nodes: usize,

    /// Delay before the second fetch attempt of a URL (milliseconds),
    /// doubled for every further attempt. Zero retries immediately.
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Per-request HTTP timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_nodes: 30,
            retry_backoff_ms: 0,
            request_timeout_secs: 30,
        }
    }
}

/// Fetch attempts per URL, by customer tier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub standard: u32,
    pub priority: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            standard: 3,
            priority: 5,
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one record file per crawled URL
    pub directory: String,

    /// Minutes a record stays usable after its last write or hit
    #[serde(rename = "ttl-minutes")]
    pub ttl_minutes: u64,
}

impl CacheConfig {
    /// Returns `ttl-minutes` as a duration, saturating on overflow
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: "cache".to_string(),
            ttl_minutes: 60,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "tiered-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/crawler".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_saturates() {
        let cache = CacheConfig {
            ttl_minutes: u64::MAX,
            ..CacheConfig::default()
        };
        assert_eq!(cache.ttl(), Duration::from_secs(u64::MAX));
    }
}
