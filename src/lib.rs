//! Tiered-Crawler: a tier-prioritized, cache-gated site crawler
//!
//! This crate accepts crawl requests from concurrent callers, orders them by
//! customer tier, runs a bounded breadth-first crawl of each requested site
//! and caches the discovered links for a configurable freshness window.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Main error type for Tiered-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unknown customer tier: {0}")]
    UnknownTier(String),

    #[error("Coordinator is no longer accepting requests")]
    CoordinatorClosed,

    #[error("Coordinator task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Tiered-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cache::{CacheLookup, CacheStore, CachedPage};
pub use config::Config;
pub use crawler::{
    Coordinator, CoordinatorHandle, CrawlOutcome, CrawlStatus, CustomerTier, Fetcher, HttpFetcher,
};
pub use crate::url::{normalize_url, parse_crawlable};
