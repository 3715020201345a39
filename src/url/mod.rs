//! URL handling module for Tiered-Crawler
//!
//! This module decides which URLs the crawler may fetch and maps URLs to the
//! normalized identity used for cache records.

mod normalize;

pub use normalize::{normalize_url, parse_crawlable};
