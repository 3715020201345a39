//! Cache module for persisting crawl results
//!
//! Each crawled seed URL maps to one JSON record file in the cache directory.
//! A record's freshness is its file modification time: records older than the
//! configured TTL are treated as absent and removed by [`CacheStore::sweep`].

mod key;
mod store;

pub use key::cache_key;
pub use store::CacheStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while writing or maintaining the cache
///
/// Reads never fail: every read problem is reported as a [`CacheLookup::Miss`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// A cached crawl result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    /// Text of the last page fetched by the crawl that produced this record
    pub html: String,

    /// Deduplicated links discovered by that crawl
    #[serde(rename = "crawledURLs")]
    pub crawled_urls: Vec<String>,

    /// Last write or hit time of the backing record (not serialized)
    #[serde(skip)]
    pub stored_at: Option<DateTime<Utc>>,
}

/// Why a cache lookup produced no usable record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No record exists for the URL
    Absent,
    /// The record is older than the TTL
    Expired,
    /// The record exists but could not be read
    Unreadable,
    /// The record could not be deserialized
    Corrupt,
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(CachedPage),
    Miss(MissReason),
}

impl CacheLookup {
    /// Returns the cached page on a hit
    pub fn into_page(self) -> Option<CachedPage> {
        match self {
            Self::Hit(page) => Some(page),
            Self::Miss(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Counts from a cache sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired records deleted
    pub removed: usize,
    /// Fresh records left in place
    pub kept: usize,
}
