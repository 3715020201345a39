//! File-backed cache store
//!
//! One JSON record per URL, named by [`cache_key`]. The record's modification
//! time is the freshness signal: writes and hits refresh it, and anything
//! older than the TTL is treated as absent.

use crate::cache::key::{cache_key, RECORD_EXTENSION};
use crate::cache::{CacheLookup, CacheResult, CachedPage, MissReason, SweepReport};
use crate::config::CacheConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Borrowed form of [`CachedPage`] used for writing
#[derive(Serialize)]
struct RecordRef<'a> {
    html: &'a str,
    #[serde(rename = "crawledURLs")]
    crawled_urls: &'a [String],
}

/// Time-bounded store of crawl results
#[derive(Debug, Clone)]
pub struct CacheStore {
    directory: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    /// Opens a cache store, creating its directory if needed
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory holding the record files
    /// * `ttl` - Maximum record age before it is treated as absent
    pub fn open(directory: impl Into<PathBuf>, ttl: Duration) -> CacheResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory, ttl })
    }

    /// Opens the cache store described by the configuration
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Self::open(&config.directory, config.ttl())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the record file for a URL
    pub fn record_path(&self, url: &str) -> PathBuf {
        self.directory.join(cache_key(url))
    }

    /// Looks up a fresh record for a URL
    pub fn lookup(&self, url: &str) -> CacheLookup {
        self.lookup_at(url, SystemTime::now())
    }

    /// Returns the cached page for a URL, or `None` on any kind of miss
    pub fn read(&self, url: &str) -> Option<CachedPage> {
        self.lookup(url).into_page()
    }

    /// Looks up a record, judging freshness against `now`
    pub fn lookup_at(&self, url: &str, now: SystemTime) -> CacheLookup {
        let path = self.record_path(url);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return CacheLookup::Miss(MissReason::Absent)
            }
            Err(e) => {
                tracing::debug!("Failed to stat cache record {}: {}", path.display(), e);
                return CacheLookup::Miss(MissReason::Unreadable);
            }
        };

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                tracing::debug!("No modification time for {}: {}", path.display(), e);
                return CacheLookup::Miss(MissReason::Unreadable);
            }
        };

        if self.is_expired(modified, now) {
            return CacheLookup::Miss(MissReason::Expired);
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Failed to read cache record {}: {}", path.display(), e);
                return CacheLookup::Miss(MissReason::Unreadable);
            }
        };

        match serde_json::from_slice::<CachedPage>(&bytes) {
            Ok(mut page) => {
                page.stored_at = Some(DateTime::<Utc>::from(modified));
                CacheLookup::Hit(page)
            }
            Err(e) => {
                tracing::warn!("Corrupt cache record {}: {}", path.display(), e);
                CacheLookup::Miss(MissReason::Corrupt)
            }
        }
    }

    /// Writes a record for a URL, replacing any previous one
    ///
    /// The new record is stamped with the current time.
    pub fn write(&self, url: &str, page_text: &str, links: &[String]) -> CacheResult<()> {
        let record = RecordRef {
            html: page_text,
            crawled_urls: links,
        };
        let data = serde_json::to_vec(&record)?;
        fs::write(self.record_path(url), data)?;
        Ok(())
    }

    /// Refreshes a record's timestamp without changing its content
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record exists and was refreshed
    /// * `Ok(false)` - No record exists for the URL
    pub fn touch(&self, url: &str) -> CacheResult<bool> {
        self.touch_at(url, SystemTime::now())
    }

    /// Sets a record's timestamp to `at`
    pub fn touch_at(&self, url: &str, at: SystemTime) -> CacheResult<bool> {
        let file = match OpenOptions::new().write(true).open(self.record_path(url)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        file.set_modified(at)?;
        Ok(true)
    }

    /// Deletes every expired record in the cache directory
    pub fn sweep(&self) -> CacheResult<SweepReport> {
        self.sweep_at(SystemTime::now())
    }

    /// Deletes every record that is expired at `now`
    ///
    /// Files without the record extension are left alone. A record that
    /// cannot be inspected or removed is logged and skipped.
    pub fn sweep_at(&self, now: SystemTime) -> CacheResult<SweepReport> {
        let mut report = SweepReport::default();

        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| {
                if m.is_file() {
                    m.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => modified,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Skipping cache entry {}: {}", path.display(), e);
                    continue;
                }
            };

            if !self.is_expired(modified, now) {
                report.kept += 1;
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(
                        "Removed expired cache record {} (last modified {})",
                        path.display(),
                        DateTime::<Utc>::from(modified).to_rfc3339()
                    );
                    report.removed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        Ok(report)
    }

    /// A record modified in the future counts as age zero
    fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        now.duration_since(modified).unwrap_or(Duration::ZERO) > self.ttl
    }
}
