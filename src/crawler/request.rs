//! Crawl request and outcome types

use crate::CrawlerError;
use std::fmt;
use std::str::FromStr;

/// Customer classification driving queue priority and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CustomerTier {
    Standard,
    Priority,
}

impl CustomerTier {
    /// Admission queue priority (higher pops first)
    pub fn priority(self) -> i32 {
        match self {
            Self::Standard => 0,
            Self::Priority => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerTier {
    type Err = CrawlerError;

    /// Accepts `standard` and `priority`, plus the legacy `paying` form value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "priority" | "paying" => Ok(Self::Priority),
            other => Err(CrawlerError::UnknownTier(other.to_string())),
        }
    }
}

/// A request to crawl one seed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub url: String,
    pub tier: CustomerTier,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, tier: CustomerTier) -> Self {
        Self {
            url: url.into(),
            tier,
        }
    }
}

/// How a crawl request was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    /// Served from a fresh cache record without fetching
    Cached,
    /// The seed page was fetched; links reflect the traversal
    Completed,
    /// Every fetch attempt on the seed failed
    SeedUnreachable,
    /// The seed is not a crawlable http(s) URL
    InvalidSeed,
}

impl CrawlStatus {
    /// Returns true if the links reflect a real view of the site
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Cached | Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Completed => "completed",
            Self::SeedUnreachable => "seed unreachable",
            Self::InvalidSeed => "invalid seed",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result handed back to the caller that submitted a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub url: String,
    pub tier: CustomerTier,
    /// Discovered links, deduplicated, in discovery order
    pub links: Vec<String>,
    pub status: CrawlStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tier_outranks_standard() {
        assert!(CustomerTier::Priority.priority() > CustomerTier::Standard.priority());
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("standard".parse::<CustomerTier>().unwrap(), CustomerTier::Standard);
        assert_eq!("Priority".parse::<CustomerTier>().unwrap(), CustomerTier::Priority);
        assert_eq!("paying".parse::<CustomerTier>().unwrap(), CustomerTier::Priority);
        assert!(matches!(
            "gold".parse::<CustomerTier>(),
            Err(CrawlerError::UnknownTier(_))
        ));
    }

    #[test]
    fn test_status_success() {
        assert!(CrawlStatus::Cached.is_success());
        assert!(CrawlStatus::Completed.is_success());
        assert!(!CrawlStatus::SeedUnreachable.is_success());
        assert!(!CrawlStatus::InvalidSeed.is_success());
    }
}
