//! Coordinator statistics
//!
//! Counters accumulated by the coordinator task while it serves requests,
//! returned to the owner on shutdown.

use crate::crawler::request::{CrawlOutcome, CrawlStatus};

/// Request counters for one coordinator lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Requests answered
    pub requests: u64,

    /// Requests served from the cache
    pub cache_hits: u64,

    /// Requests that ran a traversal
    pub traversals: u64,

    /// Traversals whose seed was fetched
    pub completed: u64,

    /// Traversals whose seed was unreachable or invalid
    pub seed_failures: u64,

    /// Links returned across all requests
    pub links_discovered: u64,
}

impl CoordinatorStats {
    /// Records one answered request
    pub fn record(&mut self, outcome: &CrawlOutcome) {
        self.requests += 1;
        self.links_discovered += outcome.links.len() as u64;

        match outcome.status {
            CrawlStatus::Cached => self.cache_hits += 1,
            CrawlStatus::Completed => {
                self.traversals += 1;
                self.completed += 1;
            }
            CrawlStatus::SeedUnreachable | CrawlStatus::InvalidSeed => {
                self.traversals += 1;
                self.seed_failures += 1;
            }
        }
    }

    /// Share of requests served from the cache, in percent
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / self.requests as f64) * 100.0
        }
    }

    /// Prints statistics to stdout in a formatted manner
    pub fn print(&self) {
        println!("=== Coordinator Statistics ===\n");
        println!("  Requests: {}", self.requests);
        println!(
            "  Cache hits: {} ({:.1}%)",
            self.cache_hits,
            self.hit_rate()
        );
        println!("  Traversals: {}", self.traversals);
        println!("    Completed: {}", self.completed);
        println!("    Seed failures: {}", self.seed_failures);
        println!("  Links returned: {}", self.links_discovered);
    }
}
