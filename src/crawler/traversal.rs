//! Frontier traversal engine
//!
//! Runs a bounded breadth-first crawl from a seed URL:
//! - FIFO work queue seeded with the seed URL
//! - Per-URL retry budget, with optional exponential backoff
//! - Global bound on the number of URLs fetched
//! - Deduplicated discovered links, in discovery order
//!
//! Per-URL failures never escape a traversal. A URL that cannot be parsed or
//! is not http(s) is skipped; a URL whose fetch budget runs out is abandoned.

use crate::config::Config;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::request::{CrawlStatus, CustomerTier};
use crate::url::parse_crawlable;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Longest backoff doubling applied between attempts
const MAX_BACKOFF_SHIFT: u32 = 16;

/// Bounds for one traversal run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Fetch attempts per URL
    pub max_retries: u32,

    /// URLs fetched per run
    pub max_nodes: usize,

    /// Delay after the first failed attempt, doubled after each further one
    pub retry_backoff: Duration,
}

impl TraversalLimits {
    pub fn new(max_retries: u32, max_nodes: usize) -> Self {
        Self {
            max_retries,
            max_nodes,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Limits for a request of the given tier
    pub fn for_tier(config: &Config, tier: CustomerTier) -> Self {
        Self::new(config.retries_for(tier), config.crawler.max_nodes)
            .with_backoff(Duration::from_millis(config.crawler.retry_backoff_ms))
    }

    /// Delay before attempt number `attempt` (1-based); zero for the first
    fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.retry_backoff.is_zero() {
            return Duration::ZERO;
        }
        let shift = (attempt - 2).min(MAX_BACKOFF_SHIFT);
        self.retry_backoff.saturating_mul(1 << shift)
    }
}

/// Result of one traversal run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalResult {
    /// Discovered links, deduplicated, in discovery order
    pub links: Vec<String>,

    /// Text of the last page fetched successfully
    pub page_text: String,

    /// URLs that consumed the node budget
    pub nodes_visited: usize,

    /// Fetch calls made, retries included
    pub fetch_attempts: usize,

    /// Completed, SeedUnreachable or InvalidSeed
    pub status: CrawlStatus,
}

/// Per-run frontier state
struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    discovered: HashSet<String>,
    links: Vec<String>,
}

impl Frontier {
    fn new(seed: &str) -> Self {
        let seed = page_identity(seed);
        let mut visited = HashSet::new();
        visited.insert(seed.clone());

        Self {
            queue: VecDeque::from([seed]),
            visited,
            discovered: HashSet::new(),
            links: Vec::new(),
        }
    }

    fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Records outbound links, enqueueing the ones never seen before
    fn record_links(&mut self, links: Vec<String>) {
        for link in links {
            let link = page_identity(&link);
            if !self.discovered.insert(link.clone()) {
                continue;
            }
            if self.visited.insert(link.clone()) {
                tracing::trace!("Enqueueing {}", link);
                self.queue.push_back(link.clone());
            }
            self.links.push(link);
        }
    }
}

/// Key under which a URL is deduplicated
///
/// Crawlable URLs take their parsed form without fragment, so
/// `http://a.test` and `http://a.test/#top` are one page. Anything else is
/// kept verbatim and later skipped by the traversal.
fn page_identity(raw: &str) -> String {
    match parse_crawlable(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => raw.to_string(),
    }
}

/// Crawls outward from `seed`, breadth first, within `limits`
///
/// # Example
///
/// ```no_run
/// use tiered_crawler::crawler::{traverse, HttpFetcher, TraversalLimits};
/// use tiered_crawler::config::Config;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::from_config(&Config::default())?;
/// let result = traverse(&fetcher, "https://example.com", TraversalLimits::new(3, 30)).await;
/// println!("{} links ({})", result.links.len(), result.status);
/// # Ok(())
/// # }
/// ```
pub async fn traverse(
    fetcher: &dyn Fetcher,
    seed: &str,
    limits: TraversalLimits,
) -> TraversalResult {
    let mut frontier = Frontier::new(seed);
    let mut page_text = String::new();
    let mut nodes_visited = 0;
    let mut fetch_attempts = 0;
    let mut status = CrawlStatus::InvalidSeed;
    let mut is_seed = true;

    while nodes_visited < limits.max_nodes {
        let Some(candidate) = frontier.next() else {
            break;
        };
        let seed_turn = std::mem::replace(&mut is_seed, false);

        let url = match parse_crawlable(&candidate) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", candidate, e);
                continue;
            }
        };

        nodes_visited += 1;

        match fetch_with_retries(fetcher, &url, &limits, &mut fetch_attempts).await {
            Some(page) => {
                if seed_turn {
                    status = CrawlStatus::Completed;
                }
                page_text = page.text;
                frontier.record_links(page.links);
            }
            None => {
                tracing::debug!(
                    "Abandoning {} after {} attempts",
                    url,
                    limits.max_retries
                );
                if seed_turn {
                    status = CrawlStatus::SeedUnreachable;
                }
            }
        }
    }

    if !frontier.queue.is_empty() {
        tracing::debug!(
            "Node budget of {} reached with {} URLs left in the frontier",
            limits.max_nodes,
            frontier.queue.len()
        );
    }

    TraversalResult {
        links: frontier.links,
        page_text,
        nodes_visited,
        fetch_attempts,
        status,
    }
}

/// Attempts a fetch up to `max_retries` times, stopping at the first success
async fn fetch_with_retries(
    fetcher: &dyn Fetcher,
    url: &Url,
    limits: &TraversalLimits,
    fetch_attempts: &mut usize,
) -> Option<FetchedPage> {
    for attempt in 1..=limits.max_retries {
        let delay = limits.backoff_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        *fetch_attempts += 1;
        match fetcher.fetch(url).await {
            Ok(page) => return Some(page),
            Err(e) => {
                tracing::debug!(
                    "Fetch attempt {}/{} failed: {}",
                    attempt,
                    limits.max_retries,
                    e
                );
            }
        }
    }

    None
}
