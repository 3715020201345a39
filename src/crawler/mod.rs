//! Crawler module for tier-prioritized site crawls
//!
//! This module contains the core crawling logic, including:
//! - Request admission ordered by customer tier
//! - Single-consumer coordination with cache short-circuiting
//! - Bounded breadth-first traversal with per-URL retries
//! - HTTP fetching, HTML parsing and link extraction

mod coordinator;
mod fetcher;
mod parser;
mod request;
mod scheduler;
mod stats;
mod traversal;

#[cfg(test)]
mod testing;

pub use coordinator::{Coordinator, CoordinatorHandle};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use parser::parse_page;
pub use request::{CrawlOutcome, CrawlRequest, CrawlStatus, CustomerTier};
pub use scheduler::{AdmissionQueue, QueueElement};
pub use stats::CoordinatorStats;
pub use traversal::{traverse, TraversalLimits, TraversalResult};

use crate::config::Config;
use crate::CrawlerError;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcomes of a batch of requests plus the coordinator's counters
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One outcome per request, in request order
    pub outcomes: Vec<CrawlOutcome>,
    pub stats: CoordinatorStats,
}

/// Crawls a batch of seeds over HTTP
///
/// This is the main entry point for a one-shot run. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Start a coordinator (sweeping expired cache records)
/// 3. Submit every request concurrently
/// 4. Wait for all outcomes and stop the coordinator
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every request was answered
/// * `Err(CrawlerError)` - Setup failed or the coordinator stopped early
pub async fn crawl_all(
    config: Config,
    requests: Vec<CrawlRequest>,
) -> Result<CrawlReport, CrawlerError> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
    crawl_all_with(config, fetcher, requests).await
}

/// Crawls a batch of seeds with the given fetcher
pub async fn crawl_all_with(
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    requests: Vec<CrawlRequest>,
) -> Result<CrawlReport, CrawlerError> {
    let coordinator = Coordinator::spawn(config, fetcher)?;

    let mut tasks = JoinSet::new();
    for (index, request) in requests.into_iter().enumerate() {
        let handle = coordinator.handle();
        tasks.spawn(async move { (index, handle.submit(request.url, request.tier).await) });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined?;
        outcomes.push((index, outcome?));
    }
    outcomes.sort_by_key(|(index, _)| *index);

    let stats = coordinator.shutdown().await?;

    Ok(CrawlReport {
        outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        stats,
    })
}
