//! Crawler coordinator - request admission and serial execution
//!
//! A single tokio task owns the admission queue and runs one crawl at a
//! time. Callers submit through a cloneable [`CoordinatorHandle`]:
//! - Requests travel over an unbounded channel into the task's inbox
//! - The task moves every pending request into the admission queue,
//!   then executes the highest-tier request to completion
//! - Each caller receives its outcome on a dedicated oneshot channel
//! - Fresh cache records short-circuit the crawl entirely

use crate::cache::{CacheLookup, CacheStore};
use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::request::{CrawlOutcome, CrawlRequest, CrawlStatus, CustomerTier};
use crate::crawler::scheduler::AdmissionQueue;
use crate::crawler::stats::CoordinatorStats;
use crate::crawler::traversal::{traverse, TraversalLimits};
use crate::CrawlerError;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// A request waiting for execution, with the channel its outcome goes to
#[derive(Debug)]
struct Job {
    request: CrawlRequest,
    reply: oneshot::Sender<CrawlOutcome>,
}

/// Submission side of a running coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    inbox: mpsc::UnboundedSender<Job>,
}

impl CoordinatorHandle {
    /// Submits a crawl request and waits for its outcome
    ///
    /// Dropping the returned future does not cancel the crawl; its outcome
    /// is discarded.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The request was served (possibly from cache)
    /// * `Err(CrawlerError::CoordinatorClosed)` - The coordinator has stopped
    pub async fn submit(
        &self,
        url: impl Into<String>,
        tier: CustomerTier,
    ) -> Result<CrawlOutcome, CrawlerError> {
        let (reply, outcome) = oneshot::channel();
        let job = Job {
            request: CrawlRequest::new(url, tier),
            reply,
        };

        self.inbox
            .send(job)
            .map_err(|_| CrawlerError::CoordinatorClosed)?;

        outcome.await.map_err(|_| CrawlerError::CoordinatorClosed)
    }
}

/// Owner of the coordinator task
pub struct Coordinator {
    handle: CoordinatorHandle,
    task: JoinHandle<CoordinatorStats>,
}

impl Coordinator {
    /// Opens the cache, sweeps expired records and starts the coordinator task
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Page fetch capability used by every traversal
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tiered_crawler::config::Config;
    /// use tiered_crawler::crawler::{Coordinator, CustomerTier, HttpFetcher};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
    /// let coordinator = Coordinator::spawn(config, fetcher)?;
    ///
    /// let outcome = coordinator
    ///     .submit("https://example.com", CustomerTier::Priority)
    ///     .await?;
    /// println!("{} links", outcome.links.len());
    ///
    /// let stats = coordinator.shutdown().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, CrawlerError> {
        let cache = CacheStore::open(&config.cache.directory, config.ttl())?;

        match cache.sweep() {
            Ok(report) => tracing::info!(
                "Cache sweep in {}: {} expired, {} fresh",
                cache.directory().display(),
                report.removed,
                report.kept
            ),
            Err(e) => tracing::warn!("Cache sweep failed: {}", e),
        }

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let worker = CrawlWorker {
            config,
            cache,
            fetcher,
            inbox: inbox_rx,
            queue: AdmissionQueue::new(),
            stats: CoordinatorStats::default(),
        };

        Ok(Self {
            handle: CoordinatorHandle { inbox: inbox_tx },
            task: tokio::spawn(worker.run()),
        })
    }

    /// Returns a handle for submitting requests from other tasks
    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    /// Submits a crawl request through the coordinator's own handle
    pub async fn submit(
        &self,
        url: impl Into<String>,
        tier: CustomerTier,
    ) -> Result<CrawlOutcome, CrawlerError> {
        self.handle.submit(url, tier).await
    }

    /// Stops admission and waits for queued requests to finish
    ///
    /// The task exits once every handle is dropped, so handles cloned out of
    /// this coordinator keep it running until their owners release them.
    pub async fn shutdown(self) -> Result<CoordinatorStats, CrawlerError> {
        drop(self.handle);
        let stats = self.task.await?;
        tracing::info!(
            "Coordinator stopped after {} requests ({} from cache)",
            stats.requests,
            stats.cache_hits
        );
        Ok(stats)
    }
}

/// State owned by the coordinator task
struct CrawlWorker {
    config: Config,
    cache: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    inbox: mpsc::UnboundedReceiver<Job>,
    queue: AdmissionQueue<Job>,
    stats: CoordinatorStats,
}

impl CrawlWorker {
    async fn run(mut self) -> CoordinatorStats {
        loop {
            self.drain_inbox();

            if let Some(next) = self.queue.pop() {
                tracing::debug!(
                    "Dequeued submission #{} (priority {}), {} waiting",
                    next.sequence(),
                    next.priority,
                    self.queue.len()
                );
                self.execute(next.value).await;
                continue;
            }

            match self.inbox.recv().await {
                Some(job) => self.admit(job),
                None => break,
            }
        }

        self.stats
    }

    /// Moves every pending submission into the admission queue
    fn drain_inbox(&mut self) {
        while let Ok(job) = self.inbox.try_recv() {
            self.admit(job);
        }
    }

    fn admit(&mut self, job: Job) {
        let priority = job.request.tier.priority();
        tracing::debug!(
            "Admitted {} ({}), {} queued",
            job.request.url,
            job.request.tier,
            self.queue.len() + 1
        );
        self.queue.push(job, priority);
    }

    async fn execute(&mut self, job: Job) {
        let Job { request, reply } = job;
        let url = request.url.clone();

        let outcome = self.serve(request).await;
        self.stats.record(&outcome);

        if reply.send(outcome).is_err() {
            tracing::debug!("Requester for {} went away before the reply", url);
        }
    }

    /// Answers one request from the cache or by crawling
    async fn serve(&self, request: CrawlRequest) -> CrawlOutcome {
        let CrawlRequest { url, tier } = request;

        match self.cache.lookup(&url) {
            CacheLookup::Hit(page) => {
                tracing::info!("Cache hit for {} ({})", url, tier);
                if let Err(e) = self.cache.touch(&url) {
                    tracing::warn!("Failed to refresh cache record for {}: {}", url, e);
                }
                return CrawlOutcome {
                    url,
                    tier,
                    links: page.crawled_urls,
                    status: CrawlStatus::Cached,
                };
            }
            CacheLookup::Miss(reason) => {
                tracing::debug!("Cache miss for {}: {:?}", url, reason);
            }
        }

        let limits = TraversalLimits::for_tier(&self.config, tier);
        tracing::info!(
            "Crawling {} ({}, {} attempts per URL)",
            url,
            tier,
            limits.max_retries
        );

        let result = traverse(self.fetcher.as_ref(), &url, limits).await;
        tracing::info!(
            "Crawl of {} finished: {}, {} links from {} pages",
            url,
            result.status,
            result.links.len(),
            result.nodes_visited
        );

        if result.status == CrawlStatus::Completed {
            if let Err(e) = self.cache.write(&url, &result.page_text, &result.links) {
                tracing::warn!("Failed to cache crawl of {}: {}", url, e);
            }
        }

        CrawlOutcome {
            url,
            tier,
            links: result.links,
            status: result.status,
        }
    }
}
