//! Tiered-Crawler main entry point
//!
//! This is the command-line interface for the tier-prioritized site crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tiered_crawler::cache::CacheStore;
use tiered_crawler::config::{load_config_with_hash, Config};
use tiered_crawler::crawler::{crawl_all, CrawlRequest, CustomerTier};
use tracing_subscriber::EnvFilter;

/// Tiered-Crawler: a tier-prioritized site crawler
///
/// Crawls each seed URL breadth first and prints the links it discovers.
/// Priority seeds are served before standard ones and get a larger retry
/// budget. Results are cached on disk for the configured TTL.
#[derive(Parser, Debug)]
#[command(name = "tiered-crawler")]
#[command(version)]
#[command(about = "A tier-prioritized site crawler", long_about = None)]
struct Cli {
    /// Seed URLs crawled at the standard tier
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Seed URLs crawled at the priority tier (repeatable)
    #[arg(short, long = "priority", value_name = "URL")]
    priority: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the effective configuration and exit
    #[arg(long, conflicts_with = "sweep")]
    dry_run: bool,

    /// Remove expired cache records and exit
    #[arg(long, conflicts_with = "dry_run")]
    sweep: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    if cli.sweep {
        return handle_sweep(&config);
    }

    handle_crawl(config, cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tiered_crawler=info,warn"),
            1 => EnvFilter::new("tiered_crawler=debug,info"),
            2 => EnvFilter::new("tiered_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Collects the seeds given on the command line, priority ones first
fn requests(cli: &Cli) -> Vec<CrawlRequest> {
    let priority = cli
        .priority
        .iter()
        .map(|url| CrawlRequest::new(url.as_str(), CustomerTier::Priority));
    let standard = cli
        .urls
        .iter()
        .map(|url| CrawlRequest::new(url.as_str(), CustomerTier::Standard));

    priority.chain(standard).collect()
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== Tiered-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max nodes per crawl: {}", config.crawler.max_nodes);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nRetries per URL:");
    println!("  Standard: {}", config.retries.standard);
    println!("  Priority: {}", config.retries.priority);

    println!("\nCache:");
    println!("  Directory: {}", config.cache.directory);
    println!("  TTL: {} minutes", config.cache.ttl_minutes);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    let requests = requests(cli);
    println!("\nSeeds ({}):", requests.len());
    for request in &requests {
        println!("  - {} ({})", request.url, request.tier);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --sweep mode: removes expired cache records
fn handle_sweep(config: &Config) -> anyhow::Result<()> {
    let cache = CacheStore::from_config(&config.cache).with_context(|| {
        format!("Failed to open cache directory {}", config.cache.directory)
    })?;
    let report = cache.sweep().context("Cache sweep failed")?;

    println!(
        "✓ Removed {} expired records, kept {} fresh records in {}",
        report.removed,
        report.kept,
        cache.directory().display()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, cli: Cli) -> anyhow::Result<()> {
    let requests = requests(&cli);
    if requests.is_empty() {
        tracing::warn!("No seed URLs given, nothing to crawl");
        return Ok(());
    }

    tracing::info!(
        "Submitting {} seeds ({} priority, {} standard)",
        requests.len(),
        cli.priority.len(),
        cli.urls.len()
    );

    let report = crawl_all(config, requests).await.context("Crawl failed")?;

    let failed = report
        .outcomes
        .iter()
        .filter(|outcome| !outcome.status.is_success())
        .count();
    if failed > 0 {
        tracing::warn!("{} of {} seeds could not be crawled", failed, report.outcomes.len());
    }

    for outcome in &report.outcomes {
        println!(
            "{} [{}] {}: {} links",
            outcome.url,
            outcome.tier,
            outcome.status,
            outcome.links.len()
        );
        for link in &outcome.links {
            println!("  {}", link);
        }
    }
    println!();

    if !cli.quiet {
        report.stats.print();
    }

    Ok(())
}
