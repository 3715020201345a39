//! Page fetch capability
//!
//! The traversal engine only depends on the [`Fetcher`] trait. The HTTP
//! implementation handles:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a bounded redirect chain
//! - Error classification
//! - Handing HTML bodies to the parser

use crate::config::Config;
use crate::crawler::parser::parse_page;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for one fetch
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Visible text of the page
    pub text: String,

    /// Outbound links in document order (may repeat)
    pub links: Vec<String>,
}

/// A failed fetch attempt
///
/// All variants are treated as transient by the traversal: the URL is
/// retried until its budget runs out.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

/// Fetches a page and extracts its text and outbound links
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Example
///
/// ```no_run
/// use tiered_crawler::config::Config;
/// use tiered_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with HTML (or no Content-Type) | parsed page |
    /// | 2xx with other Content-Type | empty page, no links |
    /// | any other status | `FetchError::Status` |
    /// | timeout | `FetchError::Timeout` |
    /// | connection / body errors | `FetchError::Network` |
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Links resolve against where we ended up, not where we started
        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            tracing::debug!("Not following {} ({})", final_url, content_type);
            return Ok(FetchedPage::default());
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(parse_page(&body, &final_url))
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
