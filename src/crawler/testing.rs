//! In-memory fetcher for unit tests

use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Serves a fixed site map and records every fetch attempt
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, FetchedPage>,
    /// Number of attempts that fail before a URL starts succeeding
    failures: HashMap<String, u32>,
    attempts: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page; keys are stored in parsed form (`http://a.test` → `http://a.test/`)
    pub fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
        self.pages.insert(
            canonical(url),
            FetchedPage {
                text: text.to_string(),
                links: links.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Makes the first `count` attempts on `url` fail
    pub fn failing(mut self, url: &str, count: u32) -> Self {
        self.failures.insert(canonical(url), count);
        self
    }

    /// Every attempted URL, in order, including retries
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, url: &str) -> usize {
        let key = canonical(url);
        self.attempts().iter().filter(|u| **u == key).count()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let key = url.as_str().to_string();
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(key.clone());
            attempts.iter().filter(|u| **u == key).count() as u32
        };

        if attempt <= self.failures.get(&key).copied().unwrap_or(0) {
            return Err(FetchError::Network {
                url: key,
                message: "simulated failure".to_string(),
            });
        }

        self.pages.get(&key).cloned().ok_or(FetchError::Status {
            url: key,
            status: 404,
        })
    }
}

fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}
