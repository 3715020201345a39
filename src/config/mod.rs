//! Configuration module for Tiered-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use tiered_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Cache records live for {:?}", config.ttl());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{CacheConfig, Config, CrawlerConfig, RetryConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
