//! Configuration module for Attuario
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file yields a usable configuration once
//! a base URL is supplied.
//!
//! # Example
//!
//! ```no_run
//! use attuario::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("attuario.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, Config, CrawlerConfig, OutputConfig, DEFAULT_USER_AGENT};
pub(crate) use types::seconds;

// Re-export parser functions
pub use parser::{load_config, load_weights, parse_config};
pub use validation::validate;
