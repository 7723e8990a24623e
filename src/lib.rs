//! Attuario: a polite single-domain crawler and actuarial content scorer
//!
//! This crate crawls one web domain breadth-first, respecting robots.txt and
//! politeness delays, then parses each page, extracts content metrics and
//! computes a weighted quality score for actuarial/insurance content.

pub mod config;
pub mod content;
pub mod crawler;
pub mod http;
pub mod output;
pub mod pipeline;
pub mod robots;
pub mod scoring;
pub mod url;

use std::fmt;
use thiserror::Error;

/// Main error type for Attuario operations
#[derive(Debug, Error)]
pub enum AttuarioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid base_url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] scoring::ScoringError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Classification of a failed fetch attempt
///
/// The retry policy is a lookup on this tag (see [`FetchErrorKind::is_retryable`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The request or body read exceeded the per-request timeout
    Timeout,
    /// The connection could not be established
    Connection,
    /// A response arrived with a 4xx/5xx status
    HttpStatus,
    /// Any other transport-level failure
    Transport,
}

impl FetchErrorKind {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection | Self::Transport => true,
            Self::HttpStatus => false,
        }
    }
}

/// A failed fetch attempt with its classification
#[derive(Debug, Clone, Error)]
pub struct FetchError {
    pub kind: FetchErrorKind,

    /// Status code of the response, present only for `HttpStatus`
    pub status_code: Option<u16>,

    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
        }
    }

    /// Builds an error for a response received with an error status
    pub fn http_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::HttpStatus,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FetchErrorKind::Timeout => write!(f, "Timeout: {}", self.message),
            FetchErrorKind::Connection => write!(f, "Connection error: {}", self.message),
            FetchErrorKind::HttpStatus => match self.status_code {
                Some(code) => write!(f, "HTTP {}: {}", code, self.message),
                None => write!(f, "HTTP error: {}", self.message),
            },
            FetchErrorKind::Transport => write!(f, "{}", self.message),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_connect() {
            FetchErrorKind::Connection
        } else {
            FetchErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }
}

/// Result type alias for Attuario operations
pub type Result<T> = std::result::Result<T, AttuarioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, CrawlScheduler, Crawler};
pub use pipeline::{EvaluationPipeline, EvaluationResult};
pub use crate::url::normalize_url;
