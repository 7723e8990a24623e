//! HTTP access for the crawler
//!
//! All network reads go through the [`PageSource`] trait, so the crawler core never
//! depends on a concrete client:
//! - [`ReqwestSource`] performs real requests with a shared `reqwest::Client`
//! - [`CachedSource`] wraps any source with an in-memory response cache
//!
//! Tests substitute scripted sources to exercise retry and failure handling.

mod cache;

pub use cache::{CachedResponse, CachedSource};

use crate::config::CrawlerConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A response received from a source, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Canonical reason phrase for the status, if known
    pub reason: Option<String>,

    /// Decoded response body
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(str::to_string),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 4xx/5xx responses
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Fetch interface used by robots.txt loading and page fetching
///
/// Implementations return `Ok` for every response that arrives, including
/// 4xx/5xx ones; `Err` is reserved for transport failures, tagged with a
/// [`crate::FetchErrorKind`] other than `HttpStatus`.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Performs a GET bounded by `timeout`
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError>;

    /// Short description used in log lines
    fn describe(&self) -> String {
        "http".to_string()
    }
}

/// A [`PageSource`] backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    client: Client,
}

impl ReqwestSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a source with a client configured from `config`
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageSource for ReqwestSource {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }

    fn describe(&self) -> String {
        "reqwest".to_string()
    }
}

/// Builds an HTTP client with the crawler's User-Agent and timeouts
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}
