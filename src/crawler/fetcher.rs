//! Single-URL fetching with bounded retries
//!
//! The [`FetchEngine`] turns one URL into exactly one [`CrawlResult`]:
//! - Retryable failures (timeouts, connection and other transport errors) are
//!   retried with exponential backoff until the attempt budget runs out
//! - Error statuses (4xx/5xx) are recorded immediately with their status code
//! - A successful fetch is followed by the politeness delay

use crate::config::{seconds, CrawlerConfig};
use crate::crawler::CrawlResult;
use crate::http::{HttpResponse, PageSource};
use crate::{FetchError, FetchErrorKind};
use std::sync::Arc;
use std::time::Duration;

/// Attempt budget and backoff schedule
///
/// | Attempt | Sleep before it |
/// |---------|-----------------|
/// | 1 | none |
/// | 2 | `base_delay` |
/// | 3 | `base_delay * 2` |
/// | k | `base_delay * 2^(k-2)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay(),
        }
    }

    /// Sleep before the attempt with zero-based index `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        1u32.checked_shl(attempt - 1)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

/// Fetches pages through a [`PageSource`] with retries and politeness
pub struct FetchEngine {
    source: Arc<dyn PageSource>,
    retry: RetryPolicy,
    /// Politeness delay applied after each successful fetch
    delay: Duration,
    timeout: Duration,
}

impl FetchEngine {
    pub fn new(
        source: Arc<dyn PageSource>,
        retry: RetryPolicy,
        delay: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            retry,
            delay,
            timeout,
        }
    }

    /// Builds an engine from the crawler configuration and an effective delay
    pub fn from_config(
        source: Arc<dyn PageSource>,
        config: &CrawlerConfig,
        delay: Duration,
    ) -> Self {
        Self::new(
            source,
            RetryPolicy::from_config(config),
            delay,
            seconds(config.timeout),
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches `url`, returning a result on every outcome
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx/3xx | Success, then politeness delay |
    /// | HTTP 4xx/5xx | Immediate failure with the status code |
    /// | Timeout | Retry with backoff |
    /// | Connection error | Retry with backoff |
    /// | Other transport error | Retry with backoff |
    ///
    /// When the attempts run out the result has an error and no status code.
    pub async fn fetch(&self, url: &str, referer: Option<String>) -> CrawlResult {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let wait = self.retry.backoff(attempt);
                tracing::info!(
                    "Retry attempt {}/{} for {} after {}s",
                    attempt + 1,
                    max_attempts,
                    url,
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
            }

            match self.attempt(url).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(
                            "Successfully fetched {} on retry attempt {}",
                            url,
                            attempt + 1
                        );
                    }
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    return CrawlResult::success(url, response.status, response.body, referer);
                }
                Err(err) if !err.is_retryable() => {
                    tracing::error!("HTTP error fetching {}: {}", url, err);
                    return CrawlResult::failure(url, err.status_code, err.to_string(), referer);
                }
                Err(err) => {
                    match err.kind {
                        FetchErrorKind::Timeout => tracing::warn!(
                            "Timeout fetching {} (attempt {}/{})",
                            url,
                            attempt + 1,
                            max_attempts
                        ),
                        FetchErrorKind::Connection => tracing::warn!(
                            "Connection error fetching {} (attempt {}/{})",
                            url,
                            attempt + 1,
                            max_attempts
                        ),
                        _ => tracing::warn!("Request error fetching {}: {}", url, err),
                    }
                    last_error = Some(err);
                }
            }
        }

        let message = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempt made".to_string());
        tracing::error!(
            "Failed to fetch {} after {} attempts: {}",
            url,
            max_attempts,
            message
        );
        CrawlResult::failure(url, None, message, referer)
    }

    /// One GET; error statuses become `HttpStatus` errors
    async fn attempt(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.source.get(url, self.timeout).await?;
        if response.is_error() {
            let reason = response
                .reason
                .clone()
                .unwrap_or_else(|| "error status".to_string());
            return Err(FetchError::http_status(response.status, reason));
        }
        Ok(response)
    }
}
