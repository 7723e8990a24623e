//! Crawler module for web page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic ([`FetchEngine`])
//! - Link extraction restricted to the target host ([`extract_links`])
//! - Breadth-first scheduling bounded by page count and depth ([`CrawlScheduler`])
//! - The [`Crawler`] facade that ties them to one base URL

mod fetcher;
mod parser;
mod scheduler;

pub use fetcher::{FetchEngine, RetryPolicy};
pub use parser::extract_links;
pub use scheduler::{
    effective_delay, CrawlLimits, CrawlScheduler, DispatchMode, FrontierEntry, WorkerOutcome,
};

use crate::config::CrawlerConfig;
use crate::http::{PageSource, ReqwestSource};
use crate::robots::RobotsPolicy;
use crate::url::TargetHost;
use crate::{AttuarioError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// The outcome of fetching one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    /// Normalized URL that was fetched
    pub url: String,

    /// Status of the last response, absent when no response arrived
    pub status_code: Option<u16>,

    /// Page body, empty on failure
    pub html: String,

    pub fetched_at: DateTime<Utc>,

    /// Page the URL was discovered on
    pub referer: Option<String>,

    pub error: Option<String>,
}

impl CrawlResult {
    pub fn success(
        url: impl Into<String>,
        status_code: u16,
        html: impl Into<String>,
        referer: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code: Some(status_code),
            html: html.into(),
            fetched_at: Utc::now(),
            referer,
            error: None,
        }
    }

    pub fn failure(
        url: impl Into<String>,
        status_code: Option<u16>,
        error: impl Into<String>,
        referer: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code,
            html: String::new(),
            fetched_at: Utc::now(),
            referer,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A crawler bound to one base URL
///
/// Construction validates the base URL and fetches robots.txt once. The HTTP
/// session lives as long as the crawler and the schedulers it created.
///
/// # Example
///
/// ```no_run
/// use attuario::config::CrawlerConfig;
/// use attuario::Crawler;
///
/// # async fn example() -> attuario::Result<()> {
/// let crawler = Crawler::new(CrawlerConfig::for_base_url("https://example.com")).await?;
/// let mut scheduler = crawler.crawl(None);
/// while let Some(result) = scheduler.next().await {
///     println!("{} -> {:?}", result.url, result.status_code);
/// }
/// crawler.close();
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    config: CrawlerConfig,
    base_url: Url,
    target: TargetHost,
    robots: Arc<RobotsPolicy>,
    engine: Arc<FetchEngine>,
}

impl Crawler {
    /// Creates a crawler with a reqwest client built from `config`
    pub async fn new(config: CrawlerConfig) -> Result<Self> {
        let (base_url, target) = parse_base_url(&config.base_url)?;
        let source = ReqwestSource::from_config(&config)?;
        Self::build(config, base_url, target, Arc::new(source)).await
    }

    /// Creates a crawler that fetches through `source`
    pub async fn with_source(config: CrawlerConfig, source: Arc<dyn PageSource>) -> Result<Self> {
        let (base_url, target) = parse_base_url(&config.base_url)?;
        Self::build(config, base_url, target, source).await
    }

    async fn build(
        config: CrawlerConfig,
        base_url: Url,
        target: TargetHost,
        source: Arc<dyn PageSource>,
    ) -> Result<Self> {
        tracing::info!("Initializing crawler for {}", base_url);
        tracing::info!(
            "Config: max_pages={}, max_depth={}, delay={}s, max_workers={}",
            config.max_pages,
            config.max_depth,
            config.delay_seconds,
            config.max_workers
        );
        tracing::debug!("Fetching through {}", source.describe());

        let robots = RobotsPolicy::fetch(
            &base_url,
            source.as_ref(),
            config.timeout(),
            &config.user_agent,
        )
        .await;

        let delay = effective_delay(config.delay(), &robots);
        if delay > config.delay() {
            tracing::info!("Adjusted delay to {}s based on robots.txt", delay.as_secs_f64());
        }

        let engine = FetchEngine::from_config(source, &config, delay);

        Ok(Self {
            config,
            base_url,
            target,
            robots: Arc::new(robots),
            engine: Arc::new(engine),
        })
    }

    /// Starts a crawl from `seeds`, or from the base URL when `None`
    pub fn crawl(&self, seeds: Option<Vec<String>>) -> CrawlScheduler {
        let seeds = seeds.unwrap_or_else(|| vec![self.base_url.to_string()]);
        let mode = DispatchMode::from_workers(self.config.max_workers);

        tracing::info!("Starting crawl");
        if let DispatchMode::Parallel { workers } = mode {
            tracing::info!("Using parallel crawling with {} workers", workers);
        }

        CrawlScheduler::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.robots),
            self.target.clone(),
            mode,
            CrawlLimits {
                max_pages: self.config.max_pages,
                max_depth: self.config.max_depth,
            },
            seeds,
        )
    }

    /// Releases the crawler's handle on the HTTP session
    ///
    /// Consuming `self` drops the crawler's `Arc` to the fetch engine. Dropping the
    /// last engine handle releases the reqwest connection pool, so schedulers still
    /// running keep the session alive until they are dropped too. Letting the
    /// crawler go out of scope has the same effect.
    pub fn close(self) {
        tracing::debug!("Closing crawler for {}", self.base_url);
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn robots(&self) -> &RobotsPolicy {
        &self.robots
    }

    /// Politeness delay in force: the configured delay raised to the robots.txt crawl delay
    pub fn effective_delay(&self) -> Duration {
        self.engine.delay()
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }
}

/// Checks that the base URL has a scheme and a host
fn parse_base_url(raw: &str) -> Result<(Url, TargetHost)> {
    let invalid = |reason: String| AttuarioError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    let target = TargetHost::from_url(&url).ok_or_else(|| invalid("missing host".to_string()))?;

    Ok((url, target))
}
