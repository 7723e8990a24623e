use crate::scoring::ScoreWeights;
use serde::Deserialize;
use std::time::Duration;

/// Default User-Agent sent with every request and used for robots.txt matching
pub const DEFAULT_USER_AGENT: &str = "AttuarioAI/0.1 (+https://github.com)";

/// Main configuration structure for Attuario
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub weights: ScoreWeights,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Starting URL; its host bounds the crawl
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of results a crawl yields
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seeds
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Politeness delay after each successful fetch (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Per-request timeout (seconds)
    pub timeout: f64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Fetch workers per batch; 1 disables parallel mode
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// First backoff sleep between attempts (seconds), doubled on each retry
    #[serde(rename = "retry-base-delay")]
    pub retry_base_delay: f64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            max_pages: 100,
            max_depth: 2,
            delay_seconds: 0.5,
            timeout: 10.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_workers: 4,
            retry_base_delay: 1.0,
            max_attempts: 3,
        }
    }
}

impl CrawlerConfig {
    /// Builds a configuration for `base_url` with every other field at its default
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        seconds(self.timeout)
    }

    pub fn delay(&self) -> Duration {
        seconds(self.delay_seconds)
    }

    pub fn retry_base_delay(&self) -> Duration {
        seconds(self.retry_base_delay)
    }
}

/// Converts a seconds value to a Duration, clamping negatives and NaN to zero
pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// HTTP response cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve repeated fetches of the same URL from memory
    pub enabled: bool,

    /// Time a cached response stays valid (seconds)
    #[serde(rename = "expire-after")]
    pub expire_after: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expire_after: 3600,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expire_after)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving report.csv, report.json and summary.json
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "outputs".to_string(),
        }
    }
}
