//! Robots.txt handling module
//!
//! A [`RobotsPolicy`] is fetched once per crawl from the target's origin and
//! answers allow/deny, crawl-delay and sitemap queries for the crawler's
//! user agent. When robots.txt cannot be obtained the policy allows everything.

mod parser;

pub use parser::{product_token, ParsedRobots};

use crate::http::PageSource;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why robots.txt could not be used
#[derive(Debug, Error)]
pub enum RobotsFetchFailure {
    #[error("invalid robots.txt location: {0}")]
    InvalidLocation(#[from] url::ParseError),

    #[error("{0}")]
    Fetch(#[from] crate::FetchError),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("empty robots.txt")]
    Empty,
}

/// Robots.txt directives for the crawl target
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// None when robots.txt was unavailable
    robots: Option<ParsedRobots>,
    user_agent: String,
    crawl_delay: Option<f64>,
}

impl RobotsPolicy {
    /// A policy that allows every URL and declares no delay
    pub fn permissive(user_agent: &str) -> Self {
        Self {
            robots: None,
            user_agent: user_agent.to_string(),
            crawl_delay: None,
        }
    }

    /// Builds a policy from robots.txt content
    ///
    /// Blank content yields a permissive policy.
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        if content.trim().is_empty() {
            return Self::permissive(user_agent);
        }

        let robots = ParsedRobots::from_content(content);
        let crawl_delay = robots.crawl_delay(user_agent);
        Self {
            robots: Some(robots),
            user_agent: user_agent.to_string(),
            crawl_delay,
        }
    }

    /// Fetches `/robots.txt` from the origin of `base` with a single GET
    ///
    /// Never fails: any problem is logged and a permissive policy returned.
    pub async fn fetch(
        base: &Url,
        source: &dyn PageSource,
        timeout: Duration,
        user_agent: &str,
    ) -> Self {
        let robots_url = match base.join("/robots.txt") {
            Ok(url) => url,
            Err(err) => {
                let failure = RobotsFetchFailure::from(err);
                tracing::warn!("Failed to fetch robots.txt for {}: {}", base, failure);
                return Self::permissive(user_agent);
            }
        };

        match Self::load(&robots_url, source, timeout).await {
            Ok(content) => {
                tracing::info!("Successfully fetched robots.txt from {}", robots_url);
                let policy = Self::from_content(&content, user_agent);
                if let Some(delay) = policy.crawl_delay {
                    tracing::info!("Crawl delay from robots.txt: {}s", delay);
                }
                policy
            }
            Err(failure) => {
                tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, failure);
                Self::permissive(user_agent)
            }
        }
    }

    async fn load(
        robots_url: &Url,
        source: &dyn PageSource,
        timeout: Duration,
    ) -> Result<String, RobotsFetchFailure> {
        let response = source.get(robots_url.as_str(), timeout).await?;
        if response.is_error() {
            return Err(RobotsFetchFailure::Status(response.status));
        }
        if response.body.trim().is_empty() {
            return Err(RobotsFetchFailure::Empty);
        }
        Ok(response.body)
    }

    /// Returns true if robots.txt was fetched and parsed
    pub fn is_available(&self) -> bool {
        self.robots.is_some()
    }

    /// Checks whether `url` may be fetched by our user agent
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.robots {
            Some(robots) => robots.is_allowed(url, &self.user_agent),
            None => true,
        }
    }

    /// Crawl delay in seconds declared for our user agent
    pub fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }

    /// Sitemap URLs listed in robots.txt
    pub fn sitemaps(&self) -> &[String] {
        match &self.robots {
            Some(robots) => robots.sitemaps(),
            None => &[],
        }
    }
}
