//! End-to-end evaluation: crawl, parse, extract metrics and score

use crate::config::Config;
use crate::content::{extract_metrics, PageMetrics, PageParser, ParsedPage};
use crate::crawler::{CrawlResult, Crawler};
use crate::http::{CachedSource, PageSource, ReqwestSource};
use crate::scoring::{score_page, PageScore, ScoreWeights};
use crate::Result;
use futures::StreamExt;
use std::sync::Arc;

/// Evaluation of a single page
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub page: ParsedPage,
    pub metrics: PageMetrics,
    pub score: PageScore,
}

/// Crawls a domain and scores every page that was fetched successfully
pub struct EvaluationPipeline {
    crawler: Crawler,
    parser: PageParser,
    weights: ScoreWeights,
}

impl EvaluationPipeline {
    /// Builds the HTTP source, optionally cached, and the crawler from `config`
    pub async fn new(config: &Config) -> Result<Self> {
        // Fail on unusable weights before any request is made
        config.weights.normalize()?;

        let client = ReqwestSource::from_config(&config.crawler)?;
        let source: Arc<dyn PageSource> = if config.cache.enabled {
            tracing::info!(
                "HTTP caching enabled (expire_after={}s)",
                config.cache.expire_after
            );
            Arc::new(CachedSource::new(client, config.cache.ttl()))
        } else {
            Arc::new(client)
        };

        let crawler = Crawler::with_source(config.crawler.clone(), source).await?;
        Self::with_crawler(crawler, config.weights)
    }

    /// Wraps an existing crawler
    pub fn with_crawler(crawler: Crawler, weights: ScoreWeights) -> Result<Self> {
        weights.normalize()?;
        Ok(Self {
            crawler,
            parser: PageParser::default(),
            weights,
        })
    }

    /// Crawls from `seeds` (or the base URL) and evaluates each fetched page
    ///
    /// Failed fetches and empty pages are skipped.
    pub async fn run(&self, seeds: Option<Vec<String>>) -> Result<Vec<EvaluationResult>> {
        let stream = self.crawler.crawl(seeds).into_stream();
        futures::pin_mut!(stream);

        let mut results = Vec::new();
        while let Some(crawled) = stream.next().await {
            if let Some(result) = self.evaluate(&crawled)? {
                results.push(result);
            }
        }

        tracing::info!("Evaluated {} pages", results.len());
        Ok(results)
    }

    /// Parses and scores one crawl result; `None` when it has no usable content
    pub fn evaluate(&self, crawled: &CrawlResult) -> Result<Option<EvaluationResult>> {
        if crawled.error.is_some() || crawled.html.is_empty() {
            return Ok(None);
        }

        let page = self
            .parser
            .parse(&crawled.url, &crawled.html, crawled.fetched_at);
        let metrics = extract_metrics(&page.text, &page.html);
        let score = score_page(&page.url, &metrics, &page.metadata, &self.weights)?;
        tracing::debug!(
            "Scored {}: {} ({})",
            page.url,
            score.composite,
            score.classification
        );

        Ok(Some(EvaluationResult {
            page,
            metrics,
            score,
        }))
    }

    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Closes the underlying crawler
    pub fn close(self) {
        self.crawler.close();
    }
}
