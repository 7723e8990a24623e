//! Breadth-first crawl scheduling
//!
//! This module handles:
//! - The FIFO frontier of URLs waiting to be fetched
//! - The visited set, updated when an entry is admitted for dispatch
//! - Robots.txt admission checks
//! - Sequential or batched parallel dispatch to fetch workers
//! - The page and depth bounds of a crawl
//!
//! Results are pulled one at a time with [`CrawlScheduler::next`], or as a
//! stream with [`CrawlScheduler::into_stream`]. No work happens between pulls
//! except the fetches of an already dispatched parallel batch.

use crate::crawler::{extract_links, CrawlResult, FetchEngine};
use crate::robots::RobotsPolicy;
use crate::url::{normalize_url, TargetHost};
use futures::{FutureExt, Stream};
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,

    /// Link distance from the seeds
    pub depth: u32,

    /// Normalized URL of the page the link was found on
    pub referer: Option<String>,
}

impl FrontierEntry {
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            referer: None,
        }
    }
}

/// How admitted entries are handed to fetch workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One fetch at a time, strict breadth-first order
    Sequential,

    /// Batches of up to `workers` concurrent fetches, results in completion order
    Parallel { workers: usize },
}

impl DispatchMode {
    /// `max_workers <= 1` selects sequential mode
    pub fn from_workers(max_workers: usize) -> Self {
        if max_workers > 1 {
            Self::Parallel {
                workers: max_workers,
            }
        } else {
            Self::Sequential
        }
    }
}

/// A fetched entry paired with its result
#[derive(Debug)]
pub struct WorkerOutcome {
    pub entry: FrontierEntry,
    pub result: CrawlResult,
}

/// Crawl bounds applied by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum number of results produced
    pub max_pages: usize,

    /// Links are followed only from pages shallower than this
    pub max_depth: u32,
}

/// Pull-based breadth-first scheduler for one crawl
///
/// The frontier, the visited set and the counters are only touched through
/// `&mut self`; workers receive an owned entry and an `Arc` to the engine.
/// Dropping the scheduler aborts the fetches of the current parallel batch.
pub struct CrawlScheduler {
    engine: Arc<FetchEngine>,
    robots: Arc<RobotsPolicy>,
    target: TargetHost,
    mode: DispatchMode,
    limits: CrawlLimits,
    frontier: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    produced: usize,
    in_flight: JoinSet<WorkerOutcome>,
    finished: bool,
}

impl CrawlScheduler {
    pub fn new(
        engine: Arc<FetchEngine>,
        robots: Arc<RobotsPolicy>,
        target: TargetHost,
        mode: DispatchMode,
        limits: CrawlLimits,
        seeds: Vec<String>,
    ) -> Self {
        Self {
            engine,
            robots,
            target,
            mode,
            limits,
            frontier: seeds.into_iter().map(FrontierEntry::seed).collect(),
            visited: HashSet::new(),
            produced: 0,
            in_flight: JoinSet::new(),
            finished: false,
        }
    }

    /// Produces the next crawl result, or `None` once the crawl is over
    pub async fn next(&mut self) -> Option<CrawlResult> {
        loop {
            if self.finished {
                return None;
            }

            match self.mode {
                DispatchMode::Sequential => {
                    if self.produced >= self.limits.max_pages {
                        return self.finish();
                    }
                    let Some(entry) = self.admit_next() else {
                        return self.finish();
                    };
                    let outcome = run_worker(Arc::clone(&self.engine), entry).await;
                    return Some(self.record(outcome));
                }
                DispatchMode::Parallel { workers } => {
                    if self.in_flight.is_empty() && !self.dispatch_batch(workers) {
                        return self.finish();
                    }

                    match self.in_flight.join_next().await {
                        Some(Ok(outcome)) => return Some(self.record(outcome)),
                        Some(Err(join_error)) => {
                            tracing::error!("Fetch worker failed: {}", join_error);
                        }
                        None => {}
                    }
                }
            }
        }
    }

    /// Turns the scheduler into a stream of results
    pub fn into_stream(self) -> impl Stream<Item = CrawlResult> + Send {
        futures::stream::unfold(self, |mut scheduler| async move {
            let result = scheduler.next().await?;
            Some((result, scheduler))
        })
    }

    /// Normalized URLs admitted or rejected so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Number of results produced so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Pops frontier entries until one is admitted
    ///
    /// Admitted and robots-disallowed URLs are both marked visited, so each URL
    /// is checked against robots.txt once.
    fn admit_next(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.frontier.pop_front() {
            let normalized = normalize_url(&entry.url);
            if self.visited.contains(&normalized) {
                continue;
            }

            if !self.robots.is_allowed(&normalized) {
                tracing::info!("URL disallowed by robots.txt: {}", normalized);
                self.visited.insert(normalized);
                continue;
            }

            self.visited.insert(normalized.clone());
            return Some(FrontierEntry {
                url: normalized,
                ..entry
            });
        }
        None
    }

    /// Spawns the next batch; returns false if nothing could be admitted
    fn dispatch_batch(&mut self, workers: usize) -> bool {
        let mut batch_len = 0;
        while batch_len < workers && self.produced + batch_len < self.limits.max_pages {
            let Some(entry) = self.admit_next() else {
                break;
            };
            self.in_flight
                .spawn(run_worker(Arc::clone(&self.engine), entry));
            batch_len += 1;
        }

        if batch_len > 0 {
            tracing::debug!("Dispatched batch of {} fetches", batch_len);
        }
        batch_len > 0
    }

    /// Counts a result and enqueues its links
    fn record(&mut self, outcome: WorkerOutcome) -> CrawlResult {
        let WorkerOutcome { entry, result } = outcome;
        self.produced += 1;

        match &result.error {
            Some(error) => tracing::warn!("Error fetching {}: {}", entry.url, error),
            None => tracing::info!(
                "Successfully crawled [{}/{}]: {}",
                self.produced,
                self.limits.max_pages,
                entry.url
            ),
        }

        if result.error.is_none() && entry.depth < self.limits.max_depth {
            self.expand(&entry, &result.html);
        }

        result
    }

    fn expand(&mut self, entry: &FrontierEntry, html: &str) {
        for link in extract_links(html, &entry.url, &self.target) {
            if self.visited.contains(&link) {
                continue;
            }
            if self.robots.is_allowed(&link) {
                self.frontier.push_back(FrontierEntry {
                    url: link,
                    depth: entry.depth + 1,
                    referer: Some(entry.url.clone()),
                });
            } else {
                tracing::info!("URL disallowed by robots.txt: {}", link);
                self.visited.insert(link);
            }
        }
    }

    fn finish(&mut self) -> Option<CrawlResult> {
        if !self.finished {
            self.finished = true;
            tracing::info!("Crawl completed. Total pages crawled: {}", self.produced);
        }
        None
    }
}

/// Fetches one entry, turning a panic into a failed result
async fn run_worker(engine: Arc<FetchEngine>, entry: FrontierEntry) -> WorkerOutcome {
    let fetch = engine.fetch(&entry.url, entry.referer.clone());
    let result = match AssertUnwindSafe(fetch).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("Unexpected error processing {}: {}", entry.url, message);
            CrawlResult::failure(
                &entry.url,
                None,
                format!("Unexpected worker error: {}", message),
                entry.referer.clone(),
            )
        }
    };
    WorkerOutcome { entry, result }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Computes the politeness delay for a crawl
///
/// Returns the larger of the configured delay and the robots.txt crawl delay.
pub fn effective_delay(config_delay: Duration, robots: &RobotsPolicy) -> Duration {
    let robots_delay = robots
        .crawl_delay()
        .map(crate::config::seconds)
        .unwrap_or(Duration::ZERO);

    std::cmp::max(config_delay, robots_delay)
}
