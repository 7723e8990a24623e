//! In-memory HTTP response caching
//!
//! [`CachedSource`] wraps another [`PageSource`] and serves repeated GETs of the
//! same URL from memory while the stored response is younger than the configured
//! expiry. Only `200 OK` responses are stored. Nothing is persisted.

use crate::http::{HttpResponse, PageSource};
use crate::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A cached response with the time it was received
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: HttpResponse,

    pub fetched_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Creates a cache entry stamped with the current time
    pub fn new(response: HttpResponse) -> Self {
        Self {
            response,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the entry is older than `ttl`
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Returns how long ago the response was received
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

/// A [`PageSource`] decorator that caches successful responses by URL
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl<S: PageSource> CachedSource<S> {
    /// Wraps `inner`, keeping responses for `expire_after`
    pub fn new(inner: S, expire_after: std::time::Duration) -> Self {
        let ttl = Duration::from_std(expire_after).unwrap_or(Duration::MAX);
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, including stale ones not yet evicted
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every stored entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lookup(&self, url: &str) -> Option<HttpResponse> {
        let mut entries = self.lock();
        match entries.get(url) {
            Some(entry) if !entry.is_stale(self.ttl) => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    /// Stores a 200 response, evicting every stale entry first
    fn store(&self, url: &str, response: &HttpResponse) {
        if response.status != 200 {
            return;
        }
        let mut entries = self.lock();
        entries.retain(|_, entry| !entry.is_stale(self.ttl));
        entries.insert(url.to_string(), CachedResponse::new(response.clone()));
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedResponse>> {
        // A panic while holding the lock cannot leave a half-written entry behind
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn backdate(&self, url: &str, by: Duration) {
        if let Some(entry) = self.lock().get_mut(url) {
            entry.fetched_at = entry.fetched_at - by;
        }
    }
}

#[async_trait]
impl<S: PageSource> PageSource for CachedSource<S> {
    async fn get(
        &self,
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<HttpResponse, FetchError> {
        if let Some(response) = self.lookup(url) {
            tracing::trace!("Cache hit for {}", url);
            return Ok(response);
        }

        let response = self.inner.get(url, timeout).await?;
        self.store(url, &response);
        Ok(response)
    }

    fn describe(&self) -> String {
        format!("{} (cached, expire_after={}s)", self.inner.describe(), self.ttl.num_seconds())
    }
}
