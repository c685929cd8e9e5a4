//! In-memory cache manager for upstream API responses
//!
//! Provides a `CacheManager` that keeps one payload per (page, league) key
//! together with the time it was fetched. Entries older than the TTL are
//! ignored and replaced on the next fetch.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use tracing::debug;

/// Default time-to-live for cached responses in seconds
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// A cached payload and the moment it was fetched
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Manages cached payloads keyed by catalog page and league
///
/// At most one entry exists per key. Stale entries are never removed, only
/// overwritten, so the map grows with the number of distinct keys seen.
#[derive(Debug, Clone)]
pub struct CacheManager<T> {
    entries: HashMap<(String, String), CacheEntry<T>>,
    ttl: Duration,
}

impl<T> Default for CacheManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheManager<T> {
    /// Creates an empty cache with the default one hour TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    /// Creates an empty cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns the configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(page: &str, league: &str) -> (String, String) {
        (page.to_string(), league.to_string())
    }

    fn is_fresh(&self, key: &(String, String), now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| now - entry.cached_at < self.ttl)
    }

    /// Reads a fresh entry, if there is one
    pub fn read(&self, page: &str, league: &str, now: DateTime<Utc>) -> Option<&T> {
        let key = Self::key(page, league);
        if !self.is_fresh(&key, now) {
            return None;
        }
        self.entries.get(&key).map(|entry| &entry.data)
    }

    /// Stores data under (page, league), replacing any previous entry
    pub fn write(&mut self, page: &str, league: &str, data: T, now: DateTime<Utc>) {
        self.entries.insert(
            Self::key(page, league),
            CacheEntry {
                data,
                cached_at: now,
            },
        );
    }

    /// Returns the cached payload, calling `fetch` only when the entry is
    /// missing or stale
    pub async fn get_or_fetch<F, Fut, E>(&mut self, page: &str, league: &str, fetch: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_fetch_at(page, league, Utc::now(), fetch).await
    }

    /// Same as [`CacheManager::get_or_fetch`] with an explicit clock
    ///
    /// A failed fetch leaves the existing entry untouched.
    pub async fn get_or_fetch_at<F, Fut, E>(
        &mut self,
        page: &str,
        league: &str,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = Self::key(page, league);

        if self.is_fresh(&key, now) {
            debug!(page, league, "cache hit");
        } else {
            debug!(page, league, "cache miss");
            let data = fetch().await?;
            self.entries.insert(
                key.clone(),
                CacheEntry {
                    data,
                    cached_at: now,
                },
            );
        }

        Ok(&self.entries[&key].data)
    }
}
