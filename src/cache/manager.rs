// src/cache/manager.rs

use crate::constants::INVALIDATION_LOG_CAPACITY;
use crate::error::AppError;
use crate::revalidation::{Invalidation, Revalidator};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};

/// Tags and site path a cached value belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheScope {
    pub tags: Vec<String>,
    pub path: Option<String>,
}

impl CacheScope {
    pub fn tagged(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            path: None,
        }
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    json: String,
    scope: CacheScope,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }

    fn approximate_size(&self, key: &str) -> usize {
        key.len()
            + self.json.len()
            + self.scope.tags.iter().map(String::len).sum::<usize>()
            + self.scope.path.as_ref().map_or(0, String::len)
    }
}

/// A completed invalidation, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationRecord {
    pub target: Invalidation,
    pub removed: usize,
    pub at: DateTime<Utc>,
}

/// Snapshot of the cache for the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub expired: usize,
    pub approximate_size_bytes: usize,
    pub last_invalidation: Option<InvalidationRecord>,
}

/// Process-lifetime cache shared by all handlers through the router state.
///
/// Concurrent requests for the same missing key may both compute it; the
/// later insert wins.
pub struct CacheManager {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    invalidations: Mutex<VecDeque<InvalidationRecord>>,
}

impl CacheManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            invalidations: Mutex::new(VecDeque::with_capacity(INVALIDATION_LOG_CAPACITY)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached value or compute, cache and return it.
    ///
    /// Errors from `compute` are returned and nothing is cached. A value
    /// that fails to (de)serialize is served uncached.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        scope: CacheScope,
        compute: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(json) = self.lookup(key) {
            match serde_json::from_str(&json) {
                Ok(value) => {
                    log::debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => {
                    log::warn!("Discarding unreadable cache entry {}: {}", key, e);
                    self.entries.remove(key);
                }
            }
        }

        log::debug!("Cache miss: {}", key);
        let value = compute().await?;

        match serde_json::to_string(&value) {
            Ok(json) => {
                self.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        json,
                        scope,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(e) => log::warn!("Failed to serialize {} for cache: {}", key, e),
        }

        Ok(value)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let fresh = self
            .entries
            .get(key)
            .and_then(|entry| (!entry.is_expired(now, self.ttl)).then(|| entry.json.clone()));
        if fresh.is_none() {
            self.entries
                .remove_if(key, |_, entry| entry.is_expired(now, self.ttl));
        }
        fresh
    }

    /// Drop every entry carrying `tag`. Returns how many were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let removed = self.remove_where(|entry| entry.scope.tags.iter().any(|t| t == tag));
        self.record(Invalidation::tag(tag), removed);
        removed
    }

    /// Drop every entry backing site path `path`. Returns how many were removed.
    pub fn invalidate_path(&self, path: &str) -> usize {
        let removed = self.remove_where(|entry| entry.scope.path.as_deref() == Some(path));
        self.record(Invalidation::path(path), removed);
        removed
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        self.remove_where(|entry| entry.is_expired(now, self.ttl))
    }

    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let drop = predicate(entry);
            removed += usize::from(drop);
            !drop
        });
        removed
    }

    fn record(&self, target: Invalidation, removed: usize) {
        log::debug!("Invalidated {} ({} entries)", target, removed);
        let mut log = self.invalidations.lock();
        if log.len() == INVALIDATION_LOG_CAPACITY {
            log.pop_front();
        }
        log.push_back(InvalidationRecord {
            target,
            removed,
            at: Utc::now(),
        });
    }

    /// Most recent invalidations, oldest first.
    pub fn recent_invalidations(&self) -> Vec<InvalidationRecord> {
        self.invalidations.lock().iter().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut stats = CacheStats {
            entries: 0,
            expired: 0,
            approximate_size_bytes: 0,
            last_invalidation: self.invalidations.lock().back().cloned(),
        };
        for item in self.entries.iter() {
            stats.entries += 1;
            if item.value().is_expired(now, self.ttl) {
                stats.expired += 1;
            }
            stats.approximate_size_bytes += item.value().approximate_size(item.key());
        }
        stats
    }
}

#[async_trait::async_trait]
impl Revalidator for CacheManager {
    async fn revalidate_tag(&self, tag: &str) -> Result<(), AppError> {
        self.invalidate_tag(tag);
        Ok(())
    }

    async fn revalidate_path(&self, path: &str) -> Result<(), AppError> {
        self.invalidate_path(path);
        Ok(())
    }
}
