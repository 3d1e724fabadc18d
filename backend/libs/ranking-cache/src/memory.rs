//! In-process cache backend
//!
//! Process-local store for single-instance deployments and tests.
//! Entries expire lazily on read; pattern invalidation is prefix matching on
//! the part of the pattern before the trailing `*`.

use crate::{CacheBackend, CacheMetrics, CacheResult};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default maximum number of entries
const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct CachedEntry {
    value: String,
    expires_at: Instant,
}

impl CachedEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    #[inline]
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// DashMap-backed cache with TTL expiry and an entry limit
pub struct MemoryCache {
    store: DashMap<String, CachedEntry>,
    max_entries: usize,
    metrics: CacheMetrics,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            store: DashMap::new(),
            max_entries: max_entries.max(1),
            metrics: CacheMetrics::new(),
        }
    }

    /// Number of live (possibly expired but not yet evicted) entries
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Evict 10% of entries (at least one) once the limit is reached.
    /// Expired entries go first.
    fn enforce_limits(&self) {
        if self.store.len() < self.max_entries {
            return;
        }

        self.store.retain(|_, entry| !entry.is_expired());
        if self.store.len() < self.max_entries {
            return;
        }

        let evict_count = (self.store.len() / 10).max(1);
        warn!(
            current_entries = self.store.len(),
            evict_count, "Memory cache limit exceeded, evicting entries"
        );

        let keys_to_evict: Vec<String> = self
            .store
            .iter()
            .take(evict_count)
            .map(|entry| entry.key().clone())
            .collect();

        for key in keys_to_evict {
            self.store.remove(&key);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                debug!(key = %key, "Cache hit");
                self.metrics.record_hit(key);
                return Ok(Some(entry.value.clone()));
            }
            drop(entry); // Release read guard before removing
            self.store.remove(key);
        }

        debug!(key = %key, "Cache miss");
        self.metrics.record_miss(key);
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        if ttl_secs == 0 {
            return Ok(());
        }

        self.enforce_limits();
        self.store.insert(
            key.to_string(),
            CachedEntry::new(value, Duration::from_secs(ttl_secs)),
        );

        debug!(key = %key, ttl = ttl_secs, "Cache set");
        self.metrics.record_write(key);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        if self.store.remove(key).is_some() {
            self.metrics.record_invalidation(key, 1);
        }
        Ok(())
    }

    async fn scan_del(&self, pattern: &str) -> CacheResult<usize> {
        let prefix = pattern.trim_end_matches('*');

        let keys_to_remove: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();

        let mut deleted = 0;
        for key in keys_to_remove {
            if self.store.remove(&key).is_some() {
                deleted += 1;
            }
        }

        debug!(pattern = %pattern, deleted, "Cache scan delete");
        self.metrics.record_invalidation(pattern, deleted);
        Ok(deleted)
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
