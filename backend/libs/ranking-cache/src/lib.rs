//! Cache backends for the matching and ranking engine
//!
//! Provides a consistent caching surface with:
//! - Versioned key schema keyed by viewer
//! - SCAN-based pattern invalidation (no blocking KEYS)
//! - Redis, in-process and disabled backends behind one object-safe trait
//! - Metrics integration

mod error;
mod keys;
mod memory;
mod metrics;
mod redis_backend;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use memory::MemoryCache;
pub use metrics::CacheMetrics;
pub use redis_backend::{RedisCache, SharedRedis};

use std::sync::Arc;

/// Default TTL values (seconds)
pub mod ttl {
    pub const JOB_PAGE: u64 = 900; // 15 minutes
    pub const FEED_PAGE: u64 = 300; // 5 minutes
    pub const VIEWER_CONTEXT: u64 = 300; // 5 minutes
}

/// Raw cache operations.
///
/// Values are opaque strings. Typed (de)serialization happens in the caller.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a raw value
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a raw value with TTL in seconds
    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()>;

    /// Delete a key
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching a trailing-`*` pattern, returns deleted count
    async fn scan_del(&self, pattern: &str) -> CacheResult<usize>;

    /// Check the backend is reachable
    async fn ping(&self) -> CacheResult<()>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

pub type SharedCache = Arc<dyn CacheBackend>;

/// Backend used when caching is disabled: every read misses, writes vanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait::async_trait]
impl CacheBackend for NoopCache {
    async fn get_raw(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl_secs: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn del(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn scan_del(&self, _pattern: &str) -> CacheResult<usize> {
        Ok(0)
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Add 0-10% jitter to a TTL to prevent thundering herd on expiry
pub(crate) fn add_jitter(ttl_secs: u64) -> u64 {
    let jitter_percent = (rand::random::<u32>() % 10) as f64 / 100.0;
    let jitter = (ttl_secs as f64 * jitter_percent).round() as u64;
    ttl_secs + jitter
}
