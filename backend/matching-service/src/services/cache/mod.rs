//! Ranking cache
//!
//! Read-through cache for ranked pages and viewer contexts over any
//! [`CacheBackend`]. Backend failures are logged and behave like misses.
//!
//! Key layout (see [`CacheKey`]):
//! - `v1:rank:{viewer_id}:{surface}:{profile_id}:{page_size}:{cursor|start}` → RankedPage
//! - `v1:ctx:{viewer_id}` → ViewerContext
//!
//! Writes are guarded by a per-viewer epoch: a value built before an
//! invalidation is never left in the cache after it.

mod epoch;

use crate::error::Result;
use crate::models::{RankedPage, RankingSurface, ViewerContext};
use epoch::{EpochTracker, DEFAULT_PRUNE_THRESHOLD};
use ranking_cache::{ttl, CacheBackend, CacheKey, SharedCache};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cache TTLs in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub job_page: u64,
    pub feed_page: u64,
    pub viewer_context: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            job_page: ttl::JOB_PAGE,
            feed_page: ttl::FEED_PAGE,
            viewer_context: ttl::VIEWER_CONTEXT,
        }
    }
}

impl CacheTtls {
    pub fn page_ttl(&self, surface: RankingSurface) -> u64 {
        match surface {
            RankingSurface::Jobs => self.job_page,
            RankingSurface::Feed => self.feed_page,
        }
    }

    /// Longest lifetime of any cached entry
    pub fn longest(&self) -> Duration {
        Duration::from_secs(self.job_page.max(self.feed_page).max(self.viewer_context))
    }
}

/// Identity of one cached ranked page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageKey<'a> {
    pub viewer_id: Uuid,
    pub surface: RankingSurface,
    pub profile_id: &'a str,
    pub page_size: usize,
    pub cursor: Option<&'a str>,
}

impl PageKey<'_> {
    pub fn cache_key(&self) -> String {
        CacheKey::ranked_page(
            self.viewer_id,
            self.surface.as_str(),
            self.profile_id,
            self.page_size,
            self.cursor,
        )
    }
}

#[derive(Clone)]
pub struct RankingCache {
    backend: SharedCache,
    ttls: CacheTtls,
    epochs: Arc<EpochTracker>,
}

impl RankingCache {
    pub fn new(backend: SharedCache, ttls: CacheTtls) -> Self {
        Self {
            backend,
            ttls,
            epochs: Arc::new(EpochTracker::new(ttls.longest(), DEFAULT_PRUNE_THRESHOLD)),
        }
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttls
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Invalidation epoch of a viewer. Snapshot it before reading anything
    /// that a cached value will be derived from.
    pub fn epoch(&self, viewer_id: Uuid) -> u64 {
        self.epochs.current(viewer_id)
    }

    /// Return the cached page for this key or compute, store and return it.
    ///
    /// Compute errors propagate and nothing is written.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &PageKey<'_>,
        ttl_secs: u64,
        compute: F,
    ) -> Result<RankedPage>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RankedPage>>,
    {
        let epoch = self.epoch(key.viewer_id);
        self.get_or_compute_from(epoch, key, ttl_secs, compute).await
    }

    /// Like [`get_or_compute`](Self::get_or_compute), with the epoch
    /// snapshotted by the caller. The computed page is not kept in the cache
    /// if the viewer was invalidated at any point after `epoch`.
    pub async fn get_or_compute_from<F, Fut>(
        &self,
        epoch: u64,
        key: &PageKey<'_>,
        ttl_secs: u64,
        compute: F,
    ) -> Result<RankedPage>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RankedPage>>,
    {
        let viewer_id = key.viewer_id;
        let key = key.cache_key();

        if let Some(page) = self.read::<RankedPage>(&key).await {
            debug!(viewer_id = %viewer_id, key = %key, "Ranked page cache hit");
            return Ok(page);
        }
        debug!(viewer_id = %viewer_id, key = %key, "Ranked page cache miss");

        let page = compute().await?;
        self.write_guarded(viewer_id, epoch, &key, &page, ttl_secs).await;
        Ok(page)
    }

    pub async fn get_viewer_context(&self, viewer_id: Uuid) -> Option<ViewerContext> {
        let key = CacheKey::viewer_context(viewer_id);
        let context = self.read::<ViewerContext>(&key).await;
        debug!(
            viewer_id = %viewer_id,
            hit = context.is_some(),
            "Viewer context cache lookup"
        );
        context
    }

    pub async fn set_viewer_context(&self, context: &ViewerContext) {
        let epoch = self.epoch(context.viewer_id);
        self.set_viewer_context_from(epoch, context).await;
    }

    /// Store a context loaded after `epoch` was snapshotted
    pub async fn set_viewer_context_from(&self, epoch: u64, context: &ViewerContext) {
        let key = CacheKey::viewer_context(context.viewer_id);
        self.write_guarded(context.viewer_id, epoch, &key, context, self.ttls.viewer_context)
            .await;
    }

    /// Drop every cached ranked page of a viewer. Returns the number of
    /// entries deleted (0 when the backend failed).
    pub async fn invalidate_viewer_pages(&self, viewer_id: Uuid) -> usize {
        self.epochs.bump(viewer_id);
        let pattern = CacheKey::ranked_page_pattern(viewer_id);
        match self.backend.scan_del(&pattern).await {
            Ok(count) => {
                debug!(viewer_id = %viewer_id, deleted = count, "Invalidated ranked pages");
                count
            }
            Err(e) => {
                warn!(
                    viewer_id = %viewer_id,
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to invalidate ranked pages"
                );
                0
            }
        }
    }

    /// Invalidate ranked pages for everyone who may see a new candidate
    pub async fn invalidate_audience(&self, viewers: &[Uuid]) -> usize {
        let mut deleted = 0;
        for viewer_id in viewers {
            deleted += self.invalidate_viewer_pages(*viewer_id).await;
        }
        deleted
    }

    /// Drop the cached context and every ranked page built from it
    pub async fn invalidate_viewer_context(&self, viewer_id: Uuid) -> usize {
        self.epochs.bump(viewer_id);
        let key = CacheKey::viewer_context(viewer_id);
        let mut deleted = 0;
        match self.backend.del(&key).await {
            Ok(()) => deleted += 1,
            Err(e) => warn!(
                viewer_id = %viewer_id,
                backend = self.backend.name(),
                error = %e,
                "Failed to invalidate viewer context"
            ),
        }
        deleted + self.invalidate_viewer_pages(viewer_id).await
    }

    /// Write unless the viewer moved past `epoch`. An invalidation that
    /// lands while the write is in flight removes the entry again.
    async fn write_guarded<T: Serialize>(
        &self,
        viewer_id: Uuid,
        epoch: u64,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) {
        if self.epoch(viewer_id) != epoch {
            debug!(
                viewer_id = %viewer_id,
                key = %key,
                "Viewer invalidated during compute, skipping cache write"
            );
            return;
        }

        self.write(key, value, ttl_secs).await;

        if self.epoch(viewer_id) != epoch {
            debug!(
                viewer_id = %viewer_id,
                key = %key,
                "Viewer invalidated during cache write, removing entry"
            );
            if let Err(e) = self.backend.del(key).await {
                warn!(
                    key = %key,
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to remove stale cache entry"
                );
            }
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get_raw(key).await {
            Ok(Some(json)) => match serde_json::from_str::<T>(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(
                    key = %key,
                    backend = self.backend.name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache serialization failed");
                return;
            }
        };

        if let Err(e) = self.backend.set_raw(key, json, ttl_secs).await {
            warn!(
                key = %key,
                backend = self.backend.name(),
                error = %e,
                "Cache write failed"
            );
        }
    }
}

impl std::fmt::Debug for RankingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingCache")
            .field("backend", &self.backend.name())
            .field("ttls", &self.ttls)
            .finish()
    }
}
