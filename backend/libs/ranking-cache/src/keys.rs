//! Unified cache key schema
//!
//! Key format: v{VERSION}:{entity}:{viewer_id}[:sub_key...]
//! The viewer id always comes right after the entity so that every entry
//! belonging to one viewer can be removed with a single prefix pattern.

use uuid::Uuid;

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    // ============= Ranked Page Keys =============

    /// Ranked page for a viewer on one surface under one weight profile
    /// Format: v1:rank:{viewer_id}:{surface}:{profile_id}:{page_size}:{cursor}
    ///
    /// The first page uses `start` as its cursor segment.
    pub fn ranked_page(
        viewer_id: Uuid,
        surface: &str,
        profile_id: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> String {
        format!(
            "v{}:rank:{}:{}:{}:{}:{}",
            CACHE_VERSION,
            viewer_id,
            surface,
            profile_id,
            page_size,
            cursor.filter(|c| !c.is_empty()).unwrap_or("start")
        )
    }

    /// Pattern matching every ranked page of a viewer
    pub fn ranked_page_pattern(viewer_id: Uuid) -> String {
        format!("v{}:rank:{}:*", CACHE_VERSION, viewer_id)
    }

    // ============= Viewer Context Keys =============

    /// Viewer context cache
    /// Format: v1:ctx:{viewer_id}
    pub fn viewer_context(viewer_id: Uuid) -> String {
        format!("v{}:ctx:{}", CACHE_VERSION, viewer_id)
    }

    // ============= Utility =============

    /// Extract entity type from key
    pub fn entity_type(key: &str) -> Option<&str> {
        // Format: v{N}:{entity}:...
        let mut parts = key.split(':');
        match (parts.next(), parts.next()) {
            (Some(_), Some(entity)) => Some(entity),
            _ => None,
        }
    }
}
