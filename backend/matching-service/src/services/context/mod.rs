use crate::error::{MatchingError, Result};
use crate::models::ViewerContext;
use crate::services::cache::RankingCache;
use crate::services::sources::ViewerContextSource;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Viewer context lookup through the ranking cache.
///
/// Rebuilt lazily: a miss (or an invalidated entry) loads from the source
/// and refills the cache. A context invalidated while it was loading is
/// returned to the caller but not cached.
#[derive(Clone)]
pub struct ContextLoader {
    source: Arc<dyn ViewerContextSource>,
    cache: RankingCache,
}

impl ContextLoader {
    pub fn new(source: Arc<dyn ViewerContextSource>, cache: RankingCache) -> Self {
        Self { source, cache }
    }

    pub async fn load(&self, viewer_id: Uuid) -> Result<ViewerContext> {
        if let Some(context) = self.cache.get_viewer_context(viewer_id).await {
            return Ok(context);
        }

        let epoch = self.cache.epoch(viewer_id);
        let context = self.source.load_context(viewer_id).await.map_err(|e| {
            warn!(viewer_id = %viewer_id, error = %e, "Failed to load viewer context");
            match e {
                MatchingError::ContextUnavailable { .. } => e,
                other => MatchingError::context_unavailable(viewer_id, other.to_string()),
            }
        })?;

        if context.viewer_id != viewer_id {
            return Err(MatchingError::context_unavailable(
                viewer_id,
                format!("source returned context for {}", context.viewer_id),
            ));
        }

        debug!(viewer_id = %viewer_id, "Loaded viewer context from source");
        self.cache.set_viewer_context_from(epoch, &context).await;
        Ok(context)
    }
}
