//! Matching pipeline
//!
//! Candidate Source → Scorer → Ranker → Ranking Cache → caller.
//!
//! Profile resolution order for a request: explicit profile id, then the
//! experiment registered for the surface, then the surface default.

use crate::error::Result;
use crate::models::{RankedPage, RankingSurface};
use crate::services::cache::{PageKey, RankingCache};
use crate::services::context::ContextLoader;
use crate::services::ranking::{decode_cursor, PageRequest, Ranker};
use crate::services::sources::{CandidateSource, ViewerContextSource};
use crate::services::weights::{
    ProfileExperiment, ProfileRegistry, WeightProfile, FEED_PROFILE, JOB_MATCH_PROFILE,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub viewer_id: Uuid,
    pub surface: RankingSurface,
    /// Overrides experiment and surface default
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl RankingRequest {
    pub fn new(viewer_id: Uuid, surface: RankingSurface) -> Self {
        Self {
            viewer_id,
            surface,
            profile_id: None,
            page: PageRequest::default(),
        }
    }

    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

pub struct MatchingService {
    profiles: Arc<ProfileRegistry>,
    experiments: HashMap<RankingSurface, ProfileExperiment>,
    ranker: Arc<Ranker>,
    cache: RankingCache,
    contexts: ContextLoader,
    candidates: Arc<dyn CandidateSource>,
}

impl MatchingService {
    pub fn new(
        profiles: Arc<ProfileRegistry>,
        ranker: Arc<Ranker>,
        cache: RankingCache,
        candidates: Arc<dyn CandidateSource>,
        contexts: Arc<dyn ViewerContextSource>,
    ) -> Self {
        Self {
            profiles,
            experiments: HashMap::new(),
            ranker,
            contexts: ContextLoader::new(contexts, cache.clone()),
            cache,
            candidates,
        }
    }

    /// Split a surface's default traffic across profiles
    pub fn with_experiment(mut self, surface: RankingSurface, experiment: ProfileExperiment) -> Self {
        info!(
            surface = surface.as_str(),
            experiment = experiment.name(),
            variants = experiment.variants().len(),
            "Registered profile experiment"
        );
        self.experiments.insert(surface, experiment);
        self
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Weight profile used for a request
    pub fn resolve_profile(&self, request: &RankingRequest) -> Result<Arc<WeightProfile>> {
        let profile_id = match &request.profile_id {
            Some(id) => id.as_str(),
            None => match self.experiments.get(&request.surface) {
                Some(experiment) => experiment.assign(request.viewer_id),
                None => default_profile(request.surface),
            },
        };
        self.profiles.require(profile_id)
    }

    pub async fn ranked_page(&self, request: &RankingRequest) -> Result<RankedPage> {
        let profile = self.resolve_profile(request)?;
        decode_cursor(request.page.cursor.as_deref())?;
        let page_size = self.ranker.clamp_page_size(request.page.page_size);
        let viewer_id = request.viewer_id;
        let surface = request.surface;

        // Pages built from a context that is invalidated mid-request are not cached
        let epoch = self.cache.epoch(viewer_id);
        let context = self.contexts.load(viewer_id).await?;

        let page = PageRequest {
            cursor: request.page.cursor.clone(),
            page_size,
        };
        let key = PageKey {
            viewer_id,
            surface,
            profile_id: profile.id(),
            page_size,
            cursor: page.cursor.as_deref(),
        };

        self.cache
            .get_or_compute_from(
                epoch,
                &key,
                self.cache.ttls().page_ttl(surface),
                || async {
                    let mut candidates = self.candidates.fetch_candidates(viewer_id, surface).await?;
                    let fetched = candidates.len();
                    candidates.retain(|c| c.kind() == surface);
                    if candidates.len() != fetched {
                        debug!(
                            viewer_id = %viewer_id,
                            surface = surface.as_str(),
                            dropped = fetched - candidates.len(),
                            "Dropped candidates of another kind"
                        );
                    }
                    self.ranker
                        .rank(&candidates, &context, &profile, &page, Utc::now())
                },
            )
            .await
    }

    /// New candidate: everyone who may see it gets fresh pages
    pub async fn on_candidate_created(&self, audience: &[Uuid]) -> usize {
        let deleted = self.cache.invalidate_audience(audience).await;
        debug!(
            audience = audience.len(),
            deleted, "Invalidated ranked pages for new candidate"
        );
        deleted
    }

    pub async fn on_viewer_context_changed(&self, viewer_id: Uuid) -> usize {
        self.cache.invalidate_viewer_context(viewer_id).await
    }
}

pub fn default_profile(surface: RankingSurface) -> &'static str {
    match surface {
        RankingSurface::Jobs => JOB_MATCH_PROFILE,
        RankingSurface::Feed => FEED_PROFILE,
    }
}
