//! Ranking Module
//!
//! Turns a candidate list into one page of ranked output.
//!
//! # Workflow
//! 1. Cap the input at `max_candidates`
//! 2. Score every candidate under the weight profile (malformed ones are dropped)
//! 3. Sort: score desc, then newer first, then candidate id
//! 4. Apply the author diversity cap over the whole sequence
//! 5. Cut the page addressed by the cursor

mod cursor;

pub use cursor::{decode_cursor, encode_cursor};

use crate::error::Result;
use crate::models::{Candidate, RankedPage, ScoredCandidate, ViewerContext};
use crate::services::diversity::{DiversityLayer, DEFAULT_MAX_CONSECUTIVE_FROM_AUTHOR};
use crate::services::scoring::Scorer;
use crate::services::weights::WeightProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

pub const DEFAULT_MAX_CANDIDATES: usize = 200;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankerSettings {
    pub max_consecutive_from_author: usize,
    pub max_candidates: usize,
    pub max_page_size: usize,
}

impl Default for RankerSettings {
    fn default() -> Self {
        Self {
            max_consecutive_from_author: DEFAULT_MAX_CONSECUTIVE_FROM_AUTHOR,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Which page to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl PageRequest {
    pub fn first(page_size: usize) -> Self {
        Self {
            cursor: None,
            page_size,
        }
    }

    pub fn after(cursor: impl Into<String>, page_size: usize) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct Ranker {
    scorer: Scorer,
    diversity: DiversityLayer,
    settings: RankerSettings,
}

impl Ranker {
    pub fn new(scorer: Scorer, settings: RankerSettings) -> Self {
        Self {
            scorer,
            diversity: DiversityLayer::new(settings.max_consecutive_from_author),
            settings,
        }
    }

    pub fn settings(&self) -> &RankerSettings {
        &self.settings
    }

    /// Clamp a requested page size to 1..=max_page_size
    pub fn clamp_page_size(&self, page_size: usize) -> usize {
        page_size.clamp(1, self.settings.max_page_size.max(1))
    }

    pub fn rank(
        &self,
        candidates: &[Candidate],
        viewer: &ViewerContext,
        profile: &WeightProfile,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> Result<RankedPage> {
        // Reject bad cursors before doing any work
        let offset = decode_cursor(page.cursor.as_deref())?;
        let page_size = self.clamp_page_size(page.page_size);

        let ordered = self.rank_all(candidates, viewer, profile, now);
        let total_count = ordered.len();

        let end = offset.saturating_add(page_size);
        let items: Vec<ScoredCandidate> = ordered.into_iter().skip(offset).take(page_size).collect();
        let has_more = end < total_count;
        let next_cursor = has_more.then(|| encode_cursor(end));

        debug!(
            viewer_id = %viewer.viewer_id,
            profile_id = profile.id(),
            offset,
            page_size,
            returned = items.len(),
            total_count,
            "Ranked page"
        );

        Ok(RankedPage {
            profile_id: profile.id().to_string(),
            items,
            next_cursor,
            has_more,
            total_count,
        })
    }

    /// Full diversified ordering, before pagination
    pub fn rank_all(
        &self,
        candidates: &[Candidate],
        viewer: &ViewerContext,
        profile: &WeightProfile,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        if candidates.len() > self.settings.max_candidates {
            warn!(
                viewer_id = %viewer.viewer_id,
                candidate_count = candidates.len(),
                max_candidates = self.settings.max_candidates,
                "Candidate list exceeds limit, truncating"
            );
        }
        let candidates = &candidates[..candidates.len().min(self.settings.max_candidates)];

        let mut scored: Vec<ScoredCandidate> = self
            .scorer
            .score_all(candidates, viewer, profile, now)
            .into_iter()
            .filter_map(|result| match result {
                Ok(scored) => Some(scored),
                Err(e) => {
                    warn!(
                        viewer_id = %viewer.viewer_id,
                        profile_id = profile.id(),
                        error = %e,
                        "Excluding candidate from ranking"
                    );
                    None
                }
            })
            .collect();

        scored.sort_by(compare_ranked);
        self.diversity.rerank(scored)
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(Scorer::default(), RankerSettings::default())
    }
}

/// Score desc, newer first, then ascending id. Total over all inputs.
pub fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.candidate.created_at.cmp(&a.candidate.created_at))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}
