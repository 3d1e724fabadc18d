//! Pre-apply matching
//!
//! When a job is posted, score it against every viewer who opted in to
//! pre-apply alerts and keep the ones at or above a threshold. The caller
//! supplies the opted-in viewers and delivers the notifications.

use crate::error::{MatchingError, Result};
use crate::models::{Candidate, Factor, ViewerContext};
use crate::services::scoring::Scorer;
use crate::services::weights::WeightProfile;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreApplyMatch {
    pub viewer_id: Uuid,
    pub score: f64,
    pub breakdown: BTreeMap<Factor, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PreApplyMatcher {
    scorer: Scorer,
}

impl PreApplyMatcher {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }

    /// Matches sorted by score desc, then viewer id.
    ///
    /// Viewers with an employment-type preference that excludes the job's
    /// type are skipped.
    pub fn match_job(
        &self,
        job: &Candidate,
        viewers: &[ViewerContext],
        profile: &WeightProfile,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreApplyMatch>> {
        let Some(attrs) = job.job() else {
            return Err(MatchingError::InvalidRequest(format!(
                "pre-apply matching needs a job, {} is a post",
                job.id
            )));
        };
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(MatchingError::InvalidRequest(format!(
                "threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        let mut matches: Vec<PreApplyMatch> = viewers
            .par_iter()
            .filter(|viewer| match attrs.employment_type {
                Some(kind) => {
                    viewer.employment_types.is_empty() || viewer.employment_types.contains(&kind)
                }
                None => true,
            })
            .filter_map(|viewer| match self.scorer.score(job, viewer, profile, now) {
                Ok(scored) => Some(PreApplyMatch {
                    viewer_id: viewer.viewer_id,
                    score: scored.score,
                    breakdown: scored.breakdown,
                }),
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        viewer_id = %viewer.viewer_id,
                        error = %e,
                        "Skipping viewer in pre-apply matching"
                    );
                    None
                }
            })
            .filter(|m| m.score >= threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.viewer_id.cmp(&b.viewer_id))
        });

        debug!(
            job_id = %job.id,
            profile_id = profile.id(),
            viewers = viewers.len(),
            matched = matches.len(),
            threshold,
            "Pre-apply matching complete"
        );

        Ok(matches)
    }
}
