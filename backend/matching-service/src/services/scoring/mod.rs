//! Candidate Scoring Module
//!
//! Combines per-factor signals into one aggregate score under a weight
//! profile. The scorer holds only shared, immutable state and may serve any
//! number of ranking passes at once.

use crate::error::{MatchingError, Result};
use crate::models::{Candidate, ScoredCandidate, ViewerContext};
use crate::services::signals::{SignalInput, SignalRegistry};
use crate::services::weights::WeightProfile;
use crate::utils::clamp_unit;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Scorer {
    signals: Arc<SignalRegistry>,
}

impl Scorer {
    pub fn new(signals: Arc<SignalRegistry>) -> Self {
        Self { signals }
    }

    pub fn signals(&self) -> &SignalRegistry {
        &self.signals
    }

    /// Score one candidate for one viewer.
    ///
    /// Each profile factor is computed once, multiplied by its weight and
    /// summed in factor order. A malformed candidate, a factor with no
    /// calculator, or a signal outside [0, 1] is a `CandidateData` error.
    pub fn score(
        &self,
        candidate: &Candidate,
        viewer: &ViewerContext,
        profile: &WeightProfile,
        now: DateTime<Utc>,
    ) -> Result<ScoredCandidate> {
        validate_candidate(candidate)?;

        let input = SignalInput {
            candidate,
            viewer,
            now,
        };

        let mut breakdown = BTreeMap::new();
        let mut total = 0.0;
        for (factor, weight) in profile.weights() {
            let calculator = self.signals.get(factor).ok_or_else(|| {
                MatchingError::candidate_data(
                    candidate.id,
                    format!("no calculator registered for {}", factor),
                )
            })?;

            let signal = calculator.compute(&input);
            if !signal.is_finite() || !(0.0..=1.0).contains(&signal) {
                return Err(MatchingError::candidate_data(
                    candidate.id,
                    format!("{} produced out-of-range signal {}", factor, signal),
                ));
            }

            let contribution = weight * signal;
            total += contribution;
            breakdown.insert(factor, contribution);
        }

        Ok(ScoredCandidate {
            candidate: candidate.clone(),
            score: clamp_unit(total),
            breakdown,
        })
    }

    /// Score a batch in parallel; results keep input order.
    pub fn score_all(
        &self,
        candidates: &[Candidate],
        viewer: &ViewerContext,
        profile: &WeightProfile,
        now: DateTime<Utc>,
    ) -> Vec<Result<ScoredCandidate>> {
        let results: Vec<Result<ScoredCandidate>> = candidates
            .par_iter()
            .map(|candidate| self.score(candidate, viewer, profile, now))
            .collect();

        debug!(
            viewer_id = %viewer.viewer_id,
            profile_id = profile.id(),
            candidate_count = candidates.len(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "Scored candidates"
        );

        results
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Arc::new(SignalRegistry::default()))
    }
}

fn validate_candidate(candidate: &Candidate) -> Result<()> {
    let Some(job) = candidate.job() else {
        return Ok(());
    };

    for (name, value) in [("salary_min", job.salary_min), ("salary_max", job.salary_max)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(MatchingError::candidate_data(
                    candidate.id,
                    format!("{} must be a non-negative number, got {}", name, v),
                ));
            }
        }
    }

    if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
        if min > max {
            return Err(MatchingError::candidate_data(
                candidate.id,
                format!("salary_min {} exceeds salary_max {}", min, max),
            ));
        }
    }

    Ok(())
}
