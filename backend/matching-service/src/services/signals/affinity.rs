use super::{SignalCalculator, SignalInput};
use crate::models::{AffinityAttribute, Factor};
use crate::utils::clamp_unit;
use std::collections::BTreeSet;

/// Score for viewers who have not opted in. Never penalizes them.
pub const NOT_OPTED_IN_SCORE: f64 = 0.7;

const OPTED_IN_BASE: f64 = 0.5;

/// Fixed increment per matching attribute (each ≤ 0.2)
pub fn affinity_increment(attribute: AffinityAttribute) -> f64 {
    match attribute {
        AffinityAttribute::CommunityOwned => 0.2,
        AffinityAttribute::IdentifiedRole => 0.2,
        AffinityAttribute::ReconciliationPlan => 0.15,
        AffinityAttribute::CulturalLeave => 0.1,
        AffinityAttribute::CommunityEndorsed => 0.1,
        AffinityAttribute::MentoringProgram => 0.1,
    }
}

pub fn affinity_fit(
    opted_in: bool,
    preferences: &BTreeSet<AffinityAttribute>,
    employer: &BTreeSet<AffinityAttribute>,
) -> f64 {
    if !opted_in {
        return NOT_OPTED_IN_SCORE;
    }

    let bonus: f64 = preferences
        .intersection(employer)
        .map(|attribute| affinity_increment(*attribute))
        .sum();

    clamp_unit(OPTED_IN_BASE + bonus)
}

pub struct AffinityFit;

impl SignalCalculator for AffinityFit {
    fn factor(&self) -> Factor {
        Factor::AffinityFit
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => affinity_fit(
                input.viewer.affinity_opt_in,
                &input.viewer.affinity_preferences,
                &job.affinity,
            ),
            None => NOT_OPTED_IN_SCORE,
        }
    }
}
