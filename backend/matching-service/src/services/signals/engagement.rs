use super::{SignalCalculator, SignalInput};
use crate::models::{EngagementCounters, Factor};
use crate::utils::log_normalize;

/// Per-interaction weights and the normalization ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementWeights {
    pub like: f64,
    pub comment: f64,
    pub share: f64,
    pub save: f64,
    pub view: f64,
    /// Weighted total that maps to a score of 1.0
    pub reference_ceiling: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            comment: 2.0,
            share: 3.0,
            save: 4.0,
            view: 0.0,
            reference_ceiling: 1000.0,
        }
    }
}

impl EngagementWeights {
    pub fn weighted_sum(&self, counters: &EngagementCounters) -> f64 {
        counters.likes as f64 * self.like
            + counters.comments as f64 * self.comment
            + counters.shares as f64 * self.share
            + counters.saves as f64 * self.save
            + counters.views as f64 * self.view
    }
}

/// `log10(sum + 1) / log10(ceiling)`, clamped to [0, 1]
pub fn engagement_score(counters: &EngagementCounters, weights: &EngagementWeights) -> f64 {
    log_normalize(weights.weighted_sum(counters), weights.reference_ceiling)
}

pub struct Engagement {
    weights: EngagementWeights,
}

impl Engagement {
    pub fn new(weights: EngagementWeights) -> Self {
        Self { weights }
    }
}

impl SignalCalculator for Engagement {
    fn factor(&self) -> Factor {
        Factor::Engagement
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        engagement_score(&input.candidate.engagement, &self.weights)
    }
}
