use super::{SignalCalculator, SignalInput};
use crate::models::Factor;
use crate::utils::{clamp_unit, exponential_decay};
use chrono::{DateTime, Utc};

/// (max age in days, score), checked in order
const RECENCY_STEPS: &[(f64, f64)] = &[
    (1.0, 1.0),
    (7.0, 0.9),
    (14.0, 0.7),
    (30.0, 0.5),
    (60.0, 0.3),
];
const STALE_SCORE: f64 = 0.1;

fn age_seconds(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - created_at).num_milliseconds() as f64 / 1000.0).max(0.0)
}

/// Step function over age in days, used for job postings
pub fn recency_step(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = age_seconds(created_at, now) / 86_400.0;
    RECENCY_STEPS
        .iter()
        .find(|(max_days, _)| age_days <= *max_days)
        .map(|(_, score)| *score)
        .unwrap_or(STALE_SCORE)
}

/// Continuous half-life decay, used for feed content
pub fn recency_decay(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_hours: f64) -> f64 {
    let age_hours = age_seconds(created_at, now) / 3600.0;
    clamp_unit(exponential_decay(age_hours, half_life_hours))
}

pub struct RecencyStep;

impl SignalCalculator for RecencyStep {
    fn factor(&self) -> Factor {
        Factor::RecencyStep
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        recency_step(input.candidate.created_at, input.now)
    }
}

pub struct RecencyDecay {
    half_life_hours: f64,
}

impl RecencyDecay {
    pub fn new(half_life_hours: f64) -> Self {
        Self { half_life_hours }
    }
}

impl SignalCalculator for RecencyDecay {
    fn factor(&self) -> Factor {
        Factor::RecencyDecay
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        recency_decay(input.candidate.created_at, input.now, self.half_life_hours)
    }
}
