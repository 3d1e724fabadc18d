//! Signal Calculators
//!
//! One calculator per factor. Each is a total function of a candidate, the
//! viewer context and an explicit `now`, returning a value in [0, 1].
//! Missing inputs on either side produce the calculator's neutral value
//! instead of an error.
//!
//! Calculators are registered by [`Factor`] in a [`SignalRegistry`]. The
//! standard registry covers every factor; callers may swap the calculator for
//! a factor without touching the scorer.

mod affinity;
mod engagement;
mod experience;
mod industry;
mod location;
mod recency;
mod salary;
mod skills;
mod social;

pub use affinity::{affinity_fit, affinity_increment, AffinityFit, NOT_OPTED_IN_SCORE};
pub use engagement::{engagement_score, Engagement, EngagementWeights};
pub use experience::{experience_match, experience_range, ExperienceMatch};
pub use industry::{industry_match, IndustryMatch};
pub use location::{location_match, LocationMatch, COUNTRY_TOKENS, REGION_TOKENS};
pub use recency::{recency_decay, recency_step, RecencyDecay, RecencyStep};
pub use salary::{salary_band, salary_match, SalaryMatch};
pub use skills::{skill_match, SkillMatch};
pub use social::{quality_score, relationship_strength, tier_base, Quality, Relationship};

use crate::models::{Candidate, Factor, ViewerContext};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Neutral score for missing inputs
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Over-qualification floor for the experience signal.
/// Tuning constant pending product review; override via settings.
pub const OVER_QUALIFICATION_FLOOR: f64 = 0.7;

/// Derived band max when a job only states a minimum salary.
/// Tuning constant pending product review; override via settings.
pub const SALARY_UPPER_FROM_MIN: f64 = 1.3;

/// Derived band min when a job only states a maximum salary.
/// Tuning constant pending product review; override via settings.
pub const SALARY_LOWER_FROM_MAX: f64 = 0.7;

/// Default half-life for feed content decay
pub const DEFAULT_RECENCY_HALF_LIFE_HOURS: f64 = 6.0;

/// Everything a calculator may look at
#[derive(Debug, Clone, Copy)]
pub struct SignalInput<'a> {
    pub candidate: &'a Candidate,
    pub viewer: &'a ViewerContext,
    pub now: DateTime<Utc>,
}

pub trait SignalCalculator: Send + Sync {
    fn factor(&self) -> Factor;

    /// Score in [0, 1]
    fn compute(&self, input: &SignalInput<'_>) -> f64;
}

/// Tunable inputs of the standard calculators
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSettings {
    pub recency_half_life_hours: f64,
    pub engagement: EngagementWeights,
    pub salary_upper_from_min: f64,
    pub salary_lower_from_max: f64,
    pub over_qualification_floor: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            recency_half_life_hours: DEFAULT_RECENCY_HALF_LIFE_HOURS,
            engagement: EngagementWeights::default(),
            salary_upper_from_min: SALARY_UPPER_FROM_MIN,
            salary_lower_from_max: SALARY_LOWER_FROM_MAX,
            over_qualification_floor: OVER_QUALIFICATION_FLOOR,
        }
    }
}

/// Factor -> calculator lookup shared read-only by every scoring call
#[derive(Clone)]
pub struct SignalRegistry {
    calculators: BTreeMap<Factor, Arc<dyn SignalCalculator>>,
}

impl SignalRegistry {
    /// Registry with no calculators; build up with [`with_calculator`](Self::with_calculator)
    pub fn empty() -> Self {
        Self {
            calculators: BTreeMap::new(),
        }
    }

    /// Registry with a calculator for every factor
    pub fn standard(settings: &SignalSettings) -> Self {
        let calculators: Vec<Arc<dyn SignalCalculator>> = vec![
            Arc::new(SkillMatch),
            Arc::new(ExperienceMatch::new(settings.over_qualification_floor)),
            Arc::new(LocationMatch),
            Arc::new(IndustryMatch),
            Arc::new(AffinityFit),
            Arc::new(SalaryMatch::new(
                settings.salary_upper_from_min,
                settings.salary_lower_from_max,
            )),
            Arc::new(RecencyStep),
            Arc::new(RecencyDecay::new(settings.recency_half_life_hours)),
            Arc::new(Engagement::new(settings.engagement.clone())),
            Arc::new(Relationship),
            Arc::new(Quality),
        ];

        Self {
            calculators: calculators
                .into_iter()
                .map(|calculator| (calculator.factor(), calculator))
                .collect(),
        }
    }

    /// Replace (or add) the calculator for its factor
    pub fn with_calculator(mut self, calculator: Arc<dyn SignalCalculator>) -> Self {
        self.calculators.insert(calculator.factor(), calculator);
        self
    }

    pub fn get(&self, factor: Factor) -> Option<&Arc<dyn SignalCalculator>> {
        self.calculators.get(&factor)
    }

    pub fn contains(&self, factor: Factor) -> bool {
        self.calculators.contains_key(&factor)
    }

    pub fn factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.calculators.keys().copied()
    }
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::standard(&SignalSettings::default())
    }
}

impl std::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("factors", &self.calculators.keys().collect::<Vec<_>>())
            .finish()
    }
}
