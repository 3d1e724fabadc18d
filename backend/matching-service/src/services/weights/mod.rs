//! Weight Profiles
//!
//! A profile is a named, versioned factor -> weight mapping. Weights are
//! non-negative and sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`]. Invalid
//! profiles are rejected at construction, never renormalized.
//!
//! New experiments register new profiles instead of mutating existing ones.

mod experiment;
mod registry;

pub use experiment::{ProfileExperiment, ProfileVariant};
pub use registry::{ProfileDefinition, ProfileRegistry, FEED_PROFILE, JOB_MATCH_PROFILE, PRE_APPLY_PROFILE};

use crate::error::{MatchingError, Result};
use crate::models::Factor;
use serde::Serialize;
use std::collections::BTreeMap;

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProfile {
    id: String,
    version: u32,
    weights: BTreeMap<Factor, f64>,
}

impl WeightProfile {
    /// Build and validate a profile from factor names.
    pub fn new<I, S>(id: impl Into<String>, version: u32, weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let id = id.into();
        let mut parsed = Vec::new();
        for (name, weight) in weights {
            let factor = name.as_ref().parse::<Factor>().map_err(|e| {
                MatchingError::Configuration(format!("profile '{}': {}", id, e))
            })?;
            parsed.push((factor, weight));
        }
        Self::from_factors(id, version, parsed)
    }

    /// Build and validate a profile from typed factors.
    pub fn from_factors<I>(id: impl Into<String>, version: u32, weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Factor, f64)>,
    {
        let id = id.into();
        let invalid = |reason: String| MatchingError::Configuration(format!("profile '{}': {}", id, reason));

        if id.trim().is_empty() {
            return Err(MatchingError::Configuration(
                "profile id must not be empty".to_string(),
            ));
        }

        let mut map = BTreeMap::new();
        for (factor, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(format!(
                    "weight for {} must be a non-negative number, got {}",
                    factor, weight
                )));
            }
            if map.insert(factor, weight).is_some() {
                return Err(invalid(format!("factor {} listed twice", factor)));
            }
        }

        if map.is_empty() {
            return Err(invalid("no factors".to_string()));
        }

        let sum: f64 = map.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!("weights sum to {}, expected 1.0", sum)));
        }

        Ok(Self {
            id,
            version,
            weights: map,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn weight(&self, factor: Factor) -> f64 {
        self.weights.get(&factor).copied().unwrap_or(0.0)
    }

    /// Factors with their weights, in factor order
    pub fn weights(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.weights.iter().map(|(f, w)| (*f, *w))
    }

    pub fn factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.weights.keys().copied()
    }

    /// Sum of weights; within tolerance of 1.0 for every constructed profile
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile() {
        let profile =
            WeightProfile::new("test", 1, [("skill_match", 0.5), ("salary_match", 0.5)]).unwrap();
        assert_eq!(profile.id(), "test");
        assert_eq!(profile.version(), 1);
        assert_eq!(profile.weight(Factor::SkillMatch), 0.5);
        assert_eq!(profile.weight(Factor::Quality), 0.0);
        assert!((profile.total() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_sum_within_tolerance_is_accepted() {
        let profile = WeightProfile::new(
            "thirds",
            1,
            [
                ("engagement", 0.333_333_3),
                ("quality", 0.333_333_3),
                ("relationship", 0.333_333_4),
            ],
        );
        assert!(profile.is_ok());
    }

    #[test]
    fn test_sum_off_by_more_than_tolerance_fails() {
        let err = WeightProfile::new("bad", 1, [("skill_match", 0.5), ("salary_match", 0.49)])
            .unwrap_err();
        assert!(matches!(err, MatchingError::Configuration(msg) if msg.contains("sum")));
    }

    #[test]
    fn test_unknown_factor_fails() {
        let err = WeightProfile::new("bad", 1, [("popularity", 1.0)]).unwrap_err();
        assert!(matches!(err, MatchingError::Configuration(msg) if msg.contains("popularity")));
    }

    #[test]
    fn test_negative_weight_fails() {
        let err = WeightProfile::new("bad", 1, [("skill_match", 1.5), ("salary_match", -0.5)])
            .unwrap_err();
        assert!(matches!(err, MatchingError::Configuration(_)));
    }

    #[test]
    fn test_nan_weight_fails() {
        assert!(WeightProfile::new("bad", 1, [("skill_match", f64::NAN)]).is_err());
    }

    #[test]
    fn test_duplicate_factor_fails() {
        assert!(WeightProfile::new("bad", 1, [("skill_match", 0.5), ("skill_match", 0.5)]).is_err());
    }

    #[test]
    fn test_empty_profile_fails() {
        let none: [(&str, f64); 0] = [];
        assert!(WeightProfile::new("empty", 1, none).is_err());
        assert!(WeightProfile::new("  ", 1, [("quality", 1.0)]).is_err());
    }

    #[test]
    fn test_zero_weight_factor_is_allowed() {
        let profile =
            WeightProfile::new("zero", 1, [("quality", 1.0), ("engagement", 0.0)]).unwrap();
        assert_eq!(profile.factors().count(), 2);
    }
}
