use super::WeightProfile;
use crate::error::{MatchingError, Result};
use crate::models::Factor;
use crate::services::signals::SignalRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const JOB_MATCH_PROFILE: &str = "job_match_v1";
pub const FEED_PROFILE: &str = "feed_v1";
pub const PRE_APPLY_PROFILE: &str = "pre_apply_v1";

/// On-disk profile record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub weights: BTreeMap<String, f64>,
}

fn default_version() -> u32 {
    1
}

impl TryFrom<ProfileDefinition> for WeightProfile {
    type Error = MatchingError;

    fn try_from(def: ProfileDefinition) -> Result<Self> {
        WeightProfile::new(def.id, def.version, def.weights)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<WeightProfile>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with job_match_v1, feed_v1 and pre_apply_v1
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        registry.register(WeightProfile::from_factors(
            JOB_MATCH_PROFILE,
            1,
            [
                (Factor::SkillMatch, 0.35),
                (Factor::ExperienceMatch, 0.15),
                (Factor::LocationMatch, 0.15),
                (Factor::IndustryMatch, 0.10),
                (Factor::AffinityFit, 0.10),
                (Factor::SalaryMatch, 0.10),
                (Factor::RecencyStep, 0.05),
            ],
        )?)?;

        registry.register(WeightProfile::from_factors(
            FEED_PROFILE,
            1,
            [
                (Factor::RecencyDecay, 0.30),
                (Factor::Engagement, 0.25),
                (Factor::Relationship, 0.25),
                (Factor::Quality, 0.20),
            ],
        )?)?;

        registry.register(WeightProfile::from_factors(
            PRE_APPLY_PROFILE,
            1,
            [
                (Factor::SkillMatch, 0.40),
                (Factor::ExperienceMatch, 0.20),
                (Factor::LocationMatch, 0.15),
                (Factor::SalaryMatch, 0.15),
                (Factor::AffinityFit, 0.10),
            ],
        )?)?;

        Ok(registry)
    }

    /// Parse a JSON array of profile definitions
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<ProfileDefinition> = serde_json::from_str(json)
            .map_err(|e| MatchingError::Configuration(format!("invalid profiles JSON: {}", e)))?;

        let mut registry = Self::new();
        for definition in definitions {
            registry.register(WeightProfile::try_from(definition)?)?;
        }
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MatchingError::Configuration(format!(
                "failed to read profiles from {}: {}",
                path.display(),
                e
            ))
        })?;
        let registry = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            profiles = registry.len(),
            "Loaded weight profiles"
        );
        Ok(registry)
    }

    pub fn register(&mut self, profile: WeightProfile) -> Result<()> {
        if self.profiles.contains_key(profile.id()) {
            return Err(MatchingError::Configuration(format!(
                "duplicate profile id '{}'",
                profile.id()
            )));
        }
        self.profiles
            .insert(profile.id().to_string(), Arc::new(profile));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<WeightProfile>> {
        self.profiles.get(id).cloned()
    }

    /// Like [`get`](Self::get), for ids supplied by a caller
    pub fn require(&self, id: &str) -> Result<Arc<WeightProfile>> {
        self.get(id)
            .ok_or_else(|| MatchingError::InvalidRequest(format!("unknown weight profile '{}'", id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Profile ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Every factor referenced by a profile must have a calculator
    pub fn validate_against(&self, signals: &SignalRegistry) -> Result<()> {
        for id in self.ids() {
            if let Some(profile) = self.profiles.get(id) {
                if let Some(missing) = profile.factors().find(|f| !signals.contains(*f)) {
                    return Err(MatchingError::Configuration(format!(
                        "profile '{}' uses factor {} with no registered calculator",
                        id, missing
                    )));
                }
            }
        }
        Ok(())
    }
}
