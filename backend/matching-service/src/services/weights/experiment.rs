// Profile experiments
//
// Buckets viewers across weight profiles so a weight change can be A/B
// tested with configuration only. Assignment uses consistent hashing of
// experiment name + viewer id, so a viewer always lands in the same variant.

use super::ProfileRegistry;
use crate::error::{MatchingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileVariant {
    pub profile_id: String,
    /// Percentage (0-100)
    pub allocation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileExperiment {
    name: String,
    variants: Vec<ProfileVariant>,
}

impl ProfileExperiment {
    /// Allocations must sum to 100 and every profile must be registered
    pub fn new(
        name: impl Into<String>,
        variants: Vec<ProfileVariant>,
        profiles: &ProfileRegistry,
    ) -> Result<Self> {
        let name = name.into();

        if variants.is_empty() {
            return Err(MatchingError::Configuration(format!(
                "experiment '{}' has no variants",
                name
            )));
        }

        let total: u32 = variants.iter().map(|v| u32::from(v.allocation)).sum();
        if total != 100 {
            return Err(MatchingError::Configuration(format!(
                "experiment '{}' allocations sum to {}, expected 100",
                name, total
            )));
        }

        if let Some(unknown) = variants.iter().find(|v| !profiles.contains(&v.profile_id)) {
            return Err(MatchingError::Configuration(format!(
                "experiment '{}' references unknown profile '{}'",
                name, unknown.profile_id
            )));
        }

        Ok(Self { name, variants })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[ProfileVariant] {
        &self.variants
    }

    /// Bucket = hash("{experiment}:{viewer}") % 100, walked over cumulative
    /// allocations.
    pub fn assign(&self, viewer_id: Uuid) -> &str {
        let mut hasher = DefaultHasher::new();
        format!("{}:{}", self.name, viewer_id).hash(&mut hasher);
        let bucket = (hasher.finish() % 100) as u32;

        let mut cumulative = 0u32;
        for variant in &self.variants {
            cumulative += u32::from(variant.allocation);
            if bucket < cumulative {
                return &variant.profile_id;
            }
        }

        // Allocations sum to 100, so the walk above always returns
        self.variants
            .last()
            .map(|v| v.profile_id.as_str())
            .unwrap_or_default()
    }
}
