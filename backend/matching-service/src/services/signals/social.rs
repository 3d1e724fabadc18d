//! Viewer-author relationship and author trust signals

use super::{SignalCalculator, SignalInput};
use crate::models::{AuthorProfile, Factor, TrustTier, ViewerContext};
use crate::utils::clamp_unit;
use uuid::Uuid;

const SELF_AUTHORED: f64 = 1.0;
const CONNECTED: f64 = 0.85;
const FOLLOWED: f64 = 0.7;
const NO_RELATIONSHIP: f64 = 0.3;

pub fn relationship_strength(viewer: &ViewerContext, author_id: Uuid) -> f64 {
    if viewer.viewer_id == author_id {
        SELF_AUTHORED
    } else if viewer.connections.contains(&author_id) {
        CONNECTED
    } else if viewer.following.contains(&author_id) {
        FOLLOWED
    } else {
        NO_RELATIONSHIP
    }
}

pub fn tier_base(tier: TrustTier) -> f64 {
    match tier {
        TrustTier::Elder => 1.0,
        TrustTier::Mentor => 0.9,
        TrustTier::Verified => 0.85,
        TrustTier::Trusted => 0.75,
        TrustTier::Normal => 0.6,
        TrustTier::New => 0.4,
    }
}

/// Tier base plus a diminishing follower boost `log10(followers + 1) / 10`.
/// A verified flag lifts `normal`/`new` authors to the verified tier.
pub fn quality_score(author: &AuthorProfile) -> f64 {
    let tier = match author.trust_tier {
        TrustTier::Normal | TrustTier::New if author.verified => TrustTier::Verified,
        tier => tier,
    };
    let follower_boost = (author.follower_count as f64 + 1.0).log10() / 10.0;
    clamp_unit(tier_base(tier) + follower_boost)
}

pub struct Relationship;

impl SignalCalculator for Relationship {
    fn factor(&self) -> Factor {
        Factor::Relationship
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        relationship_strength(input.viewer, input.candidate.author_id)
    }
}

pub struct Quality;

impl SignalCalculator for Quality {
    fn factor(&self) -> Factor {
        Factor::Quality
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        quality_score(&input.candidate.author)
    }
}
