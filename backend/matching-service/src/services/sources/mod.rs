//! External collaborators
//!
//! Candidate records and viewer profiles live in other services. The engine
//! only sees them through these traits.

use crate::error::Result;
use crate::models::{Candidate, RankingSurface, ViewerContext};
use async_trait::async_trait;
use uuid::Uuid;

/// Supplies the finite candidate list for one ranking request.
///
/// Failures should be reported as `MatchingError::CandidateSource`.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(
        &self,
        viewer_id: Uuid,
        surface: RankingSurface,
    ) -> Result<Vec<Candidate>>;
}

/// Loads a viewer's profile, skills, preferences and social graph
#[async_trait]
pub trait ViewerContextSource: Send + Sync {
    async fn load_context(&self, viewer_id: Uuid) -> Result<ViewerContext>;
}
