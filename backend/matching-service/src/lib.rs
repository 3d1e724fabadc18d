pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{MatchingError, Result};
pub use models::{Candidate, RankedPage, ScoredCandidate, ViewerContext};
pub use services::{
    MatchingService, PreApplyMatcher, Ranker, RankingCache, Scorer, SignalRegistry, WeightProfile,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{
        AuthorProfile, Candidate, CandidateDetails, EngagementCounters, JobAttributes,
        PostAttributes, ViewerContext,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// Job with no attributes set
    pub fn job(author_id: Uuid, created_at: DateTime<Utc>) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            author_id,
            created_at,
            engagement: EngagementCounters::default(),
            author: AuthorProfile::default(),
            details: CandidateDetails::Job(JobAttributes::default()),
        }
    }

    /// Post created at [`fixed_now`]
    pub fn post(author_id: Uuid) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            author_id,
            created_at: fixed_now(),
            engagement: EngagementCounters::default(),
            author: AuthorProfile::default(),
            details: CandidateDetails::Post(PostAttributes::default()),
        }
    }

    pub fn viewer() -> ViewerContext {
        ViewerContext::anonymous(Uuid::new_v4())
    }
}
