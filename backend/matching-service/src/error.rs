use ranking_cache::CacheError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, MatchingError>;

#[derive(Debug, Error)]
pub enum MatchingError {
    /// Invalid weight profile or settings. Raised at load time only.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One candidate cannot be scored; the ranker drops it and carries on.
    #[error("Candidate {candidate_id} is malformed: {reason}")]
    CandidateData { candidate_id: Uuid, reason: String },

    #[error("Viewer context unavailable for {viewer_id}: {reason}")]
    ContextUnavailable { viewer_id: Uuid, reason: String },

    /// Always absorbed by the ranking cache and treated as a miss.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Candidate source error: {0}")]
    CandidateSource(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl MatchingError {
    pub fn candidate_data(candidate_id: Uuid, reason: impl Into<String>) -> Self {
        MatchingError::CandidateData {
            candidate_id,
            reason: reason.into(),
        }
    }

    pub fn context_unavailable(viewer_id: Uuid, reason: impl Into<String>) -> Self {
        MatchingError::ContextUnavailable {
            viewer_id,
            reason: reason.into(),
        }
    }
}

impl From<CacheError> for MatchingError {
    fn from(err: CacheError) -> Self {
        MatchingError::CacheUnavailable(err.to_string())
    }
}

impl From<envy::Error> for MatchingError {
    fn from(err: envy::Error) -> Self {
        MatchingError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_maps_to_cache_unavailable() {
        let err: MatchingError = CacheError::InvalidData("truncated".to_string()).into();
        assert!(matches!(err, MatchingError::CacheUnavailable(msg) if msg.contains("truncated")));
    }

    #[test]
    fn test_candidate_data_message() {
        let id = Uuid::nil();
        let err = MatchingError::candidate_data(id, "salary_min > salary_max");
        assert_eq!(
            err.to_string(),
            format!("Candidate {} is malformed: salary_min > salary_max", id)
        );
    }
}
