use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Item being ranked for a viewer: a job posting or a feed post.
///
/// Immutable snapshot for the duration of one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    /// Employer for jobs, poster for feed content
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub engagement: EngagementCounters,
    #[serde(default)]
    pub author: AuthorProfile,
    #[serde(flatten)]
    pub details: CandidateDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateDetails {
    Job(JobAttributes),
    Post(PostAttributes),
}

impl Candidate {
    pub fn job(&self) -> Option<&JobAttributes> {
        match &self.details {
            CandidateDetails::Job(job) => Some(job),
            CandidateDetails::Post(_) => None,
        }
    }

    pub fn post(&self) -> Option<&PostAttributes> {
        match &self.details {
            CandidateDetails::Post(post) => Some(post),
            CandidateDetails::Job(_) => None,
        }
    }

    pub fn kind(&self) -> RankingSurface {
        match self.details {
            CandidateDetails::Job(_) => RankingSurface::Jobs,
            CandidateDetails::Post(_) => RankingSurface::Feed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAttributes {
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Declared seniority, e.g. "senior"
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote_ok: bool,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Employer/community attributes considered by the affinity signal
    #[serde(default)]
    pub affinity: BTreeSet<AffinityAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostAttributes {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
    pub views: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    #[serde(default)]
    pub trust_tier: TrustTier,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub verified: bool,
}

/// Author trust tier, highest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    Elder,
    Mentor,
    Verified,
    Trusted,
    #[default]
    Normal,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Casual,
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinityAttribute {
    CommunityOwned,
    IdentifiedRole,
    ReconciliationPlan,
    CulturalLeave,
    CommunityEndorsed,
    MentoringProgram,
}

/// The acting user: the other half of every scoring calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerContext {
    pub viewer_id: Uuid,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub wants_remote: bool,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub industries: Vec<String>,
    /// Opted in to identity-based matching
    #[serde(default)]
    pub affinity_opt_in: bool,
    #[serde(default)]
    pub affinity_preferences: BTreeSet<AffinityAttribute>,
    /// Empty means no preference
    #[serde(default)]
    pub employment_types: BTreeSet<EmploymentType>,
    #[serde(default)]
    pub connections: BTreeSet<Uuid>,
    #[serde(default)]
    pub following: BTreeSet<Uuid>,
}

impl ViewerContext {
    /// Context with only an identity; every optional signal input is missing.
    pub fn anonymous(viewer_id: Uuid) -> Self {
        Self {
            viewer_id,
            skills: Vec::new(),
            experience_years: None,
            location: None,
            wants_remote: false,
            salary_min: None,
            industries: Vec::new(),
            affinity_opt_in: false,
            affinity_preferences: BTreeSet::new(),
            employment_types: BTreeSet::new(),
            connections: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }
}

/// Where a ranked page is shown; picks the candidate pool and the page TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingSurface {
    Jobs,
    Feed,
}

impl RankingSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingSurface::Jobs => "jobs",
            RankingSurface::Feed => "feed",
        }
    }
}

/// One independent, normalized [0,1] contributor to the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    SkillMatch,
    ExperienceMatch,
    LocationMatch,
    IndustryMatch,
    AffinityFit,
    SalaryMatch,
    RecencyStep,
    RecencyDecay,
    Engagement,
    Relationship,
    Quality,
}

impl Factor {
    pub const ALL: [Factor; 11] = [
        Factor::SkillMatch,
        Factor::ExperienceMatch,
        Factor::LocationMatch,
        Factor::IndustryMatch,
        Factor::AffinityFit,
        Factor::SalaryMatch,
        Factor::RecencyStep,
        Factor::RecencyDecay,
        Factor::Engagement,
        Factor::Relationship,
        Factor::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::SkillMatch => "skill_match",
            Factor::ExperienceMatch => "experience_match",
            Factor::LocationMatch => "location_match",
            Factor::IndustryMatch => "industry_match",
            Factor::AffinityFit => "affinity_fit",
            Factor::SalaryMatch => "salary_match",
            Factor::RecencyStep => "recency_step",
            Factor::RecencyDecay => "recency_decay",
            Factor::Engagement => "engagement",
            Factor::Relationship => "relationship",
            Factor::Quality => "quality",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Factor::ALL
            .iter()
            .copied()
            .find(|factor| factor.as_str() == s)
            .ok_or_else(|| format!("unknown factor '{}'", s))
    }
}

/// Candidate plus its aggregate score and per-factor contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    /// factor -> weight × signal
    pub breakdown: BTreeMap<Factor, f64>,
}

/// One page of ranked output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPage {
    pub profile_id: String,
    pub items: Vec<ScoredCandidate>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// Length of the diversified sequence the page was cut from
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_names_round_trip() {
        for factor in Factor::ALL {
            assert_eq!(factor.as_str().parse::<Factor>().unwrap(), factor);
            let json = serde_json::to_string(&factor).unwrap();
            assert_eq!(json, format!("\"{}\"", factor.as_str()));
        }
        assert!("popularity".parse::<Factor>().is_err());
    }

    #[test]
    fn test_candidate_json_is_tagged() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "author_id": "660e8400-e29b-41d4-a716-446655440001",
            "created_at": "2024-05-01T00:00:00Z",
            "kind": "job",
            "required_skills": ["Rust"],
            "salary_min": 90000.0,
            "unknown_field": "ignored"
        }"#;

        let candidate: Candidate = serde_json::from_str(json).unwrap();
        let job = candidate.job().unwrap();
        assert_eq!(job.required_skills, vec!["Rust".to_string()]);
        assert_eq!(job.salary_min, Some(90000.0));
        assert_eq!(candidate.kind(), RankingSurface::Jobs);
        assert_eq!(candidate.author.trust_tier, TrustTier::Normal);
        assert!(candidate.post().is_none());
    }

    #[test]
    fn test_post_candidate_json() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "author_id": "660e8400-e29b-41d4-a716-446655440001",
            "created_at": "2024-05-01T00:00:00Z",
            "kind": "post",
            "content": "hello",
            "engagement": {"likes": 3, "comments": 1, "shares": 0, "saves": 0, "views": 10},
            "author": {"trust_tier": "elder", "follower_count": 12}
        }"#;

        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.kind(), RankingSurface::Feed);
        assert_eq!(candidate.engagement.likes, 3);
        assert_eq!(candidate.author.trust_tier, TrustTier::Elder);
    }
}
