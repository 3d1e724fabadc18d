use super::{SignalCalculator, SignalInput, NEUTRAL_SCORE};
use crate::models::Factor;
use crate::utils::normalize_term;

/// Groups of industry terms treated as related
const RELATED_INDUSTRIES: &[&[&str]] = &[
    &["technology", "tech", "software", "it", "information technology", "engineering"],
    &["healthcare", "health", "medical", "nursing", "aged care", "disability"],
    &["education", "teaching", "training", "early childhood"],
    &["community services", "social work", "not for profit", "youth work"],
    &["government", "public sector", "policy"],
    &["mining", "resources", "energy", "environment", "land management"],
    &["construction", "trades", "building", "infrastructure"],
    &["hospitality", "tourism", "retail", "events"],
    &["arts", "culture", "media", "design"],
];

const EXACT_MATCH: f64 = 1.0;
const RELATED_MATCH: f64 = 0.7;
const NO_MATCH: f64 = 0.3;

fn group_of(term: &str) -> Option<usize> {
    RELATED_INDUSTRIES
        .iter()
        .position(|group| group.contains(&term))
}

/// Exact ⇒ 1, same related group ⇒ 0.7, else 0.3; missing data ⇒ 0.5.
pub fn industry_match(job_industry: Option<&str>, preferences: &[String]) -> f64 {
    let industry = match job_industry.map(normalize_term) {
        Some(i) if !i.is_empty() => i,
        _ => return NEUTRAL_SCORE,
    };

    let preferences: Vec<String> = preferences
        .iter()
        .map(|p| normalize_term(p))
        .filter(|p| !p.is_empty())
        .collect();
    if preferences.is_empty() {
        return NEUTRAL_SCORE;
    }

    if preferences.iter().any(|p| *p == industry) {
        return EXACT_MATCH;
    }

    match group_of(&industry) {
        Some(group) if preferences.iter().any(|p| group_of(p) == Some(group)) => RELATED_MATCH,
        _ => NO_MATCH,
    }
}

pub struct IndustryMatch;

impl SignalCalculator for IndustryMatch {
    fn factor(&self) -> Factor {
        Factor::IndustryMatch
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => industry_match(job.industry.as_deref(), &input.viewer.industries),
            None => NEUTRAL_SCORE,
        }
    }
}
