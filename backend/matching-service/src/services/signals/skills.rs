use super::{SignalCalculator, SignalInput, NEUTRAL_SCORE};
use crate::models::Factor;
use crate::utils::{clamp_unit, normalize_term};
use std::collections::BTreeSet;

/// Weight of a substring (partial) skill hit relative to an exact one
const PARTIAL_MATCH_CREDIT: f64 = 0.5;

fn normalize_skills(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_term(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// (exact + 0.5 × partial) / |required|, clamped to 1.
///
/// A required skill counts as partial when no exact hit exists but it
/// contains, or is contained in, one of the viewer's skills.
/// Empty required set ⇒ neutral 0.5.
pub fn skill_match(required: &[String], viewer_skills: &[String]) -> f64 {
    let required = normalize_skills(required);
    if required.is_empty() {
        return NEUTRAL_SCORE;
    }

    let viewer = normalize_skills(viewer_skills);
    let mut exact = 0usize;
    let mut partial = 0usize;

    for skill in &required {
        if viewer.contains(skill) {
            exact += 1;
        } else if viewer
            .iter()
            .any(|v| v.contains(skill.as_str()) || skill.contains(v.as_str()))
        {
            partial += 1;
        }
    }

    clamp_unit((exact as f64 + PARTIAL_MATCH_CREDIT * partial as f64) / required.len() as f64)
}

pub struct SkillMatch;

impl SignalCalculator for SkillMatch {
    fn factor(&self) -> Factor {
        Factor::SkillMatch
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => skill_match(&job.required_skills, &input.viewer.skills),
            None => NEUTRAL_SCORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_of_three_exact() {
        let score = skill_match(&skills(&["python", "sql", "aws"]), &skills(&["python", "sql"]));
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_ignores_case_and_padding() {
        let score = skill_match(&skills(&[" Python ", "SQL"]), &skills(&["python", "sql  "]));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_partial_matches_earn_half_credit() {
        // "postgresql" contains "sql"; "react" is contained in "react native"
        let score = skill_match(
            &skills(&["postgresql", "react", "go"]),
            &skills(&["sql", "react native"]),
        );
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_required_is_neutral() {
        assert_eq!(skill_match(&[], &skills(&["python"])), NEUTRAL_SCORE);
        assert_eq!(skill_match(&skills(&["", "  "]), &skills(&["python"])), NEUTRAL_SCORE);
    }

    #[test]
    fn test_no_viewer_skills_scores_zero() {
        assert_eq!(skill_match(&skills(&["python"]), &[]), 0.0);
    }

    #[test]
    fn test_duplicates_do_not_inflate() {
        let score = skill_match(&skills(&["python", "Python"]), &skills(&["python"]));
        assert_eq!(score, 1.0);
    }
}
