use super::{SignalCalculator, SignalInput, NEUTRAL_SCORE};
use crate::models::Factor;
use crate::utils::clamp_unit;

/// Penalty per missing year below the range minimum
const UNDER_QUALIFICATION_PENALTY: f64 = 0.2;
/// Penalty per extra year above the range maximum
const OVER_QUALIFICATION_PENALTY: f64 = 0.05;

/// Year range for a declared job level. Unknown or missing level ⇒ [0, 100].
pub fn experience_range(level: Option<&str>) -> (f64, f64) {
    let level = level.map(|l| l.trim().to_lowercase());
    match level.as_deref() {
        Some("entry") => (0.0, 2.0),
        Some("junior") => (0.0, 3.0),
        Some("mid") => (2.0, 5.0),
        Some("senior") => (5.0, 10.0),
        Some("lead") => (7.0, 15.0),
        Some("principal") => (10.0, 20.0),
        Some("executive") => (10.0, 30.0),
        _ => (0.0, 100.0),
    }
}

/// 1 inside the level range; linear penalty below; mild penalty above with
/// `over_qualification_floor` as the lowest possible score.
pub fn experience_match(level: Option<&str>, years: Option<f64>, over_qualification_floor: f64) -> f64 {
    let years = match years {
        Some(y) if y.is_finite() => y.max(0.0),
        _ => return NEUTRAL_SCORE,
    };

    let (min, max) = experience_range(level);
    let score = if years < min {
        (1.0 - UNDER_QUALIFICATION_PENALTY * (min - years)).max(0.0)
    } else if years > max {
        (1.0 - OVER_QUALIFICATION_PENALTY * (years - max)).max(over_qualification_floor)
    } else {
        1.0
    };

    clamp_unit(score)
}

pub struct ExperienceMatch {
    over_qualification_floor: f64,
}

impl ExperienceMatch {
    pub fn new(over_qualification_floor: f64) -> Self {
        Self {
            over_qualification_floor,
        }
    }
}

impl SignalCalculator for ExperienceMatch {
    fn factor(&self) -> Factor {
        Factor::ExperienceMatch
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => experience_match(
                job.experience_level.as_deref(),
                input.viewer.experience_years,
                self.over_qualification_floor,
            ),
            None => NEUTRAL_SCORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::OVER_QUALIFICATION_FLOOR;

    fn score(level: &str, years: f64) -> f64 {
        experience_match(Some(level), Some(years), OVER_QUALIFICATION_FLOOR)
    }

    #[test]
    fn test_level_table() {
        assert_eq!(experience_range(Some("entry")), (0.0, 2.0));
        assert_eq!(experience_range(Some("Senior ")), (5.0, 10.0));
        assert_eq!(experience_range(Some("executive")), (10.0, 30.0));
        assert_eq!(experience_range(Some("wizard")), (0.0, 100.0));
        assert_eq!(experience_range(None), (0.0, 100.0));
    }

    #[test]
    fn test_inside_range() {
        assert_eq!(score("mid", 2.0), 1.0);
        assert_eq!(score("mid", 5.0), 1.0);
        assert_eq!(score("senior", 7.5), 1.0);
    }

    #[test]
    fn test_under_qualified() {
        // senior min = 5, 3 years short by 2 → 1 - 0.4
        assert!((score("senior", 3.0) - 0.6).abs() < 1e-9);
        assert_eq!(score("principal", 0.0), 0.0);
    }

    #[test]
    fn test_over_qualified_floor() {
        // junior max = 3, 5 years over by 2 → 0.9
        assert!((score("junior", 5.0) - 0.9).abs() < 1e-9);
        assert_eq!(score("junior", 40.0), OVER_QUALIFICATION_FLOOR);
    }

    #[test]
    fn test_floor_is_overridable() {
        assert_eq!(experience_match(Some("entry"), Some(50.0), 0.5), 0.5);
    }

    #[test]
    fn test_missing_years_is_neutral() {
        assert_eq!(
            experience_match(Some("senior"), None, OVER_QUALIFICATION_FLOOR),
            NEUTRAL_SCORE
        );
        assert_eq!(
            experience_match(Some("senior"), Some(f64::NAN), OVER_QUALIFICATION_FLOOR),
            NEUTRAL_SCORE
        );
    }
}
