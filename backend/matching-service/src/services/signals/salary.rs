use super::{SignalCalculator, SignalInput, NEUTRAL_SCORE};
use crate::models::Factor;
use crate::utils::clamp_unit;

const BELOW_BAND_MIN: f64 = 1.0;
const WITHIN_BAND: f64 = 0.8;
const GAP_PENALTY: f64 = 2.0;

/// Resolve a [min, max] band from whichever bounds a job states.
///
/// Only a minimum ⇒ max = min × `upper_from_min`;
/// only a maximum ⇒ min = max × `lower_from_max`.
pub fn salary_band(
    min: Option<f64>,
    max: Option<f64>,
    upper_from_min: f64,
    lower_from_max: f64,
) -> Option<(f64, f64)> {
    match (min, max) {
        (Some(lo), Some(hi)) => Some((lo, hi)),
        (Some(lo), None) => Some((lo, lo * upper_from_min)),
        (None, Some(hi)) => Some((hi * lower_from_max, hi)),
        (None, None) => None,
    }
}

/// Viewer floor at or below band min ⇒ 1; within band ⇒ 0.8;
/// above band ⇒ `max(0, 1 − 2 × gap / viewer_min)`.
pub fn salary_match(band: Option<(f64, f64)>, viewer_min: Option<f64>) -> f64 {
    let ((band_min, band_max), viewer_min) = match (band, viewer_min) {
        (Some(band), Some(v)) if v.is_finite() && v > 0.0 => (band, v),
        _ => return NEUTRAL_SCORE,
    };

    if viewer_min <= band_min {
        BELOW_BAND_MIN
    } else if viewer_min <= band_max {
        WITHIN_BAND
    } else {
        let gap_ratio = (viewer_min - band_max) / viewer_min;
        clamp_unit(1.0 - GAP_PENALTY * gap_ratio)
    }
}

pub struct SalaryMatch {
    upper_from_min: f64,
    lower_from_max: f64,
}

impl SalaryMatch {
    pub fn new(upper_from_min: f64, lower_from_max: f64) -> Self {
        Self {
            upper_from_min,
            lower_from_max,
        }
    }
}

impl SignalCalculator for SalaryMatch {
    fn factor(&self) -> Factor {
        Factor::SalaryMatch
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => salary_match(
                salary_band(
                    job.salary_min,
                    job.salary_max,
                    self.upper_from_min,
                    self.lower_from_max,
                ),
                input.viewer.salary_min,
            ),
            None => NEUTRAL_SCORE,
        }
    }
}
