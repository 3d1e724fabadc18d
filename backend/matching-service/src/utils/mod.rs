// Utility functions for matching-service

/// Clamp a score to the [0, 1] range. NaN maps to 0.
pub fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Half-life decay: 1.0 at age 0, 0.5 after one half-life
pub fn exponential_decay(age_hours: f64, half_life_hours: f64) -> f64 {
    0.5_f64.powf(age_hours.max(0.0) / half_life_hours)
}

/// Logarithmic normalization of a non-negative magnitude against a ceiling.
///
/// `log10(value + 1) / log10(ceiling)`, clamped to [0, 1].
pub fn log_normalize(value: f64, ceiling: f64) -> f64 {
    if ceiling <= 1.0 {
        return 0.0;
    }
    clamp_unit((value.max(0.0) + 1.0).log10() / ceiling.log10())
}

/// Lower-case, trim, collapse whitespace
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
