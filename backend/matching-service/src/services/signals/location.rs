use super::{SignalCalculator, SignalInput, NEUTRAL_SCORE};
use crate::models::Factor;

/// Region tokens in scan order. Multi-word entries match as whole phrases.
pub const REGION_TOKENS: &[&str] = &[
    "new south wales",
    "nsw",
    "victoria",
    "vic",
    "queensland",
    "qld",
    "western australia",
    "wa",
    "south australia",
    "sa",
    "tasmania",
    "tas",
    "northern territory",
    "nt",
    "australian capital territory",
    "act",
    "ontario",
    "british columbia",
    "alberta",
    "quebec",
    "manitoba",
    "saskatchewan",
    "nova scotia",
    "california",
    "new york",
    "texas",
    "washington",
    "auckland",
    "wellington",
];

/// Country tokens in scan order
pub const COUNTRY_TOKENS: &[&str] = &[
    "australia",
    "canada",
    "new zealand",
    "united states",
    "usa",
    "united kingdom",
    "uk",
];

const REMOTE_MATCH: f64 = 1.0;
const EXACT_MATCH: f64 = 1.0;
const REGION_MATCH: f64 = 0.8;
const COUNTRY_MATCH: f64 = 0.5;
const REMOTE_FALLBACK: f64 = 0.7;
const NO_MATCH: f64 = 0.3;

/// Lower-case, non-alphanumerics to spaces, whitespace collapsed, padded
/// with one space on each side so ` token ` lookups match whole words.
fn padded(location: &str) -> String {
    let cleaned: String = location
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn mentions(padded_location: &str, token: &str) -> bool {
    padded_location.contains(&format!(" {} ", token))
}

fn shared_token(job: &str, viewer: &str, tokens: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| mentions(job, token) && mentions(viewer, token))
}

/// Fixed-order location fit:
/// remote both ways → exact → region → country → remote fallback → none.
pub fn location_match(
    job_location: Option<&str>,
    remote_ok: bool,
    viewer_location: Option<&str>,
    wants_remote: bool,
) -> f64 {
    if remote_ok && wants_remote {
        return REMOTE_MATCH;
    }

    let (job, viewer) = match (job_location, viewer_location) {
        (Some(j), Some(v)) if !j.trim().is_empty() && !v.trim().is_empty() => (padded(j), padded(v)),
        _ => return NEUTRAL_SCORE,
    };

    if job == viewer {
        EXACT_MATCH
    } else if shared_token(&job, &viewer, REGION_TOKENS) {
        REGION_MATCH
    } else if shared_token(&job, &viewer, COUNTRY_TOKENS) {
        COUNTRY_MATCH
    } else if remote_ok {
        REMOTE_FALLBACK
    } else {
        NO_MATCH
    }
}

pub struct LocationMatch;

impl SignalCalculator for LocationMatch {
    fn factor(&self) -> Factor {
        Factor::LocationMatch
    }

    fn compute(&self, input: &SignalInput<'_>) -> f64 {
        match input.candidate.job() {
            Some(job) => location_match(
                job.location.as_deref(),
                job.remote_ok,
                input.viewer.location.as_deref(),
                input.viewer.wants_remote,
            ),
            None => NEUTRAL_SCORE,
        }
    }
}
