//! Candidate plausibility filtering.
//!
//! Extraction patterns capture whatever sits after a label, which on real
//! documents is frequently boilerplate, phone numbers, or layout debris. A
//! candidate survives when it has a sane length, matches none of the ordered
//! noise patterns, and is mostly alphabetic. Callers treat rejection as "try
//! the next candidate", never as a hard failure.

use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted candidate length range, inclusive.
const MIN_LEN: usize = 3;
const MAX_LEN: usize = 60;

/// Minimum ratio of alphabetic characters to total length.
const MIN_ALPHA_RATIO: f64 = 0.6;

fn noise_patterns() -> &'static [&'static Regex] {
    static PATTERNS: Lazy<Vec<&'static Regex>> = Lazy::new(|| {
        vec![
            regex!(r"(?i)^section\s*\d"),
            regex!(r"(?i)safety\s+data\s+sheet"),
            regex!(r"(?i)material\s+safety"),
            regex!(r"(?i)^according\s+to\b"),
            regex!(r"(?i)^in\s+accordance\b"),
            regex!(r"(?i)^(?:page|version|revision|date|print(?:ed)?\s+date)\b"),
            regex!(r"(?i)^(?:n/?a|none|not\s+applicable|not\s+available|not\s+determined|unknown|no\s+data(?:\s+available)?)\.?$"),
            regex!(r"^[+(]?[\d\s().\-/]{7,}$"),
            regex!(r"(?i)^#?[0-9a-f]{6,8}$"),
            regex!(r"^[^A-Za-z0-9]+$"),
            regex!(r"(?i)^(?:tel|fax|phone|emergency)\b"),
            regex!(r"(?i)^(?:www\.|https?://)"),
            regex!(r"(?i)^(?:see\s+section|refer\s+to)\b"),
            regex!(r"(?i)^for\s+(?:industrial|professional|laboratory)\s+use"),
        ]
    });
    &PATTERNS
}

/// Whether `candidate` is a plausible extracted name/value.
pub(crate) fn plausible_name(candidate: &str) -> bool {
    let candidate = candidate.trim();
    let len = candidate.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return false;
    }

    for re in noise_patterns() {
        if re.is_match(candidate) {
            return false;
        }
    }

    alpha_ratio(candidate) >= MIN_ALPHA_RATIO
}

fn alpha_ratio(s: &str) -> f64 {
    let total = s.chars().count();
    if total == 0 {
        return 0.0;
    }
    let alpha = s.chars().filter(|c| c.is_alphabetic()).count();
    alpha as f64 / total as f64
}
