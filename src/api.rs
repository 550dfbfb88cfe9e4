//! Public entry points.
//!
//! Every function here is pure and synchronous: callers own all I/O. The
//! `*_with` variants accept explicit reference tables for callers that load
//! their own rule data; the short forms use the process-wide embedded tables.

use serde_json::Value;

use crate::classify::{self, Correction, WasteProfile};
use crate::compat::{self, CompatibilityVerdict};
use crate::extract::extract_profile;
use crate::profile::MaterialProfile;
use crate::reference::ReferenceData;

/// Extract a structured [`MaterialProfile`] from raw document text.
///
/// Never fails: a malformed or empty document yields an almost-empty profile
/// whose validation report says what is missing.
pub fn extract(text: &str) -> MaterialProfile {
    extract_profile(text)
}

/// Extract and serialize in the exact field shape downstream consumers
/// expect (`productName`, `flashPoint.celsius`, ...).
pub fn extract_to_json(text: &str) -> Value {
    serde_json::to_value(extract_profile(text)).unwrap_or(Value::Null)
}

/// Extract, wrap as a waste profile and run the correction pass against the
/// embedded reference tables. Returns the corrected profile and the ordered
/// correction log.
pub fn classify(text: &str) -> (WasteProfile, Vec<Correction>) {
    classify_with(text, ReferenceData::shared())
}

pub fn classify_with(text: &str, refs: &ReferenceData) -> (WasteProfile, Vec<Correction>) {
    let waste = WasteProfile::from_material(extract_profile(text));
    classify::correct(&waste, refs)
}

/// Decide pairwise compatibility of two classified materials.
pub fn check(a: &WasteProfile, b: &WasteProfile) -> CompatibilityVerdict {
    compat::check(a, b, ReferenceData::shared())
}

pub fn check_with(a: &WasteProfile, b: &WasteProfile, refs: &ReferenceData) -> CompatibilityVerdict {
    compat::check(a, b, refs)
}

/// Check a candidate against an already-accepted group, in insertion order,
/// returning the first conflict.
pub fn check_group(candidate: &WasteProfile, placed: &[WasteProfile]) -> CompatibilityVerdict {
    compat::check_group(candidate, placed, ReferenceData::shared())
}

pub fn check_group_with(
    candidate: &WasteProfile,
    placed: &[WasteProfile],
    refs: &ReferenceData,
) -> CompatibilityVerdict {
    compat::check_group(candidate, placed, refs)
}
