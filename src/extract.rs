//! Field and composition extraction.
//!
//! This module is the entry point for turning a segmented document into a
//! [`MaterialProfile`]. Extraction is a pipeline of ordered, deterministic
//! cascades, with no statistical inference anywhere:
//!
//! ```text
//! raw text ── segment::segment ───────────────┐
//!                                             │
//! section lines ── fields::first_capture ─────┼─ identification, properties,
//!   (pattern order = priority,                │  hazard and transport fields
//!    line order = secondary)                  │
//!                                             │
//! composition section ── composition::extract ┼─ constituents, three fallback
//!   (CAS anchor → name lookup → doc sweep)    │  tiers of decreasing trust
//!                                             │
//!                                             v
//!                              MaterialProfile + ValidationReport
//! ```
//!
//! Extraction never fails: absent data stays `None` and the validation
//! report flags what is missing. Candidate values pass through
//! `noise::plausible_name` before they are accepted; a rejection moves the
//! cascade to the next pattern/line instead of aborting.

#[path = "extract/composition.rs"]
pub(crate) mod composition;
#[path = "extract/fields.rs"]
pub(crate) mod fields;
#[path = "extract/noise.rs"]
pub(crate) mod noise;

#[cfg(test)]
#[path = "extract/tests.rs"]
mod tests;

use crate::profile::{MaterialProfile, PhysicalState, SectionMap, ValidationReport};
use crate::segment;

use fields::StateReading;

/// Extract a structured profile from raw safety-document text.
pub(crate) fn extract_profile(text: &str) -> MaterialProfile {
    let sections = segment::segment(text);
    let doc_lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    let mut profile = MaterialProfile::empty(sections);

    // Identification (section 1).
    {
        let lines = section_or_doc(&profile.sections, 1, &doc_lines);
        profile.product_name = fields::first_plausible(&lines, fields::product_name_patterns());
        profile.manufacturer = fields::first_plausible(&lines, fields::manufacturer_patterns());
        profile.product_code = fields::first_capture(&lines, fields::product_code_patterns());
        profile.revision =
            fields::first_capture(&doc_lines, fields::revision_patterns()).map(|raw| fields::normalize_date(&raw));
    }

    // Hazards (section 2).
    {
        let lines = section_or_doc(&profile.sections, 2, &doc_lines);
        profile.hazard_statements = fields::hazard_statements(&lines);
        profile.ghs_classifications = fields::ghs_classifications(&lines);
        profile.signal_word = fields::signal_word(&lines);
    }

    // Physical and chemical properties (section 9).
    {
        let lines = section_or_doc(&profile.sections, 9, &doc_lines);
        profile.flash_point = fields::temperature(&lines, fields::flash_point_patterns());
        profile.boiling_point = fields::temperature(&lines, fields::boiling_point_patterns());
        profile.melting_point = fields::temperature(&lines, fields::melting_point_patterns());
        profile.ph = fields::numeric(&lines, fields::ph_patterns());
        profile.density = fields::numeric(&lines, fields::density_patterns());
        profile.vapor_pressure = fields::first_capture(&lines, fields::vapor_pressure_patterns());

        match fields::physical_state(&lines) {
            StateReading::Explicit(s) | StateReading::Inferred(s) => profile.physical_state = s,
            // Deliberate default: liquid is the most common SDS state.
            // The assumption is surfaced through the waste profile.
            StateReading::Assumed => profile.physical_state = PhysicalState::Liquid,
        }
    }

    // Transport (section 14).
    {
        let lines = section_or_doc(&profile.sections, 14, &doc_lines);
        profile.un_number = fields::first_capture(&lines, fields::un_number_patterns()).map(fields::normalize_un);
        profile.proper_shipping_name = fields::first_plausible(&lines, fields::shipping_name_patterns());
        profile.hazard_class = fields::first_capture(&lines, fields::hazard_class_patterns());
        profile.packing_group = fields::first_capture(&lines, fields::packing_group_patterns());
    }

    profile.composition = composition::extract(&doc_lines, &profile.sections, profile.product_name.as_deref());

    profile.validation = ValidationReport::score(&profile);
    profile.is_valid = profile.validation.is_valid;
    profile
}

/// Whether the physical state was read or assumed for this profile; callers
/// use this to flag the soft-fail on the waste profile.
pub(crate) fn state_was_assumed(profile: &MaterialProfile) -> bool {
    let lines: Vec<&str> = match profile.sections.section(9) {
        Some(lines) => lines.iter().map(String::as_str).collect(),
        None => profile.sections.iter().flat_map(|(_, ls)| ls.iter().map(String::as_str)).collect(),
    };
    matches!(fields::physical_state(&lines), StateReading::Assumed)
}

/// Lines of numbered section `n`, falling back to the whole document when the
/// section was not detected. Poorly structured sheets still carry the labeled
/// fields somewhere. Borrows only the section map, so the caller keeps
/// filling the rest of the profile while the lines are live.
fn section_or_doc<'a>(sections: &'a SectionMap, n: u8, doc_lines: &[&'a str]) -> Vec<&'a str> {
    match sections.section(n) {
        Some(lines) => lines.iter().map(|s| s.as_str()).collect(),
        None => doc_lines.to_vec(),
    }
}
