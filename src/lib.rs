//! Rule-based extraction of structured hazard profiles from chemical
//! safety-document text, plus waste classification and pairwise material
//! compatibility decisions.
//!
//! The pipeline is deterministic end to end: segment the raw text into GHS
//! sections, extract typed fields through ordered pattern cascades, correct
//! the result against embedded reference chemistry, and decide whether two
//! materials may share a container. See [`extract`], [`classify`] and
//! [`check`] for the three entry points.

extern crate self as chemsift;

#[macro_use]
mod macros;

mod api;
mod classify;
mod compat;
mod extract;
mod profile;
mod reference;
mod segment;

pub use api::{
    check, check_group, check_group_with, check_with, classify, classify_with, extract, extract_to_json,
};
pub use classify::{Classification, Correction, WasteProfile, correct};
pub use compat::{CompatibilityVerdict, RuleTag, Severity, derive_category};
pub use profile::{
    Constituent, MaterialProfile, MissingDatapoint, PhysicalState, SectionLabel, SectionMap, Temperature,
    ValidationReport,
};
pub use reference::{Category, ConfigError, EmergencyResponse, ReferenceData};
pub use segment::segment;

/// Whether debug tracing is enabled (`CHEMSIFT_DEBUG` set to anything but
/// "0"). Checked once per process.
pub(crate) fn debug_enabled() -> bool {
    static ENABLED: once_cell::sync::Lazy<bool> =
        once_cell::sync::Lazy::new(|| std::env::var("CHEMSIFT_DEBUG").is_ok_and(|v| !v.is_empty() && v != "0"));
    *ENABLED
}
