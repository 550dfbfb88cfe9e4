//! Waste classification and reference-backed correction.
//!
//! Wraps an extracted [`MaterialProfile`] with the regulatory fields a
//! disposal decision needs (RCRA codes, form code, hazard classification) and
//! runs an ordered correction pass against the reference tables. Corrections
//! only add or fix fields, never discard unverifiable data, and every change
//! lands in an ordered audit log. The pass is idempotent: a second run over
//! its own output produces an empty log.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::profile::{MaterialProfile, PhysicalState, Temperature};
use crate::reference::ReferenceData;

/// Flash point threshold for the RCRA ignitability characteristic, °C.
const IGNITABILITY_FLASH_C: f64 = 60.0;

const IGNITABILITY_CODE: &str = "D001";
const CORROSIVITY_CODE: &str = "D002";

/// Physical state each form code presumes, and the canonical codes used when
/// the assigned code disagrees with the profile.
static FORM_CODE_STATES: Lazy<HashMap<&'static str, PhysicalState>> = Lazy::new(|| {
    HashMap::from([
        ("102", PhysicalState::Liquid),
        ("204", PhysicalState::Liquid),
        ("309", PhysicalState::Solid),
        ("505", PhysicalState::Aerosol),
    ])
});

const FORM_CODE_SOLID: &str = "309";
const FORM_CODE_AEROSOL: &str = "505";

pub(crate) const PETROLEUM_KEYWORDS: &[&str] =
    &["petroleum", "diesel", "gasoline", "kerosene", "naphtha", "mineral spirits", "fuel", "motor oil", "lubricant"];

/// Overall hazard classification of a waste stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    NotRegulated,
    StateRegulated,
    Hazardous,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Classification::NotRegulated => "not-regulated",
            Classification::StateRegulated => "state-regulated",
            Classification::Hazardous => "hazardous",
        };
        f.write_str(s)
    }
}

/// A material profile plus the regulatory fields layered on top of it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteProfile {
    pub material: MaterialProfile,
    pub rcra_codes: Vec<String>,
    pub form_code: Option<String>,
    pub classification: Classification,
    /// True while the liquid default from extraction is still unverified.
    /// Consumed by the first correction pass.
    pub state_assumed: bool,
}

impl WasteProfile {
    pub fn from_material(material: MaterialProfile) -> Self {
        let state_assumed = crate::extract::state_was_assumed(&material);
        WasteProfile {
            material,
            rcra_codes: Vec::new(),
            form_code: None,
            classification: Classification::NotRegulated,
            state_assumed,
        }
    }

    /// CAS identifier of the first constituent carrying one.
    pub fn primary_cas(&self) -> Option<&str> {
        self.material.composition.iter().find_map(|c| c.cas.as_deref())
    }

    fn name_lower(&self) -> String {
        self.material.product_name.as_deref().unwrap_or("").to_lowercase()
    }
}

/// One entry of the correction audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

impl std::fmt::Display for Correction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.before, self.after)
    }
}

/// Run the ordered correction pass. Returns the corrected profile and the
/// audit log; an empty log means nothing needed fixing.
pub fn correct(profile: &WasteProfile, refs: &ReferenceData) -> (WasteProfile, Vec<Correction>) {
    let mut out = profile.clone();
    let mut log = Vec::new();

    fill_from_reference(&mut out, refs, &mut log);
    infer_state_from_name(&mut out, &mut log);
    out.state_assumed = false;

    fill_reference_codes(&mut out, refs, &mut log);
    apply_ignitability_rule(&mut out, &mut log);
    strip_solid_corrosivity(&mut out, &mut log);
    reconcile_form_code(&mut out, &mut log);
    assign_classification(&mut out, &mut log);
    apply_overrides(&mut out, refs, &mut log);

    (out, log)
}

/// Step 1: overwrite unset fields from the known-chemical table when the
/// product name matches an entry.
fn fill_from_reference(out: &mut WasteProfile, refs: &ReferenceData, log: &mut Vec<Correction>) {
    let Some(name) = out.material.product_name.clone() else {
        return;
    };
    let Some(chem) = refs.lookup_name(&name) else {
        return;
    };

    if out.material.flash_point.is_none() {
        if let Some(c) = chem.flash_point_c {
            out.material.flash_point = Some(Temperature::from_celsius(c, format!("{c}°C")));
            log.push(Correction { field: "flashPoint", before: "none".into(), after: format!("{c}°C") });
        }
    }
    if out.form_code.is_none() {
        if let Some(code) = &chem.form_code {
            out.form_code = Some(code.clone());
            log.push(Correction { field: "formCode", before: "none".into(), after: code.clone() });
        }
    }
    if out.state_assumed {
        if let Some(state) = chem.physical_state {
            if state != out.material.physical_state {
                log.push(Correction {
                    field: "physicalState",
                    before: out.material.physical_state.to_string(),
                    after: state.to_string(),
                });
                out.material.physical_state = state;
            }
            out.state_assumed = false;
        }
    }
    if out.material.un_number.is_none() {
        if let Some(un) = &chem.un_number {
            out.material.un_number = Some(un.clone());
            log.push(Correction { field: "unNumber", before: "none".into(), after: un.clone() });
        }
    }
    if out.material.hazard_class.is_none() {
        if let Some(class) = &chem.dot_class {
            out.material.hazard_class = Some(class.clone());
            log.push(Correction { field: "hazardClass", before: "none".into(), after: class.clone() });
        }
    }
}

/// Second half of the reference fill, run after the physical state has
/// settled: RCRA codes from the known-chemical table, pre-filtered by the
/// same state rules steps 3 and 4 enforce. Filling them earlier would let
/// those steps strip a code the next pass re-fills, breaking idempotency.
fn fill_reference_codes(out: &mut WasteProfile, refs: &ReferenceData, log: &mut Vec<Correction>) {
    if !out.rcra_codes.is_empty() {
        return;
    }
    let Some(name) = out.material.product_name.clone() else {
        return;
    };
    let Some(chem) = refs.lookup_name(&name) else {
        return;
    };

    let mut codes = chem.rcra_codes.clone();
    if out.material.physical_state == PhysicalState::Solid {
        codes.retain(|c| c != CORROSIVITY_CODE);
    }
    if out.material.physical_state == PhysicalState::Liquid {
        if let Some(flash) = &out.material.flash_point {
            if flash.celsius >= IGNITABILITY_FLASH_C {
                codes.retain(|c| c != IGNITABILITY_CODE);
            }
        }
    }

    if !codes.is_empty() {
        out.rcra_codes = codes;
        log.push(Correction { field: "rcraCodes", before: "none".into(), after: out.rcra_codes.join(", ") });
    }
}

/// Step 2: when the state is still the unverified default, infer it from
/// product name keywords.
fn infer_state_from_name(out: &mut WasteProfile, log: &mut Vec<Correction>) {
    if !out.state_assumed {
        return;
    }
    let name = out.name_lower();
    let inferred = if ["aerosol", "spray"].iter().any(|kw| name.contains(kw)) {
        Some(PhysicalState::Aerosol)
    } else if ["bead", "pellet", "powder", "solid"].iter().any(|kw| name.contains(kw)) {
        Some(PhysicalState::Solid)
    } else if ["grease", "paste"].iter().any(|kw| name.contains(kw)) {
        Some(PhysicalState::SemiSolid)
    } else {
        // Liquid stays the default.
        None
    };

    if let Some(state) = inferred {
        if state != out.material.physical_state {
            log.push(Correction {
                field: "physicalState",
                before: out.material.physical_state.to_string(),
                after: state.to_string(),
            });
            out.material.physical_state = state;
        }
    }
}

/// Step 3: a liquid flashing below 60°C must carry D001; a liquid flashing
/// at or above it must not.
fn apply_ignitability_rule(out: &mut WasteProfile, log: &mut Vec<Correction>) {
    if out.material.physical_state != PhysicalState::Liquid {
        return;
    }
    let Some(flash) = &out.material.flash_point else {
        return;
    };

    let has_code = out.rcra_codes.iter().any(|c| c == IGNITABILITY_CODE);
    if flash.celsius < IGNITABILITY_FLASH_C && !has_code {
        out.rcra_codes.push(IGNITABILITY_CODE.to_string());
        log.push(Correction {
            field: "rcraCodes",
            before: format!("missing {IGNITABILITY_CODE}"),
            after: format!("added {IGNITABILITY_CODE} (flash point {}°C)", flash.celsius),
        });
    } else if flash.celsius >= IGNITABILITY_FLASH_C && has_code {
        out.rcra_codes.retain(|c| c != IGNITABILITY_CODE);
        log.push(Correction {
            field: "rcraCodes",
            before: IGNITABILITY_CODE.to_string(),
            after: format!("removed {IGNITABILITY_CODE} (flash point {}°C)", flash.celsius),
        });
    }
}

/// Step 4: the corrosivity characteristic applies only to liquids.
fn strip_solid_corrosivity(out: &mut WasteProfile, log: &mut Vec<Correction>) {
    if out.material.physical_state == PhysicalState::Solid && out.rcra_codes.iter().any(|c| c == CORROSIVITY_CODE) {
        out.rcra_codes.retain(|c| c != CORROSIVITY_CODE);
        log.push(Correction {
            field: "rcraCodes",
            before: CORROSIVITY_CODE.to_string(),
            after: format!("removed {CORROSIVITY_CODE} (solid)"),
        });
    }
}

/// Step 5: replace a form code whose presumed state disagrees with the
/// profile's actual aerosol or solid state.
fn reconcile_form_code(out: &mut WasteProfile, log: &mut Vec<Correction>) {
    let Some(code) = out.form_code.clone() else {
        return;
    };
    let Some(required) = FORM_CODE_STATES.get(code.as_str()) else {
        return;
    };
    if *required == out.material.physical_state {
        return;
    }

    let canonical = match out.material.physical_state {
        PhysicalState::Aerosol => Some(FORM_CODE_AEROSOL),
        PhysicalState::Solid => Some(FORM_CODE_SOLID),
        _ => None,
    };
    if let Some(canonical) = canonical {
        out.form_code = Some(canonical.to_string());
        log.push(Correction { field: "formCode", before: code, after: canonical.to_string() });
    }
}

/// Step 6: any federal code forces "hazardous"; petroleum keywords upgrade a
/// not-regulated default one notch.
fn assign_classification(out: &mut WasteProfile, log: &mut Vec<Correction>) {
    let target = if !out.rcra_codes.is_empty() {
        Classification::Hazardous
    } else if out.classification == Classification::NotRegulated
        && PETROLEUM_KEYWORDS.iter().any(|kw| out.name_lower().contains(kw))
    {
        Classification::StateRegulated
    } else {
        out.classification
    };

    if target != out.classification {
        log.push(Correction {
            field: "classification",
            before: out.classification.to_string(),
            after: target.to_string(),
        });
        out.classification = target;
    }
}

/// Step 7: named overrides for chemicals the reference table is known to
/// under-classify. These take final precedence and never downgrade.
fn apply_overrides(out: &mut WasteProfile, _refs: &ReferenceData, log: &mut Vec<Correction>) {
    const OVERRIDES: &[(&str, &str, &[&str])] = &[
        ("127-18-4", "tetrachloroethylene", &["D039", "F002"]),
        ("56-23-5", "carbon tetrachloride", &["D019", "U211"]),
    ];

    let name = out.name_lower();
    for (cas, keyword, codes) in OVERRIDES {
        let matched = out.primary_cas() == Some(cas) || name.contains(keyword);
        if !matched {
            continue;
        }

        for code in *codes {
            if !out.rcra_codes.iter().any(|c| c == code) {
                out.rcra_codes.push((*code).to_string());
                log.push(Correction {
                    field: "rcraCodes",
                    before: format!("missing {code}"),
                    after: format!("added {code} ({keyword} override)"),
                });
            }
        }
        if out.classification != Classification::Hazardous {
            log.push(Correction {
                field: "classification",
                before: out.classification.to_string(),
                after: Classification::Hazardous.to_string(),
            });
            out.classification = Classification::Hazardous;
        }
    }
}
