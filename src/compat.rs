//! Pairwise material compatibility.
//!
//! A pure decision cascade with no error states:
//!
//! ```text
//! pair ── identifier-specific prohibition ──┐
//!      ── category matrix (ALL/prohibited,  │  first disqualifying rule
//!         then dangerous, both directions) ─┼─ wins; emergency triggers
//!      ── physical-state rule ──────────────┤  enrich any conflicting
//!      ── emergency-trigger scan ───────────┘  verdict with the response
//!      ── otherwise: permissive default (safe, or caution when a side is
//!         an unknown category carrying hazard data)
//! ```
//!
//! Every stage is checked in both orders, so `check(a, b)` and `check(b, a)`
//! agree on `compatible` and `severity`.

use serde::Serialize;

use crate::classify::WasteProfile;
use crate::profile::PhysicalState;
use crate::reference::{Category, EmergencyResponse, EmergencyTrigger, ReferenceData, TriggerMatch};

/// Verdict severity, ordered from benign to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Safe,
    Caution,
    Dangerous,
    Prohibited,
}

/// Which cascade stage produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleTag {
    IdentifierSpecific,
    CategoryMatrix,
    PhysicalState,
    EmergencyTrigger,
    Default,
}

/// Outcome of one pairwise compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    pub severity: Severity,
    pub reason: String,
    pub rule: RuleTag,
    /// Required emergency response when the pair is acutely dangerous.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencyResponse>,
}

impl CompatibilityVerdict {
    fn safe() -> Self {
        CompatibilityVerdict {
            compatible: true,
            severity: Severity::Safe,
            reason: "no incompatibility found".to_string(),
            rule: RuleTag::Default,
            emergency: None,
        }
    }
}

/// Derive the closed hazard category for a material. Pure function over the
/// profile: name keywords first, then DOT hazard class, RCRA codes, pH, and
/// finally the physical state for aerosols.
pub fn derive_category(w: &WasteProfile, _refs: &ReferenceData) -> Category {
    let name = w.material.product_name.as_deref().unwrap_or("").to_lowercase();

    let keyword_sets: &[(&[&str], Category)] = &[
        (&["cyanide"], Category::Cyanide),
        (&["hypochlorite", "bleach", "peroxide", "permanganate", "oxidizer", "oxidizing"], Category::Oxidizer),
        (&["water reactive", "water-reactive", "carbide", "borohydride"], Category::WaterReactive),
        (&["acid"], Category::Acid),
        (&["hydroxide", "caustic", "alkaline", "ammonia"], Category::Caustic),
        (&["aerosol", "spray"], Category::Aerosol),
        (crate::classify::PETROLEUM_KEYWORDS, Category::Petroleum),
        (&["flammable"], Category::Flammable),
    ];
    for (keywords, category) in keyword_sets {
        if keywords.iter().any(|kw| name.contains(kw)) {
            return *category;
        }
    }

    if let Some(class) = w.material.hazard_class.as_deref().map(str::trim) {
        match class {
            "3" => return Category::Flammable,
            "4.3" => return Category::WaterReactive,
            c if c.starts_with("5.1") => return Category::Oxidizer,
            c if c.starts_with("6.1") => return Category::Toxic,
            "8" => {
                if let Some(ph) = w.material.ph {
                    return if ph <= 7.0 { Category::Acid } else { Category::Caustic };
                }
            }
            c if c.starts_with('2') => return Category::Aerosol,
            _ => {}
        }
    }

    for code in &w.rcra_codes {
        match code.as_str() {
            "D001" => return Category::Flammable,
            "D003" => return Category::WaterReactive,
            "P030" | "P098" | "P106" => return Category::Cyanide,
            "D002" => {
                if let Some(ph) = w.material.ph {
                    return if ph <= 7.0 { Category::Acid } else { Category::Caustic };
                }
            }
            _ => {}
        }
    }

    if let Some(ph) = w.material.ph {
        if ph <= 2.0 {
            return Category::Acid;
        }
        if ph >= 12.5 {
            return Category::Caustic;
        }
    }

    if w.material.physical_state == PhysicalState::Aerosol {
        return Category::Aerosol;
    }

    Category::Unknown
}

/// Pairwise compatibility check.
pub fn check(a: &WasteProfile, b: &WasteProfile, refs: &ReferenceData) -> CompatibilityVerdict {
    let cat_a = derive_category(a, refs);
    let cat_b = derive_category(b, refs);
    let trigger = matched_trigger(a, cat_a, b, cat_b, refs);

    if crate::debug_enabled() {
        eprintln!("[chemsift] compat: categories {cat_a} vs {cat_b}");
    }

    if let Some(verdict) = identifier_stage(a, cat_a, b, cat_b, refs) {
        return escalate(verdict, trigger);
    }
    if let Some(verdict) = category_stage(cat_a, cat_b, refs) {
        return escalate(verdict, trigger);
    }
    if let Some(verdict) = state_stage(a, b, refs) {
        return escalate(verdict, trigger);
    }
    if let Some(t) = trigger {
        return CompatibilityVerdict {
            compatible: false,
            severity: Severity::Prohibited,
            reason: t.warning.clone(),
            rule: RuleTag::EmergencyTrigger,
            emergency: Some(EmergencyResponse { warning: t.warning.clone(), response: t.response.clone() }),
        };
    }

    // Permissive default. An unknown category that still carries hazard data
    // is surfaced as low confidence rather than silently trusted.
    let low_confidence = (cat_a == Category::Unknown && has_hazard_data(a))
        || (cat_b == Category::Unknown && has_hazard_data(b));
    if low_confidence {
        CompatibilityVerdict {
            compatible: true,
            severity: Severity::Caution,
            reason: "unrecognized category with hazard data, low confidence".to_string(),
            rule: RuleTag::Default,
            emergency: None,
        }
    } else {
        CompatibilityVerdict::safe()
    }
}

/// Check a candidate against every already-placed material, in insertion
/// order, returning the first conflict. When everything passes, the worst
/// compatible severity (caution over safe) is reported.
pub fn check_group(candidate: &WasteProfile, placed: &[WasteProfile], refs: &ReferenceData) -> CompatibilityVerdict {
    let mut worst: Option<CompatibilityVerdict> = None;
    for existing in placed {
        let verdict = check(candidate, existing, refs);
        if !verdict.compatible {
            return verdict;
        }
        let replace = worst.as_ref().is_none_or(|w| verdict.severity > w.severity);
        if replace {
            worst = Some(verdict);
        }
    }
    worst.unwrap_or_else(CompatibilityVerdict::safe)
}

/// Stage 1: identifier-specific prohibitions, both directions.
fn identifier_stage(
    a: &WasteProfile,
    cat_a: Category,
    b: &WasteProfile,
    cat_b: Category,
    refs: &ReferenceData,
) -> Option<CompatibilityVerdict> {
    for (x, y, cat_y) in [(a, b, cat_b), (b, a, cat_a)] {
        let Some(rule) = x.primary_cas().and_then(|cas| refs.identifier_rule(cas)) else {
            continue;
        };
        let cas_hit = y.primary_cas().is_some_and(|cas| rule.prohibited_cas.iter().any(|p| p == cas));
        let category_hit = rule.prohibited_categories.contains(&cat_y);
        if cas_hit || category_hit {
            return Some(CompatibilityVerdict {
                compatible: false,
                severity: Severity::Prohibited,
                reason: rule.reason.clone(),
                rule: RuleTag::IdentifierSpecific,
                emergency: rule.emergency.clone(),
            });
        }
    }
    None
}

/// Stage 2: category matrix. ALL-prohibitions and explicit prohibitions are
/// checked in both directions before any dangerous listing, so severity is
/// symmetric even when only one side's row names the other.
fn category_stage(cat_a: Category, cat_b: Category, refs: &ReferenceData) -> Option<CompatibilityVerdict> {
    for (x, y) in [(cat_a, cat_b), (cat_b, cat_a)] {
        let Some(rule) = refs.category_rule(x) else {
            continue;
        };
        if rule.all {
            return Some(CompatibilityVerdict {
                compatible: false,
                severity: Severity::Prohibited,
                reason: format!("{x} materials are incompatible with all other categories"),
                rule: RuleTag::CategoryMatrix,
                emergency: None,
            });
        }
        if rule.prohibited.contains(&y) {
            return Some(CompatibilityVerdict {
                compatible: false,
                severity: Severity::Prohibited,
                reason: format!("{x} must not be combined with {y}"),
                rule: RuleTag::CategoryMatrix,
                emergency: None,
            });
        }
    }

    for (x, y) in [(cat_a, cat_b), (cat_b, cat_a)] {
        let Some(rule) = refs.category_rule(x) else {
            continue;
        };
        if rule.dangerous.contains(&y) {
            return Some(CompatibilityVerdict {
                compatible: false,
                severity: Severity::Dangerous,
                reason: format!("{x} combined with {y} is a dangerous pairing"),
                rule: RuleTag::CategoryMatrix,
                emergency: None,
            });
        }
    }
    None
}

/// Stage 3: physical-state pairs that never share a container.
fn state_stage(a: &WasteProfile, b: &WasteProfile, refs: &ReferenceData) -> Option<CompatibilityVerdict> {
    let rule = refs.state_rule(a.material.physical_state, b.material.physical_state)?;
    Some(CompatibilityVerdict {
        compatible: false,
        severity: Severity::Dangerous,
        reason: rule.reason.clone(),
        rule: RuleTag::PhysicalState,
        emergency: None,
    })
}

/// Stage 4 lookup: first trigger-pair matching the materials in either order.
fn matched_trigger<'r>(
    a: &WasteProfile,
    cat_a: Category,
    b: &WasteProfile,
    cat_b: Category,
    refs: &'r ReferenceData,
) -> Option<&'r EmergencyTrigger> {
    refs.triggers().iter().find(|t| {
        (side_matches(a, cat_a, &t.a) && side_matches(b, cat_b, &t.b))
            || (side_matches(b, cat_b, &t.a) && side_matches(a, cat_a, &t.b))
    })
}

fn side_matches(w: &WasteProfile, cat: Category, side: &TriggerMatch) -> bool {
    let name = w.material.product_name.as_deref().unwrap_or("").to_lowercase();
    side.keywords.iter().any(|kw| name.contains(kw))
        || side.categories.contains(&cat)
        || w.primary_cas().is_some_and(|cas| side.cas.iter().any(|c| c == cas))
}

/// A matched emergency trigger upgrades any conflicting verdict and attaches
/// the required response, so the payload survives whichever stage fired.
fn escalate(mut verdict: CompatibilityVerdict, trigger: Option<&EmergencyTrigger>) -> CompatibilityVerdict {
    if let Some(t) = trigger {
        verdict.compatible = false;
        verdict.severity = Severity::Prohibited;
        if verdict.emergency.is_none() {
            verdict.emergency = Some(EmergencyResponse { warning: t.warning.clone(), response: t.response.clone() });
        }
    }
    verdict
}

fn has_hazard_data(w: &WasteProfile) -> bool {
    !w.rcra_codes.is_empty() || !w.material.hazard_statements.is_empty() || w.material.hazard_class.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Constituent, MaterialProfile, SectionMap};

    fn material(name: Option<&str>) -> WasteProfile {
        let mut m = MaterialProfile::empty(SectionMap::default());
        m.product_name = name.map(|s| s.to_string());
        WasteProfile::from_material(m)
    }

    fn with_cas(name: &str, cas: &str) -> WasteProfile {
        let mut w = material(Some(name));
        w.material.composition =
            vec![Constituent { name: name.to_lowercase(), cas: Some(cas.into()), percentage: Some("100%".into()) }];
        w
    }

    fn with_state(name: &str, state: PhysicalState) -> WasteProfile {
        let mut w = material(Some(name));
        w.material.physical_state = state;
        w
    }

    #[test]
    fn caustic_acid_pair_is_prohibited() {
        let refs = ReferenceData::load().unwrap();
        let naoh = {
            let mut w = material(Some("Sodium hydroxide solution"));
            w.material.ph = Some(13.5);
            w
        };
        let hcl = {
            let mut w = material(Some("Hydrochloric acid"));
            w.material.ph = Some(1.0);
            w
        };
        let verdict = check(&naoh, &hcl, &refs);
        assert!(!verdict.compatible);
        assert!(matches!(verdict.severity, Severity::Prohibited | Severity::Dangerous));
    }

    #[test]
    fn check_is_symmetric() {
        let refs = ReferenceData::load().unwrap();
        let pool = [
            material(Some("Sodium hydroxide solution")),
            material(Some("Hydrochloric acid")),
            with_cas("Bleach", "7681-52-9"),
            material(Some("Used motor oil")),
            with_state("Contact cleaner spray", PhysicalState::Aerosol),
            material(Some("Calcium carbide granules")),
            material(None),
        ];
        for a in &pool {
            for b in &pool {
                let ab = check(a, b, &refs);
                let ba = check(b, a, &refs);
                assert_eq!(ab.compatible, ba.compatible, "{:?} vs {:?}", a.material.product_name, b.material.product_name);
                assert_eq!(ab.severity, ba.severity, "{:?} vs {:?}", a.material.product_name, b.material.product_name);
            }
        }
    }

    #[test]
    fn unknowns_without_hazard_data_are_compatible() {
        let refs = ReferenceData::load().unwrap();
        let verdict = check(&material(Some("Window cleaner")), &material(Some("Hand soap")), &refs);
        assert!(verdict.compatible);
        assert_eq!(verdict.severity, Severity::Safe);
    }

    #[test]
    fn unknown_with_hazard_data_is_flagged_low_confidence() {
        let refs = ReferenceData::load().unwrap();
        let mut mystery = material(Some("Proprietary blend 7"));
        mystery.material.hazard_statements = vec!["H302".into()];
        let verdict = check(&mystery, &material(Some("Hand soap")), &refs);
        assert!(verdict.compatible);
        assert_eq!(verdict.severity, Severity::Caution);
    }

    #[test]
    fn water_reactive_rejects_everything() {
        let refs = ReferenceData::load().unwrap();
        let carbide = material(Some("Calcium carbide granules"));
        let soap = material(Some("Hand soap"));
        let verdict = check(&carbide, &soap, &refs);
        assert!(!verdict.compatible);
        assert_eq!(verdict.severity, Severity::Prohibited);
        assert_eq!(verdict.rule, RuleTag::CategoryMatrix);
    }

    #[test]
    fn hypochlorite_acid_carries_emergency_payload() {
        let refs = ReferenceData::load().unwrap();
        let bleach = with_cas("Bleach", "7681-52-9");
        let acid = material(Some("Muriatic acid"));
        let verdict = check(&bleach, &acid, &refs);
        assert!(!verdict.compatible);
        assert_eq!(verdict.severity, Severity::Prohibited);
        let emergency = verdict.emergency.expect("emergency payload");
        assert!(emergency.warning.to_lowercase().contains("chlor"));
    }

    #[test]
    fn aerosol_and_liquid_conflict_on_state() {
        let refs = ReferenceData::load().unwrap();
        let aerosol = with_state("Unlabeled canister", PhysicalState::Aerosol);
        let liquid = material(Some("Window cleaner"));
        let verdict = check(&aerosol, &liquid, &refs);
        assert!(!verdict.compatible);
        assert_eq!(verdict.rule, RuleTag::PhysicalState);
        assert_eq!(verdict.severity, Severity::Dangerous);
    }

    #[test]
    fn acid_base_outranks_state_difference() {
        let refs = ReferenceData::load().unwrap();
        let acid = material(Some("Hydrochloric acid"));
        let caustic_solid = with_state("Caustic soda beads", PhysicalState::Solid);
        let verdict = check(&acid, &caustic_solid, &refs);
        assert_eq!(verdict.rule, RuleTag::CategoryMatrix);
    }

    #[test]
    fn group_check_returns_first_conflict_in_order() {
        let refs = ReferenceData::load().unwrap();
        let placed = vec![
            material(Some("Window cleaner")),
            material(Some("Sodium hydroxide solution")),
            material(Some("Calcium carbide granules")),
        ];
        let acid = material(Some("Hydrochloric acid"));
        let verdict = check_group(&acid, &placed, &refs);
        assert!(!verdict.compatible);
        // The caustic at index 1 conflicts before the water-reactive at 2.
        assert!(verdict.reason.contains("caustic") || verdict.reason.contains("acid"));
        assert_eq!(verdict.rule, RuleTag::CategoryMatrix);
    }

    #[test]
    fn group_check_reports_worst_compatible_severity() {
        let refs = ReferenceData::load().unwrap();
        let mut mystery = material(Some("Proprietary blend 7"));
        mystery.material.hazard_statements = vec!["H302".into()];
        let placed = vec![material(Some("Hand soap")), mystery];
        let verdict = check_group(&material(Some("Window cleaner")), &placed, &refs);
        assert!(verdict.compatible);
        assert_eq!(verdict.severity, Severity::Caution);
    }
}
