use crate::extract::extract_profile;
use crate::profile::PhysicalState;

const SOLVENT_SDS: &str = "\
SAFETY DATA SHEET
according to 29 CFR 1910.1200

Section 1: Identification
Product Name: Technical Grade Toluene
Product Code: TOL-500
Manufacturer: Example Chemical Co.
Emergency Phone: +1 (800) 424-9300
Revision Date: 03/18/2024

Section 2: Hazards Identification
Signal Word: Danger
Flammable liquids, Category 2
H225 Highly flammable liquid and vapour
H304 May be fatal if swallowed
h336 May cause drowsiness

Section 3: Composition / Information on Ingredients
Toluene 108-88-3 95 - 100%
Benzene 71-43-2 <0.1%

Section 9: Physical and Chemical Properties
Physical State: Liquid
pH: Not applicable
Flash Point: 4°C (closed cup)
Boiling Point: 111°C
Density: 0.87 g/mL

Section 14: Transport Information
UN number: 1294
Proper Shipping Name: Toluene
Hazard Class: 3
Packing Group: II
";

const MESSY_SHEET: &str = "\
PRODUCT DATA
trade name: Heavy Duty Degreaser Spray
supplier: Acme Industrial

contains petroleum distillates, CAS 64742-47-8
flash point 40 degrees C
";

#[test]
fn well_formed_sheet_extracts_every_field_group() {
    let p = extract_profile(SOLVENT_SDS);

    assert_eq!(p.product_name.as_deref(), Some("Technical Grade Toluene"));
    assert_eq!(p.product_code.as_deref(), Some("TOL-500"));
    assert_eq!(p.manufacturer.as_deref(), Some("Example Chemical Co."));
    assert_eq!(p.revision.as_deref(), Some("2024-03-18"));

    assert_eq!(p.signal_word.as_deref(), Some("Danger"));
    assert_eq!(p.hazard_statements, vec!["H225", "H304", "H336"]);
    assert!(p.ghs_classifications.iter().any(|c| c.to_lowercase().contains("category 2")));

    assert_eq!(p.physical_state, PhysicalState::Liquid);
    assert_eq!(p.flash_point.as_ref().map(|t| t.celsius), Some(4.0));
    assert_eq!(p.boiling_point.as_ref().map(|t| t.celsius), Some(111.0));
    assert_eq!(p.density, Some(0.87));
    // "Not applicable" carries no numeric value.
    assert_eq!(p.ph, None);

    assert_eq!(p.un_number.as_deref(), Some("UN1294"));
    assert_eq!(p.proper_shipping_name.as_deref(), Some("Toluene"));
    assert_eq!(p.hazard_class.as_deref(), Some("3"));
    assert_eq!(p.packing_group.as_deref(), Some("II"));

    assert!(p.is_valid);
    assert!(!p.validation.needs_manual_entry);
}

#[test]
fn composition_keeps_constituent_order_and_percentages() {
    let p = extract_profile(SOLVENT_SDS);
    assert_eq!(p.composition.len(), 2);
    assert_eq!(p.composition[0].name, "Toluene");
    assert_eq!(p.composition[0].cas.as_deref(), Some("108-88-3"));
    assert_eq!(p.composition[0].percentage.as_deref(), Some("95 - 100%"));
    assert_eq!(p.composition[1].cas.as_deref(), Some("71-43-2"));
    assert_eq!(p.composition[1].percentage.as_deref(), Some("<0.1%"));
}

#[test]
fn sections_partition_every_non_blank_line() {
    let p = extract_profile(SOLVENT_SDS);
    let non_blank = SOLVENT_SDS.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(p.sections.line_count(), non_blank);
}

#[test]
fn messy_sheet_still_yields_a_usable_profile() {
    let p = extract_profile(MESSY_SHEET);

    assert_eq!(p.product_name.as_deref(), Some("Heavy Duty Degreaser Spray"));
    assert_eq!(p.manufacturer.as_deref(), Some("Acme Industrial"));
    assert_eq!(p.flash_point.as_ref().map(|t| t.celsius), Some(40.0));

    // The CAS-anchored tier finds the lone identifier in the synthesized
    // composition section; no percentage is stated on the line.
    assert_eq!(p.composition.len(), 1);
    assert_eq!(p.composition[0].cas.as_deref(), Some("64742-47-8"));
    assert!(p.composition[0].name.to_lowercase().contains("petroleum distillates"));
    assert_eq!(p.composition[0].percentage, None);

    assert!(p.is_valid);
}

#[test]
fn messy_sheet_state_defaults_to_liquid_and_is_flagged() {
    // No state cue in the synthesized properties section: extraction keeps
    // the liquid default and flags it; classification may still correct it
    // from the product name.
    let p = extract_profile(MESSY_SHEET);
    assert_eq!(p.physical_state, PhysicalState::Liquid);
    assert!(crate::extract::state_was_assumed(&p));
}

#[test]
fn each_field_group_reads_its_own_section() {
    let doc = "\
Section 1: Identification
Product Name: Sectioned Product
Section 9: Physical and Chemical Properties
Flash Point: 21°C
Section 14: Transport Information
UN1993
";
    let p = extract_profile(doc);
    assert_eq!(p.product_name.as_deref(), Some("Sectioned Product"));
    assert_eq!(p.flash_point.as_ref().map(|t| t.celsius), Some(21.0));
    assert_eq!(p.un_number.as_deref(), Some("UN1993"));
}

#[test]
fn phone_numbers_never_become_names() {
    let doc = "Product Name: +1 (800) 424-9300\nTrade Name: Real Product Name";
    let p = extract_profile(doc);
    assert_eq!(p.product_name.as_deref(), Some("Real Product Name"));
}

#[test]
fn absent_fields_stay_none_without_failing() {
    let p = extract_profile("completely unrelated text, nothing extractable");
    assert_eq!(p.product_name, None);
    assert_eq!(p.flash_point, None);
    assert!(p.composition.is_empty());
    assert!(!p.is_valid);
    assert!(p.validation.needs_manual_entry);
}

#[test]
fn state_was_assumed_tracks_the_liquid_default() {
    let explicit = extract_profile(SOLVENT_SDS);
    assert!(!crate::extract::state_was_assumed(&explicit));

    let bare = extract_profile("Product Name: Mystery Mixture");
    assert_eq!(bare.physical_state, PhysicalState::Liquid);
    assert!(crate::extract::state_was_assumed(&bare));
}
