//! The structured output side of extraction: section maps, material profiles
//! and the validation report that scores them.

use serde::Serialize;
use serde::ser::SerializeMap;

/// Label of one bucket in a [`SectionMap`]: a GHS section number (1..=16) or
/// the unlabeled "general" bucket for lines that precede any recognizable
/// section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLabel {
    Numbered(u8),
    General,
}

impl SectionLabel {
    /// Stable string key used for JSON output ("1".."16" or "general").
    pub fn key(&self) -> String {
        match self {
            SectionLabel::Numbered(n) => n.to_string(),
            SectionLabel::General => "general".to_string(),
        }
    }
}

/// Insertion-ordered mapping of section label to its lines.
///
/// Built once per document by the segmenter and never mutated afterward,
/// except that the artificial-section fallback may append sections that were
/// not detected on the first pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    entries: Vec<(SectionLabel, Vec<String>)>,
}

impl SectionMap {
    /// Append a section. Lines are merged if the label already exists, so a
    /// document that re-opens a section keeps a single bucket for it.
    pub fn insert(&mut self, label: SectionLabel, mut lines: Vec<String>) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            existing.append(&mut lines);
        } else {
            self.entries.push((label, lines));
        }
    }

    pub fn get(&self, label: SectionLabel) -> Option<&[String]> {
        self.entries.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_slice())
    }

    /// Lines of numbered section `n`, if it was detected.
    pub fn section(&self, n: u8) -> Option<&[String]> {
        self.get(SectionLabel::Numbered(n))
    }

    pub fn contains(&self, label: SectionLabel) -> bool {
        self.entries.iter().any(|(l, _)| *l == label)
    }

    /// Number of numbered (non-general) sections detected.
    pub fn numbered_count(&self) -> usize {
        self.entries.iter().filter(|(l, _)| matches!(l, SectionLabel::Numbered(_))).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionLabel, &[String])> {
        self.entries.iter().map(|(l, v)| (l, v.as_slice()))
    }

    /// Total number of stored lines across all buckets.
    pub fn line_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, lines) in &self.entries {
            map.serialize_entry(&label.key(), lines)?;
        }
        map.end()
    }
}

/// Physical state of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhysicalState {
    Liquid,
    Solid,
    Gas,
    Aerosol,
    SemiSolid,
}

impl std::fmt::Display for PhysicalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhysicalState::Liquid => "liquid",
            PhysicalState::Solid => "solid",
            PhysicalState::Gas => "gas",
            PhysicalState::Aerosol => "aerosol",
            PhysicalState::SemiSolid => "semi-solid",
        };
        f.write_str(s)
    }
}

/// A temperature captured from document text, kept in both scales plus the
/// original matched string for audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
    pub original: String,
}

impl Temperature {
    fn round1(v: f64) -> f64 {
        (v * 10.0).round() / 10.0
    }

    pub fn from_celsius(c: f64, original: impl Into<String>) -> Self {
        Temperature {
            celsius: Self::round1(c),
            fahrenheit: Self::round1(c * 9.0 / 5.0 + 32.0),
            original: original.into(),
        }
    }

    pub fn from_fahrenheit(f: f64, original: impl Into<String>) -> Self {
        Temperature {
            celsius: Self::round1((f - 32.0) * 5.0 / 9.0),
            fahrenheit: Self::round1(f),
            original: original.into(),
        }
    }
}

/// One constituent of a mixture: a name, an optional CAS registry number in
/// `NN{2-7}-NN-N` form, and an optional concentration or range (e.g. "100%",
/// "10 - 20%").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constituent {
    pub name: String,
    pub cas: Option<String>,
    pub percentage: Option<String>,
}

/// The structured result of extracting one safety document.
///
/// Field names serialize exactly as downstream consumers (forms, exports)
/// expect them; see `extract_to_json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProfile {
    pub product_name: Option<String>,
    pub manufacturer: Option<String>,
    pub product_code: Option<String>,
    pub revision: Option<String>,
    pub physical_state: PhysicalState,
    pub flash_point: Option<Temperature>,
    pub boiling_point: Option<Temperature>,
    pub melting_point: Option<Temperature>,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
    pub density: Option<f64>,
    pub vapor_pressure: Option<String>,
    /// Unique uppercase H-codes in first-seen order.
    pub hazard_statements: Vec<String>,
    pub ghs_classifications: Vec<String>,
    pub signal_word: Option<String>,
    pub composition: Vec<Constituent>,
    pub un_number: Option<String>,
    pub proper_shipping_name: Option<String>,
    pub hazard_class: Option<String>,
    pub packing_group: Option<String>,
    /// Raw section map, kept for debugging downstream.
    pub sections: SectionMap,
    pub is_valid: bool,
    pub validation: ValidationReport,
}

impl MaterialProfile {
    /// An empty profile carrying only the section map. Extraction fills the
    /// rest; absent data stays `None` rather than failing.
    pub(crate) fn empty(sections: SectionMap) -> Self {
        MaterialProfile {
            product_name: None,
            manufacturer: None,
            product_code: None,
            revision: None,
            physical_state: PhysicalState::Liquid,
            flash_point: None,
            boiling_point: None,
            melting_point: None,
            ph: None,
            density: None,
            vapor_pressure: None,
            hazard_statements: Vec::new(),
            ghs_classifications: Vec::new(),
            signal_word: None,
            composition: Vec::new(),
            un_number: None,
            proper_shipping_name: None,
            hazard_class: None,
            packing_group: None,
            sections,
            is_valid: false,
            validation: ValidationReport::default(),
        }
    }

    pub fn has_product_name(&self) -> bool {
        self.product_name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Composition counts as present when at least one constituent carries a
    /// CAS number or a recovered (non-placeholder) name.
    pub fn has_composition(&self) -> bool {
        self.composition.iter().any(|c| c.cas.is_some() || c.name != crate::extract::composition::UNKNOWN_COMPONENT)
    }
}

/// A datapoint the extractor could not recover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDatapoint {
    pub field: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub critical: bool,
}

/// Pass/fail verdict over a whole extraction, with the list of missing
/// datapoints. Recomputed on every extraction, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub missing_datapoints: Vec<MissingDatapoint>,
    pub needs_manual_entry: bool,
}

impl ValidationReport {
    /// Score a profile. Product name and composition are the only critical
    /// datapoints: the profile is valid when either is present, and needs
    /// manual entry only when both are missing. Physical and hazard gaps are
    /// noted but non-critical.
    pub fn score(profile: &MaterialProfile) -> Self {
        let mut missing = Vec::new();

        let has_name = profile.has_product_name();
        let has_composition = profile.has_composition();

        if !has_name {
            missing.push(MissingDatapoint {
                field: "productName",
                label: "Product name",
                description: "No product or trade name could be extracted",
                critical: true,
            });
        }
        if !has_composition {
            missing.push(MissingDatapoint {
                field: "composition",
                label: "Composition",
                description: "No constituent with a CAS number or recognizable name was found",
                critical: true,
            });
        }
        if profile.flash_point.is_none() {
            missing.push(MissingDatapoint {
                field: "flashPoint",
                label: "Flash point",
                description: "No flash point was extracted; ignitability cannot be confirmed",
                critical: false,
            });
        }
        if profile.hazard_statements.is_empty() {
            missing.push(MissingDatapoint {
                field: "hazardStatements",
                label: "Hazard statements",
                description: "No H-codes were found in the hazards section",
                critical: false,
            });
        }
        if profile.un_number.is_none() {
            missing.push(MissingDatapoint {
                field: "unNumber",
                label: "UN number",
                description: "No UN number was found in the transport section",
                critical: false,
            });
        }

        ValidationReport {
            is_valid: has_name || has_composition,
            missing_datapoints: missing,
            needs_manual_entry: !has_name && !has_composition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(name: Option<&str>, composition: Vec<Constituent>) -> MaterialProfile {
        let mut p = MaterialProfile::empty(SectionMap::default());
        p.product_name = name.map(|s| s.to_string());
        p.composition = composition;
        p
    }

    #[test]
    fn valid_with_name_only() {
        let p = profile_with(Some("Acetone"), vec![]);
        let report = ValidationReport::score(&p);
        assert!(report.is_valid);
        assert!(!report.needs_manual_entry);
        assert!(report.missing_datapoints.iter().any(|d| d.field == "composition" && d.critical));
    }

    #[test]
    fn valid_with_composition_only() {
        let p = profile_with(
            None,
            vec![Constituent { name: "acetone".into(), cas: Some("67-64-1".into()), percentage: Some("100%".into()) }],
        );
        let report = ValidationReport::score(&p);
        assert!(report.is_valid);
        assert!(!report.needs_manual_entry);
    }

    #[test]
    fn manual_entry_when_both_missing() {
        let p = profile_with(None, vec![]);
        let report = ValidationReport::score(&p);
        assert!(!report.is_valid);
        assert!(report.needs_manual_entry);
    }

    #[test]
    fn placeholder_only_composition_is_not_composition() {
        let p = profile_with(
            None,
            vec![Constituent { name: "Unknown Component".into(), cas: None, percentage: Some("100%".into()) }],
        );
        assert!(!p.has_composition());
    }

    #[test]
    fn section_map_merges_reopened_labels() {
        let mut map = SectionMap::default();
        map.insert(SectionLabel::Numbered(1), vec!["a".into()]);
        map.insert(SectionLabel::Numbered(2), vec!["b".into()]);
        map.insert(SectionLabel::Numbered(1), vec!["c".into()]);
        assert_eq!(map.section(1), Some(&["a".to_string(), "c".to_string()][..]));
        assert_eq!(map.numbered_count(), 2);
        assert_eq!(map.line_count(), 3);
    }

    #[test]
    fn section_map_serializes_in_insertion_order() {
        let mut map = SectionMap::default();
        map.insert(SectionLabel::General, vec!["x".into()]);
        map.insert(SectionLabel::Numbered(3), vec!["y".into()]);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.find("general").unwrap() < json.find("\"3\"").unwrap());
    }

    #[test]
    fn temperature_conversions_round_to_one_decimal() {
        let t = Temperature::from_fahrenheit(100.0, "100°F");
        assert_eq!(t.celsius, 37.8);
        assert_eq!(t.fahrenheit, 100.0);

        let t = Temperature::from_celsius(37.8, "37.8°C");
        assert_eq!(t.fahrenheit, 100.0);
    }
}
