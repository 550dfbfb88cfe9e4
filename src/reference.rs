//! Reference chemistry tables.
//!
//! Safety rules live in versioned JSON under `data/`, embedded at compile
//! time and parsed once into a process-wide [`ReferenceData`]. The tables are
//! never mutated after load, so shared read access from parallel extraction
//! workers needs no locking. A malformed table is a data integrity failure
//! and aborts the process at first use rather than degrading silently.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::PhysicalState;

/// Closed set of hazard categories used by the compatibility matrix. Derived
/// by [`crate::compat::derive_category`], never parsed from free text into an
/// open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Acid,
    Caustic,
    Oxidizer,
    Flammable,
    Toxic,
    WaterReactive,
    Cyanide,
    Aerosol,
    Petroleum,
    Unknown,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Acid => "acid",
            Category::Caustic => "caustic",
            Category::Oxidizer => "oxidizer",
            Category::Flammable => "flammable",
            Category::Toxic => "toxic",
            Category::WaterReactive => "water-reactive",
            Category::Cyanide => "cyanide",
            Category::Aerosol => "aerosol",
            Category::Petroleum => "petroleum",
            Category::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One row of the known-chemical-property table.
#[derive(Debug, Clone, Deserialize)]
pub struct KnownChemical {
    pub name: String,
    pub cas: String,
    pub flash_point_c: Option<f64>,
    #[serde(default)]
    pub rcra_codes: Vec<String>,
    pub form_code: Option<String>,
    pub category: Category,
    pub physical_state: Option<PhysicalState>,
    pub un_number: Option<String>,
    pub dot_class: Option<String>,
}

/// One row of the category-incompatibility matrix. `all` rejects pairing
/// with every category regardless of the explicit lists.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub prohibited: Vec<Category>,
    #[serde(default)]
    pub dangerous: Vec<Category>,
}

/// Required emergency response attached to an acutely dangerous combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyResponse {
    pub warning: String,
    pub response: String,
}

/// Identifier-specific incompatibility entry.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierRule {
    pub cas: String,
    #[serde(default)]
    pub prohibited_cas: Vec<String>,
    #[serde(default)]
    pub prohibited_categories: Vec<Category>,
    pub reason: String,
    pub emergency: Option<EmergencyResponse>,
}

/// A physical-state pair that must not share a container.
#[derive(Debug, Clone, Deserialize)]
pub struct StateRule {
    pub a: PhysicalState,
    pub b: PhysicalState,
    pub reason: String,
}

/// Matching side of an emergency trigger. A material matches when any of its
/// keywords appears in the material name, or its derived category or primary
/// CAS is listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerMatch {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub cas: Vec<String>,
}

/// One named trigger-pair requiring a documented emergency response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyTrigger {
    pub name: String,
    #[serde(default)]
    pub a: TriggerMatch,
    #[serde(default)]
    pub b: TriggerMatch,
    pub warning: String,
    pub response: String,
}

/// Fatal reference-table load failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reference table {table}: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("reference table {table}: invalid CAS identifier {cas:?}")]
    InvalidCas { table: &'static str, cas: String },
}

/// All reference tables, loaded and validated.
#[derive(Debug)]
pub struct ReferenceData {
    /// Sorted longest name first so specific names win substring lookups.
    chemicals: Vec<KnownChemical>,
    matrix: HashMap<Category, CategoryRule>,
    identifier_rules: HashMap<String, IdentifierRule>,
    state_rules: Vec<StateRule>,
    triggers: Vec<EmergencyTrigger>,
}

static REFERENCE: Lazy<ReferenceData> = Lazy::new(|| match ReferenceData::load() {
    Ok(data) => data,
    Err(err) => panic!("fatal reference data error: {err}"),
});

impl ReferenceData {
    /// The process-wide shared tables. First access parses the embedded JSON
    /// and aborts on malformed data.
    pub fn shared() -> &'static ReferenceData {
        &REFERENCE
    }

    /// Parse and validate the embedded tables.
    pub fn load() -> Result<ReferenceData, ConfigError> {
        ReferenceData::build(
            include_str!("../data/known_chemicals.json"),
            include_str!("../data/category_matrix.json"),
            include_str!("../data/identifier_incompat.json"),
            include_str!("../data/state_compat.json"),
            include_str!("../data/emergency_triggers.json"),
        )
    }

    fn build(
        chemicals_json: &str,
        matrix_json: &str,
        identifiers_json: &str,
        states_json: &str,
        triggers_json: &str,
    ) -> Result<ReferenceData, ConfigError> {
        let mut chemicals: Vec<KnownChemical> = parse("known_chemicals", chemicals_json)?;
        for chem in &chemicals {
            validate_cas("known_chemicals", &chem.cas)?;
        }
        chemicals.sort_by(|a, b| b.name.len().cmp(&a.name.len()));

        let rows: Vec<CategoryRule> = parse("category_matrix", matrix_json)?;
        let matrix = rows.into_iter().map(|r| (r.category, r)).collect();

        let rows: Vec<IdentifierRule> = parse("identifier_incompat", identifiers_json)?;
        let mut identifier_rules = HashMap::new();
        for rule in rows {
            validate_cas("identifier_incompat", &rule.cas)?;
            for cas in &rule.prohibited_cas {
                validate_cas("identifier_incompat", cas)?;
            }
            identifier_rules.insert(rule.cas.clone(), rule);
        }

        let state_rules: Vec<StateRule> = parse("state_compat", states_json)?;

        let triggers: Vec<EmergencyTrigger> = parse("emergency_triggers", triggers_json)?;
        for trigger in &triggers {
            for cas in trigger.a.cas.iter().chain(&trigger.b.cas) {
                validate_cas("emergency_triggers", cas)?;
            }
        }

        Ok(ReferenceData { chemicals, matrix, identifier_rules, state_rules, triggers })
    }

    /// Case-insensitive substring lookup against the known-chemical table,
    /// longest table name first.
    pub fn lookup_name(&self, name: &str) -> Option<&KnownChemical> {
        let lower = name.to_lowercase();
        self.chemicals.iter().find(|c| lower.contains(&c.name))
    }

    pub fn by_cas(&self, cas: &str) -> Option<&KnownChemical> {
        self.chemicals.iter().find(|c| c.cas == cas)
    }

    pub fn identifier_rule(&self, cas: &str) -> Option<&IdentifierRule> {
        self.identifier_rules.get(cas)
    }

    pub fn category_rule(&self, category: Category) -> Option<&CategoryRule> {
        self.matrix.get(&category)
    }

    /// State rule matching the pair in either order.
    pub fn state_rule(&self, a: PhysicalState, b: PhysicalState) -> Option<&StateRule> {
        self.state_rules.iter().find(|r| (r.a == a && r.b == b) || (r.a == b && r.b == a))
    }

    pub fn triggers(&self) -> &[EmergencyTrigger] {
        &self.triggers
    }
}

fn parse<T: DeserializeOwned>(table: &'static str, json: &str) -> Result<T, ConfigError> {
    serde_json::from_str(json).map_err(|source| ConfigError::Parse { table, source })
}

fn validate_cas(table: &'static str, cas: &str) -> Result<(), ConfigError> {
    if regex!(r"^\d{2,7}-\d{2}-\d$").is_match(cas) {
        Ok(())
    } else {
        Err(ConfigError::InvalidCas { table, cas: cas.to_string() })
    }
}
