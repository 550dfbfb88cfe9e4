//! Constituent extraction.
//!
//! Composition is the single most safety-relevant field and the worst
//! formatted one in the wild, so extraction degrades gracefully through three
//! tiers of decreasing reliability. Each tier runs only when the previous one
//! produced nothing:
//!
//! 1. CAS-anchored parsing of the composition section lines;
//! 2. product-name lookup against the common industrial chemical table;
//! 3. a document-wide CAS sweep with best-effort name recovery.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::noise;
use crate::profile::{Constituent, SectionMap};

pub(crate) const UNKNOWN_COMPONENT: &str = "Unknown Component";

pub(crate) fn cas_pattern() -> &'static Regex {
    regex!(r"\b(\d{2,7}-\d{2}-\d)\b")
}

/// Common industrial chemicals by lowercase name, longest name first so that
/// specific names win over their substrings ("methyl ethyl ketone" before
/// any later "ketone"-bearing entry, "diethyl ether" before "ether").
static COMMON_CHEMICALS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut table = vec![
        ("acetone", "67-64-1"),
        ("methanol", "67-56-1"),
        ("ethanol", "64-17-5"),
        ("isopropyl alcohol", "67-63-0"),
        ("isopropanol", "67-63-0"),
        ("toluene", "108-88-3"),
        ("xylene", "1330-20-7"),
        ("methyl ethyl ketone", "78-93-3"),
        ("methyl isobutyl ketone", "108-10-1"),
        ("acetonitrile", "75-05-8"),
        ("hexane", "110-54-3"),
        ("heptane", "142-82-5"),
        ("benzene", "71-43-2"),
        ("chloroform", "67-66-3"),
        ("methylene chloride", "75-09-2"),
        ("dichloromethane", "75-09-2"),
        ("tetrachloroethylene", "127-18-4"),
        ("perchloroethylene", "127-18-4"),
        ("trichloroethylene", "79-01-6"),
        ("carbon tetrachloride", "56-23-5"),
        ("ethyl acetate", "141-78-6"),
        ("butyl acetate", "123-86-4"),
        ("tetrahydrofuran", "109-99-9"),
        ("dimethyl sulfoxide", "67-68-5"),
        ("dimethylformamide", "68-12-2"),
        ("formaldehyde", "50-00-0"),
        ("formic acid", "64-18-6"),
        ("acetic acid", "64-19-7"),
        ("hydrochloric acid", "7647-01-0"),
        ("sulfuric acid", "7664-93-9"),
        ("nitric acid", "7697-37-2"),
        ("phosphoric acid", "7664-38-2"),
        ("sodium hydroxide", "1310-73-2"),
        ("potassium hydroxide", "1310-58-3"),
        ("ammonium hydroxide", "1336-21-6"),
        ("ammonia", "7664-41-7"),
        ("hydrogen peroxide", "7722-84-1"),
        ("sodium hypochlorite", "7681-52-9"),
        ("calcium hypochlorite", "7778-54-3"),
        ("potassium permanganate", "7722-64-7"),
        ("ethylene glycol", "107-21-1"),
        ("propylene glycol", "57-55-6"),
        ("glycerol", "56-81-5"),
        ("mineral spirits", "64475-85-0"),
        ("naphtha", "8030-30-6"),
        ("kerosene", "8008-20-6"),
        ("diesel fuel", "68334-30-5"),
        ("gasoline", "86290-81-5"),
        ("mineral oil", "8042-47-5"),
        ("styrene", "100-42-5"),
        ("phenol", "108-95-2"),
        ("aniline", "62-53-3"),
        ("pyridine", "110-86-1"),
        ("cyclohexane", "110-82-7"),
        ("cyclohexanone", "108-94-1"),
        ("n-butanol", "71-36-3"),
        ("butanol", "71-36-3"),
        ("diethyl ether", "60-29-7"),
        ("ethyl ether", "60-29-7"),
        ("acetaldehyde", "75-07-0"),
        ("morpholine", "110-91-8"),
        ("turpentine", "8006-64-2"),
        ("sodium bicarbonate", "144-55-8"),
    ];
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// Extract constituents. `doc_lines` is the whole document (tier 3),
/// `sections` supplies the composition section (tier 1), and `product_name`
/// feeds tiers 2 and 3.
pub(crate) fn extract(doc_lines: &[&str], sections: &SectionMap, product_name: Option<&str>) -> Vec<Constituent> {
    let tiers: [(&str, fn(&[&str], &SectionMap, Option<&str>) -> Vec<Constituent>); 3] =
        [("cas-anchor", tier_cas_anchor), ("name-lookup", tier_name_lookup), ("doc-sweep", tier_doc_sweep)];

    for (tag, tier) in tiers {
        let found = tier(doc_lines, sections, product_name);
        if !found.is_empty() {
            if crate::debug_enabled() {
                eprintln!("[chemsift] composition: tier {tag} produced {} constituent(s)", found.len());
            }
            return found;
        }
    }
    Vec::new()
}

/// Tier 1: scan composition-section lines for CAS identifiers; the text
/// before the identifier yields the name, the text after it the percentage.
fn tier_cas_anchor(_doc: &[&str], sections: &SectionMap, _product_name: Option<&str>) -> Vec<Constituent> {
    let Some(lines) = sections.section(3) else {
        return Vec::new();
    };

    let mut out: Vec<Constituent> = Vec::new();
    for line in lines {
        let Some(m) = cas_pattern().captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        let cas = m.as_str().to_string();
        if out.iter().any(|c| c.cas.as_deref() == Some(cas.as_str())) {
            continue;
        }

        let name = trailing_name(&line[..m.start()]).unwrap_or_else(|| UNKNOWN_COMPONENT.to_string());
        let percentage = percentage_after(&line[m.end()..]);
        out.push(Constituent { name, cas: Some(cas), percentage });
    }
    out
}

/// Tier 2: the product name itself may be a known chemical; emit it as a
/// single constituent at 100%.
fn tier_name_lookup(_doc: &[&str], _sections: &SectionMap, product_name: Option<&str>) -> Vec<Constituent> {
    let Some(name) = product_name else {
        return Vec::new();
    };
    let lower = name.to_lowercase();
    for (chem, cas) in COMMON_CHEMICALS.iter() {
        if lower.contains(chem) {
            return vec![Constituent {
                name: (*chem).to_string(),
                cas: Some((*cas).to_string()),
                percentage: Some("100%".to_string()),
            }];
        }
    }
    Vec::new()
}

/// Tier 3: sweep the entire document for CAS identifiers and recover a name
/// from label patterns, the preceding text, or the product name.
fn tier_doc_sweep(doc: &[&str], _sections: &SectionMap, product_name: Option<&str>) -> Vec<Constituent> {
    let mut out: Vec<Constituent> = Vec::new();
    for line in doc {
        for m in cas_pattern().find_iter(line) {
            let cas = m.as_str().to_string();
            if out.iter().any(|c| c.cas.as_deref() == Some(cas.as_str())) {
                continue;
            }

            let name = labeled_name(line)
                .or_else(|| trailing_name(&line[..m.start()]))
                .or_else(|| product_name.map(|n| n.to_string()))
                .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string());
            out.push(Constituent { name, cas: Some(cas), percentage: Some("100%".to_string()) });
        }
    }
    out
}

/// Recover a name from the trailing word sequence of the text before a CAS
/// identifier. Must survive the noise filter.
fn trailing_name(prefix: &str) -> Option<String> {
    let caps = regex!(r"([A-Za-z][A-Za-z0-9 ,()'\-]*[A-Za-z)])[\s:,;]*$").captures(prefix.trim_end())?;
    clean_name(&caps[1])
}

/// Trim a candidate and drop a trailing "CAS"/"CAS No." label; the label sits
/// between the name and the identifier on most tabular lines.
fn clean_name(raw: &str) -> Option<String> {
    let stripped = regex!(r"(?i)[\s,;]*\bCAS\s*(?:no\.?|number|#)?\s*[:\-]?\s*$").replace(raw.trim(), "");
    let name = stripped.trim().to_string();
    if noise::plausible_name(&name) { Some(name) } else { None }
}

/// "Name:" / "Chemical:" style label patterns for tier 3.
fn labeled_name(line: &str) -> Option<String> {
    let patterns = [
        regex!(r"(?i)chemical\s+name\s*[:\-]\s*([A-Za-z][A-Za-z0-9 ,()'\-]+)"),
        regex!(r"(?i)\bname\s*[:\-]\s*([A-Za-z][A-Za-z0-9 ,()'\-]+)"),
        regex!(r"(?i)\bchemical\s*[:\-]\s*([A-Za-z][A-Za-z0-9 ,()'\-]+)"),
        regex!(r"(?i)\bsubstance\s*[:\-]\s*([A-Za-z][A-Za-z0-9 ,()'\-]+)"),
    ];
    for re in patterns {
        if let Some(caps) = re.captures(line) {
            if let Some(name) = clean_name(&caps[1]) {
                return Some(name);
            }
        }
    }
    None
}

/// Percentage or percentage range following a CAS identifier.
fn percentage_after(suffix: &str) -> Option<String> {
    let caps = regex!(r"(<|>|<=|>=)?\s*(\d+(?:\.\d+)?(?:\s*[-–]\s*\d+(?:\.\d+)?)?)\s*%").captures(suffix)?;
    let bound = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    Some(format!("{}{}%", bound, caps[2].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SectionLabel;

    fn sections_with(lines: &[&str]) -> SectionMap {
        let mut map = SectionMap::default();
        map.insert(SectionLabel::Numbered(3), lines.iter().map(|s| s.to_string()).collect());
        map
    }

    #[test]
    fn tier1_parses_name_cas_percentage() {
        let sections = sections_with(&["3. Composition", "Acetone 67-64-1 60 - 100%", "Water 7732-18-5 <40%"]);
        let got = extract(&[], &sections, None);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], Constituent {
            name: "Acetone".into(),
            cas: Some("67-64-1".into()),
            percentage: Some("60 - 100%".into()),
        });
        assert_eq!(got[1].cas.as_deref(), Some("7732-18-5"));
        assert_eq!(got[1].percentage.as_deref(), Some("<40%"));
    }

    #[test]
    fn tier1_unknown_component_when_no_name_survives() {
        let sections = sections_with(&["--- 64-17-5 95%"]);
        let got = extract(&[], &sections, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, UNKNOWN_COMPONENT);
        assert_eq!(got[0].cas.as_deref(), Some("64-17-5"));
    }

    #[test]
    fn tier2_xylene_product_name_fallback() {
        let sections = SectionMap::default();
        let got = extract(&["no cas numbers here"], &sections, Some("Xylene (mixed isomers)"));
        assert_eq!(got, vec![Constituent {
            name: "xylene".into(),
            cas: Some("1330-20-7".into()),
            percentage: Some("100%".into()),
        }]);
    }

    #[test]
    fn tier2_prefers_longest_name() {
        let got = tier_name_lookup(&[], &SectionMap::default(), Some("Methyl Ethyl Ketone Technical"));
        assert_eq!(got[0].cas.as_deref(), Some("78-93-3"));
    }

    #[test]
    fn tier3_document_sweep_recovers_labeled_names() {
        let doc = ["intro line", "Chemical Name: Ethylbenzene  CAS 100-41-4", "footer"];
        let got = extract(&doc, &SectionMap::default(), None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "Ethylbenzene");
        assert_eq!(got[0].cas.as_deref(), Some("100-41-4"));
        assert_eq!(got[0].percentage.as_deref(), Some("100%"));
    }

    #[test]
    fn tier3_falls_back_to_product_name_then_placeholder() {
        let doc = ["7664-93-9"];
        let got = extract(&doc, &SectionMap::default(), Some("Battery Acid"));
        assert_eq!(got[0].name, "Battery Acid");

        let got = extract(&doc, &SectionMap::default(), None);
        assert_eq!(got[0].name, UNKNOWN_COMPONENT);
    }

    #[test]
    fn tiers_do_not_mix() {
        // Tier 1 finds a CAS, so the product name must not add a constituent.
        let sections = sections_with(&["Toluene 108-88-3 100%"]);
        let got = extract(&["Toluene 108-88-3 100%"], &sections, Some("Acetone"));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].cas.as_deref(), Some("108-88-3"));
    }

    #[test]
    fn duplicate_cas_is_collapsed() {
        let doc = ["64-17-5 here", "64-17-5 again"];
        let got = extract(&doc, &SectionMap::default(), None);
        assert_eq!(got.len(), 1);
    }
}
