//! Typed field extraction cascades.
//!
//! The core contract is [`first_capture`]: given lines and an ordered pattern
//! list, try each pattern against each line in order and return the first
//! non-empty trimmed capture. Pattern order is the primary priority, line
//! order secondary. Everything else here is a specialization of that cascade
//! (temperatures with unit conversion, plain numerics, the physical-state
//! ladder) plus the per-field pattern sets.

use chrono::NaiveDate;
use regex::Regex;

use crate::extract::noise;
use crate::profile::{PhysicalState, Temperature};

/// Try each pattern against each line in order; return the first non-empty
/// capture group, trimmed. Deterministic and order-sensitive; `None` only
/// when every pattern/line combination fails.
pub(crate) fn first_capture<S: AsRef<str>>(lines: &[S], patterns: &[&Regex]) -> Option<String> {
    for re in patterns {
        for line in lines {
            if let Some(caps) = re.captures(line.as_ref()) {
                if let Some(m) = caps.get(1) {
                    let value = m.as_str().trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Like [`first_capture`], but candidates must also survive the noise filter.
/// A rejected candidate moves the cascade along instead of aborting.
pub(crate) fn first_plausible<S: AsRef<str>>(lines: &[S], patterns: &[&Regex]) -> Option<String> {
    for re in patterns {
        for line in lines {
            if let Some(caps) = re.captures(line.as_ref()) {
                if let Some(m) = caps.get(1) {
                    let value = m.as_str().trim();
                    if !value.is_empty() && noise::plausible_name(value) {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Parse a signed decimal followed by a unit marker (°C/°F or "degrees C/F")
/// out of `text`, converting so both scales are always populated.
pub(crate) fn parse_temperature(text: &str) -> Option<Temperature> {
    let caps = regex!(r"(?i)(-?\d+(?:\.\d+)?)\s*(?:°\s*([cf])|deg(?:ree)?s?\.?\s*([cf]))\b").captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let unit = caps.get(2).or_else(|| caps.get(3))?.as_str();
    let original = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();

    Some(if unit.eq_ignore_ascii_case("f") {
        Temperature::from_fahrenheit(value, original)
    } else {
        Temperature::from_celsius(value, original)
    })
}

/// Temperature cascade: the label patterns capture the value region of the
/// line, which must then parse as a temperature for the match to count.
pub(crate) fn temperature<S: AsRef<str>>(lines: &[S], patterns: &[&Regex]) -> Option<Temperature> {
    for re in patterns {
        for line in lines {
            if let Some(caps) = re.captures(line.as_ref()) {
                if let Some(t) = caps.get(1).and_then(|m| parse_temperature(m.as_str())) {
                    return Some(t);
                }
            }
        }
    }
    None
}

/// Numeric cascade: first captured region containing a plain decimal wins.
pub(crate) fn numeric<S: AsRef<str>>(lines: &[S], patterns: &[&Regex]) -> Option<f64> {
    for re in patterns {
        for line in lines {
            if let Some(caps) = re.captures(line.as_ref()) {
                if let Some(v) = caps
                    .get(1)
                    .and_then(|m| regex!(r"-?\d+(?:\.\d+)?").find(m.as_str()))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                {
                    return Some(v);
                }
            }
        }
    }
    None
}

/// How the physical state was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateReading {
    /// An explicit "state:" or "form:" field named it.
    Explicit(PhysicalState),
    /// Inferred from loose keywords in the lines.
    Inferred(PhysicalState),
    /// No cue at all; callers apply the liquid default and may flag it.
    Assumed,
}

/// Physical-state ladder: explicit state field, then form field, then keyword
/// inference, then the assumed default.
pub(crate) fn physical_state<S: AsRef<str>>(lines: &[S]) -> StateReading {
    let tiers: [&Regex; 3] = [
        regex!(r"(?i)(?:physical\s+)?state\s*[:\-]\s*(.+)"),
        regex!(r"(?i)(?:physical\s+)?form\s*[:\-]\s*(.+)"),
        regex!(r"(?i)appearance\s*[:\-]\s*(.+)"),
    ];
    // Each labeled field is its own tier: an unmappable value ("State: n/a")
    // falls through to the next tier rather than ending the ladder.
    for re in tiers {
        if let Some(region) = first_capture(lines, &[re]) {
            if let Some(state) = state_from_keywords(&region) {
                return StateReading::Explicit(state);
            }
        }
    }

    for line in lines {
        if let Some(state) = state_from_keywords(line.as_ref()) {
            return StateReading::Inferred(state);
        }
    }

    StateReading::Assumed
}

/// Keyword → state mapping, most specific first (aerosol before liquid:
/// aerosol products routinely say "liquefied gas" further down).
fn state_from_keywords(text: &str) -> Option<PhysicalState> {
    if regex!(r"(?i)\b(aerosol|spray)\b").is_match(text) {
        Some(PhysicalState::Aerosol)
    } else if regex!(r"(?i)\b(powder|crystal(?:line)?|solid|granule|granular|pellet|bead|flake)s?\b").is_match(text) {
        Some(PhysicalState::Solid)
    } else if regex!(r"(?i)\b(grease|paste|gel|semi-solid)\b").is_match(text) {
        Some(PhysicalState::SemiSolid)
    } else if regex!(r"(?i)\b(solution|liquid)\b").is_match(text) {
        Some(PhysicalState::Liquid)
    } else if regex!(r"(?i)\bgas(?:eous)?\b").is_match(text) {
        Some(PhysicalState::Gas)
    } else {
        None
    }
}

/// Unique uppercase H-codes in first-seen order.
pub(crate) fn hazard_statements<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut codes = Vec::new();
    for line in lines {
        for caps in regex!(r"\b([Hh][2-4]\d{2})\b").captures_iter(line.as_ref()) {
            let code = caps[1].to_uppercase();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

/// GHS classification phrases ("Flammable liquids, Category 2", ...).
pub(crate) fn ghs_classifications<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        for caps in regex!(r"(?i)([A-Za-z][A-Za-z ,/()-]*?,?\s*category\s*\d[A-C]?)").captures_iter(line.as_ref()) {
            let phrase = caps[1].trim().to_string();
            if !out.contains(&phrase) {
                out.push(phrase);
            }
        }
    }
    out
}

pub(crate) fn signal_word<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    first_capture(lines, cascade!(r"(?i)signal\s+word\s*[:\-]?\s*(danger|warning)\b"))
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => lower,
            }
        })
}

/// Normalize extracted revision dates to ISO `YYYY-MM-DD`; unparsable dates
/// are kept verbatim rather than dropped.
pub(crate) fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    const FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y", "%B %d, %Y", "%d %B %Y", "%b %d, %Y"];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

/// Normalize "UN 1090" / "un1090" to "UN1090".
pub(crate) fn normalize_un(raw: String) -> String {
    format!("UN{}", raw.trim_start_matches(['U', 'N', 'u', 'n', ' ']))
}

// --- Per-field pattern sets -------------------------------------------------

pub(crate) fn product_name_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)product\s+name\s*[:\-]\s*(.+)",
        r"(?i)trade\s+name\s*[:\-]\s*(.+)",
        r"(?i)product\s+identifier\s*[:\-]\s*(.+)",
        r"(?i)material\s+name\s*[:\-]\s*(.+)",
        r"(?i)^name\s*[:\-]\s*(.+)",
    )
}

pub(crate) fn manufacturer_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)manufacturer(?:\s+name)?\s*[:\-]\s*(.+)",
        r"(?i)supplier(?:\s+name)?\s*[:\-]\s*(.+)",
        r"(?i)company(?:\s+name)?\s*[:\-]\s*(.+)",
    )
}

pub(crate) fn product_code_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)product\s+(?:code|number|no\.?)\s*[:\-]\s*(\S+)",
        r"(?i)catalog(?:ue)?\s+(?:number|no\.?)\s*[:\-]\s*(\S+)",
        r"(?i)item\s+(?:number|no\.?)\s*[:\-]\s*(\S+)",
    )
}

pub(crate) fn revision_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)revision\s+date\s*[:\-]\s*(.+)",
        r"(?i)revision\s*[:\-]\s*(.+)",
        r"(?i)date\s+of\s+(?:issue|revision|preparation)\s*[:\-]\s*(.+)",
        r"(?i)issue\s+date\s*[:\-]\s*(.+)",
    )
}

pub(crate) fn flash_point_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)flash\s*point[^:]*[:\-]?\s*(.+)", r"(?i)flash\s*point\s+(.+)")
}

pub(crate) fn boiling_point_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)(?:initial\s+)?boiling\s+(?:point|range)[^:]*[:\-]?\s*(.+)",
        r"(?i)boiling\s+(?:point|range)\s+(.+)"
    )
}

pub(crate) fn melting_point_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)melting\s+(?:point|range)[^:]*[:\-]?\s*(.+)",
        r"(?i)freezing\s+point[^:]*[:\-]?\s*(.+)",
        r"(?i)melting\s+(?:point|range)\s+(.+)"
    )
}

pub(crate) fn ph_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)\bpH\s*(?:value)?\s*[:\-]?\s*(-?\d+(?:\.\d+)?(?:\s*[-–]\s*\d+(?:\.\d+)?)?)")
}

pub(crate) fn density_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)(?:relative\s+)?density\s*[:\-]\s*(.+)",
        r"(?i)specific\s+gravity\s*[:\-]\s*(.+)",
    )
}

pub(crate) fn vapor_pressure_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)vapou?r\s+pressure\s*[:\-]\s*(.+)")
}

pub(crate) fn un_number_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)\b(UN\s?\d{4})\b", r"(?i)UN(?:/NA)?\s+number\s*[:\-]\s*(\d{4})")
}

pub(crate) fn shipping_name_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)proper\s+shipping\s+name\s*[:\-]\s*(.+)", r"(?i)shipping\s+name\s*[:\-]\s*(.+)")
}

pub(crate) fn hazard_class_patterns() -> &'static [&'static Regex] {
    cascade!(
        r"(?i)(?:transport\s+)?hazard\s+class(?:\(es\))?\s*[:\-]\s*(\d[\d.]*)",
        r"(?i)\bclass\s*[:\-]\s*(\d[\d.]*)",
    )
}

pub(crate) fn packing_group_patterns() -> &'static [&'static Regex] {
    cascade!(r"(?i)packing\s+group\s*[:\-]\s*\b(III|II|I|IV)\b")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_order_is_primary_priority() {
        let lines = ["Trade Name: Secondary", "Product Name: Primary"];
        let got = first_capture(&lines, product_name_patterns());
        assert_eq!(got.as_deref(), Some("Primary"));
    }

    #[test]
    fn line_order_is_secondary_priority() {
        let lines = ["Product Name: First", "Product Name: Second"];
        let got = first_capture(&lines, product_name_patterns());
        assert_eq!(got.as_deref(), Some("First"));
    }

    #[test]
    fn no_match_returns_none() {
        let lines = ["nothing to see here"];
        assert_eq!(first_capture(&lines, product_name_patterns()), None);
    }

    #[test]
    fn fahrenheit_converts_to_celsius() {
        let t = parse_temperature("100°F").unwrap();
        assert_eq!(t.fahrenheit, 100.0);
        assert!((t.celsius - 37.8).abs() < 0.1);
        assert_eq!(t.original, "100°F");
    }

    #[test]
    fn celsius_converts_to_fahrenheit() {
        let t = parse_temperature("37.8°C").unwrap();
        assert_eq!(t.celsius, 37.8);
        assert!((t.fahrenheit - 100.0).abs() < 0.1);
    }

    #[test]
    fn degrees_spelling_and_negatives() {
        let t = parse_temperature("-20 degrees C").unwrap();
        assert_eq!(t.celsius, -20.0);
        assert_eq!(t.fahrenheit, -4.0);

        let t = parse_temperature("0 °F").unwrap();
        assert_eq!(t.celsius, -17.8);
    }

    #[test]
    fn temperature_cascade_reads_flash_point_line() {
        let lines = ["Flash Point: 12°C (closed cup)"];
        let t = temperature(&lines, flash_point_patterns()).unwrap();
        assert_eq!(t.celsius, 12.0);
    }

    #[test]
    fn colonless_point_lines_still_parse() {
        // Without a colon the greedy label pattern captures only the trailing
        // unit letter; the plain-label fallback must pick these up.
        let t = temperature(&["boiling point 111 degrees C"], boiling_point_patterns()).unwrap();
        assert_eq!(t.celsius, 111.0);

        let t = temperature(&["melting point -95°C"], melting_point_patterns()).unwrap();
        assert_eq!(t.celsius, -95.0);
    }

    #[test]
    fn numeric_reads_ph() {
        let lines = ["pH: 13.5"];
        assert_eq!(numeric(&lines, ph_patterns()), Some(13.5));
    }

    #[test]
    fn state_ladder_prefers_explicit_field() {
        let lines = ["Appearance: white powder", "Physical state: liquid"];
        // "state:" pattern outranks "appearance:" despite line order.
        assert_eq!(physical_state(&lines), StateReading::Explicit(PhysicalState::Liquid));
    }

    #[test]
    fn state_inferred_from_keywords() {
        let lines = ["Fine white powder, odorless"];
        assert_eq!(physical_state(&lines), StateReading::Inferred(PhysicalState::Solid));
    }

    #[test]
    fn aerosol_outranks_liquid_keywords() {
        let lines = ["Form: aerosol spray containing liquid propellant"];
        assert_eq!(physical_state(&lines), StateReading::Explicit(PhysicalState::Aerosol));
    }

    #[test]
    fn absent_state_is_assumed() {
        let lines = ["no cues whatsoever"];
        assert_eq!(physical_state(&lines), StateReading::Assumed);
    }

    #[test]
    fn hazard_codes_are_unique_uppercase_first_seen_order() {
        let lines = ["H225 h315", "H225 again, H319"];
        assert_eq!(hazard_statements(&lines), vec!["H225", "H315", "H319"]);
    }

    #[test]
    fn signal_word_is_normalized() {
        let lines = ["Signal word: DANGER"];
        assert_eq!(signal_word(&lines).as_deref(), Some("Danger"));
    }

    #[test]
    fn revision_dates_normalize_to_iso() {
        assert_eq!(normalize_date("05/14/2023"), "2023-05-14");
        assert_eq!(normalize_date("May 14, 2023"), "2023-05-14");
        assert_eq!(normalize_date("2023-05-14"), "2023-05-14");
        assert_eq!(normalize_date("Q2 2023"), "Q2 2023");
    }

    #[test]
    fn un_numbers_normalize() {
        assert_eq!(normalize_un("UN 1090".to_string()), "UN1090");
        assert_eq!(normalize_un("1090".to_string()), "UN1090");
    }
}
