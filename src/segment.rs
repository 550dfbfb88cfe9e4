//! Section segmentation.
//!
//! Splits raw document text into an insertion-ordered map of GHS section
//! number → lines. Detection is a per-line, first-match-wins cascade:
//!
//! ```text
//! line ── "Section N" header ──────────┐
//!      ── leading "N<punct>" ──────────┼── opens section N (N in 1..=16)
//!      ── known GHS title keyword ─────┘
//!      ── otherwise ── appended to the open section,
//!                      or to the "general" bucket if none is open yet
//! ```
//!
//! Malformed documents (fewer than 3 numbered sections detected) get a second
//! chance: a keyword-window pass synthesizes "artificial" sections for the
//! extraction-critical sections {1, 2, 3, 9}. A [`SectionSignals`] pre-scan
//! gates that pass so sections with no keyword trace anywhere are skipped.

use bitflags::bitflags;

use crate::profile::{SectionLabel, SectionMap};

bitflags! {
    /// Coarse signals from a document pre-scan: which extraction-critical
    /// sections leave any keyword trace at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct SectionSignals: u8 {
        const IDENTIFICATION = 1 << 0;
        const HAZARDS = 1 << 1;
        const COMPOSITION = 1 << 2;
        const PROPERTIES = 1 << 3;
    }
}

/// Ordered GHS title keyword table. Checked top to bottom, so specific titles
/// shadow shorter ones (section 1's bare "identification" is deliberately
/// last: it is a substring of section 2's title).
const TITLE_KEYWORDS: &[(&str, u8)] = &[
    ("hazards identification", 2),
    ("hazard identification", 2),
    ("hazard(s) identification", 2),
    ("composition", 3),
    ("information on ingredients", 3),
    ("first aid", 4),
    ("first-aid", 4),
    ("fire fighting", 5),
    ("fire-fighting", 5),
    ("firefighting measures", 5),
    ("accidental release", 6),
    ("handling and storage", 7),
    ("exposure controls", 8),
    ("personal protection", 8),
    ("physical and chemical properties", 9),
    ("stability and reactivity", 10),
    ("toxicological information", 11),
    ("ecological information", 12),
    ("disposal considerations", 13),
    ("transport information", 14),
    ("regulatory information", 15),
    ("other information", 16),
    ("identification of the substance", 1),
    ("product identifier", 1),
    ("identification", 1),
];

/// Signature keywords for the artificial-section fallback, per target section.
const ARTIFICIAL_SECTIONS: &[(u8, SectionSignals, &[&str])] = &[
    (1, SectionSignals::IDENTIFICATION, &["product name", "trade name", "manufacturer", "supplier"]),
    (2, SectionSignals::HAZARDS, &["signal word", "hazard statement", "ghs", "danger", "warning"]),
    (3, SectionSignals::COMPOSITION, &["cas", "ingredient", "concentration", "mixture"]),
    (9, SectionSignals::PROPERTIES, &["flash point", "boiling point", "melting point", "vapor pressure", "density"]),
];

/// Cap on lines pulled into one artificial section.
const ARTIFICIAL_WINDOW: usize = 20;

/// Minimum numbered sections for a document to count as well-formed.
const MIN_DETECTED_SECTIONS: usize = 3;

/// Title keywords only flip the section cursor on heading-like lines; body
/// sentences routinely mention other sections' titles.
const MAX_HEADING_LEN: usize = 60;

/// Segment `text` into sections. Every non-blank line lands in exactly one
/// bucket; lines before the first recognizable header go to "general".
pub fn segment(text: &str) -> SectionMap {
    let mut map = SectionMap::default();
    let mut open: Option<u8> = None;
    let mut buf: Vec<String> = Vec::new();
    let mut general: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        match detect_heading(line) {
            Some(n) => {
                if let Some(prev) = open.take() {
                    map.insert(SectionLabel::Numbered(prev), std::mem::take(&mut buf));
                } else if !general.is_empty() {
                    // General lines always precede the first section.
                    map.insert(SectionLabel::General, std::mem::take(&mut general));
                }
                if crate::debug_enabled() {
                    eprintln!("[chemsift] segment: section {n} opened by {line:?}");
                }
                open = Some(n);
                buf.push(line.to_string());
            }
            None => {
                if open.is_some() {
                    buf.push(line.to_string());
                } else {
                    general.push(line.to_string());
                }
            }
        }
    }

    if let Some(prev) = open {
        map.insert(SectionLabel::Numbered(prev), buf);
    } else if !general.is_empty() {
        map.insert(SectionLabel::General, general);
    }

    if map.numbered_count() < MIN_DETECTED_SECTIONS {
        synthesize_sections(text, &mut map);
    }

    map
}

/// First-match-wins heading detection. Returns the section number a line
/// opens, or `None` for body lines.
fn detect_heading(line: &str) -> Option<u8> {
    // 1. Explicit "Section N" header.
    if let Some(caps) = regex!(r"(?i)^\s*section\s+(\d{1,2})\b").captures(line) {
        if let Some(n) = parse_section_number(&caps[1]) {
            return Some(n);
        }
    }

    // 2. Leading "N<punct>". The trailing class rejects decimals ("0.5%")
    //    and CAS-like digit runs.
    if let Some(caps) = regex!(r"^\s*(\d{1,2})\s*[.):](?:\s|$|[A-Za-z])").captures(line) {
        if let Some(n) = parse_section_number(&caps[1]) {
            return Some(n);
        }
    }

    // 3. Keyword membership against the GHS title table.
    let trimmed = line.trim();
    if trimmed.len() <= MAX_HEADING_LEN {
        let lower = trimmed.to_lowercase();
        for (keyword, n) in TITLE_KEYWORDS {
            if lower.contains(keyword) {
                return Some(*n);
            }
        }
    }

    None
}

fn parse_section_number(digits: &str) -> Option<u8> {
    match digits.parse::<u8>() {
        Ok(n) if (1..=16).contains(&n) => Some(n),
        _ => None,
    }
}

/// Scan the whole document for section keyword traces.
fn scan_signals(text: &str) -> SectionSignals {
    let lower = text.to_lowercase();
    let mut signals = SectionSignals::empty();
    for (_, flag, keywords) in ARTIFICIAL_SECTIONS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            signals |= *flag;
        }
    }
    signals
}

/// Keyword-window fallback for malformed documents: for each of sections
/// {1,2,3,9}, find the first line carrying a signature keyword and greedily
/// take subsequent non-empty lines (up to a fixed cap, or until a blank line
/// ends the run). Artificial sections never overwrite detected ones.
fn synthesize_sections(text: &str, map: &mut SectionMap) {
    let signals = scan_signals(text);
    let lines: Vec<&str> = text.lines().collect();

    for (n, flag, keywords) in ARTIFICIAL_SECTIONS {
        if map.contains(SectionLabel::Numbered(*n)) || !signals.contains(*flag) {
            continue;
        }

        let Some(start) = lines.iter().position(|l| {
            let lower = l.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        }) else {
            continue;
        };

        let mut window = Vec::new();
        for line in &lines[start..] {
            let line = line.trim_end();
            if line.trim().is_empty() {
                break;
            }
            window.push(line.to_string());
            if window.len() >= ARTIFICIAL_WINDOW {
                break;
            }
        }

        if !window.is_empty() {
            if crate::debug_enabled() {
                eprintln!("[chemsift] segment: synthesized section {n} ({} lines)", window.len());
            }
            map.insert(SectionLabel::Numbered(*n), window);
        }
    }
}
