use std::sync::LazyLock;

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{DsmCategory, DsmCriterion, IntermediateRecord, SegmentRef};
use mentis_core::models::record::Presence;
use mentis_core::models::segment::ClassifiedSegment;
use regex::Regex;

use crate::InstrumentExtractor;
use crate::profile::{InstrumentProfile, SectionSpec, codes, keyword};

/// `A1. …` / `H3: …`: criterion code with category letter.
static CODED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([AHah])\s*(\d)\s*[.:)]\s*(.*)$").unwrap());

/// `3. …`: bare-numbered criterion, category from context.
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d)\s*[.:)]\s*(.*)$").unwrap());

static INATTENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\binattention\b").unwrap());

static HYPERACTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhyperactiv|\bimpulsiv").unwrap());

static ABSENT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:not\s+met|no|absent|denied|unchecked)\b").unwrap());

static PRESENT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:met|yes|present|checked|endorsed)\b").unwrap());

static STATE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:criterion\s+)?(?:not\s+met|met|yes|no|present|absent|denied|unchecked|checked|endorsed)\b")
        .unwrap()
});

const PRESENT_GLYPHS: [&str; 8] = ["☒", "☑", "✓", "✔", "[x]", "[X]", "(x)", "(X)"];
const ABSENT_GLYPHS: [&str; 3] = ["☐", "[ ]", "[]"];

static PROFILE: LazyLock<InstrumentProfile> = LazyLock::new(|| InstrumentProfile {
    kind: InstrumentKind::Dsm,
    name: "DSM-5 Criteria".to_string(),
    keywords: vec![
        keyword(r"(?i)dsm[-\s]?5\s+criteria"),
        keyword(r"(?i)dsm\s+criteria"),
        keyword(r"\bDSM\b"),
    ],
    sections: vec![
        SectionSpec {
            id: "inattention".to_string(),
            name: "Inattention".to_string(),
            item_codes: codes("A", 1, 9),
        },
        SectionSpec {
            id: "hyperactivity_impulsivity".to_string(),
            name: "Hyperactivity / Impulsivity".to_string(),
            item_codes: codes("H", 1, 9),
        },
    ],
    response_range: None,
    reaction_time_range_ms: None,
});

/// DSM-5 ADHD criteria: nine inattention and nine hyperactivity /
/// impulsivity checklist rows. Criterion state comes from a checkbox
/// glyph or a met / not-met word; anything unreadable maps to
/// `Presence::Unknown` rather than a guess.
pub struct DsmExtractor;

impl InstrumentExtractor for DsmExtractor {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Dsm
    }

    fn profile(&self) -> &'static InstrumentProfile {
        &PROFILE
    }

    fn extract(&self, classified: &ClassifiedSegment) -> Vec<IntermediateRecord> {
        let origin = SegmentRef {
            segment_id: classified.segment.id,
            page: classified.segment.page,
        };
        let mut records = Vec::new();
        let mut category = DsmCategory::Unspecified;

        for line in &classified.segment.lines {
            let line = line.trim();

            if let Some(caps) = CODED_RE.captures(line) {
                let letter = caps[1].to_uppercase();
                let cat = if letter == "A" {
                    DsmCategory::Inattention
                } else {
                    DsmCategory::HyperactivityImpulsivity
                };
                let Ok(number) = caps[2].parse::<u8>() else {
                    continue;
                };
                records.push(criterion(format!("{letter}{number}"), cat, &caps[3], origin));
                category = cat;
                continue;
            }

            if let Some(caps) = NUMBERED_RE.captures(line) {
                let Ok(number) = caps[1].parse::<u8>() else {
                    continue;
                };
                let code = match category {
                    DsmCategory::Inattention => format!("A{number}"),
                    DsmCategory::HyperactivityImpulsivity => format!("H{number}"),
                    DsmCategory::Unspecified => number.to_string(),
                };
                records.push(criterion(code, category, &caps[2], origin));
                continue;
            }

            // A section header inside the block switches the running
            // category for bare-numbered rows that follow.
            if HYPERACTIVE_RE.is_match(line) {
                category = DsmCategory::HyperactivityImpulsivity;
            } else if INATTENTION_RE.is_match(line) {
                category = DsmCategory::Inattention;
            }
        }

        records
    }
}

fn criterion(
    code: String,
    category: DsmCategory,
    rest: &str,
    origin: SegmentRef,
) -> IntermediateRecord {
    IntermediateRecord::DsmCriterion(DsmCriterion {
        criterion_code: code,
        category,
        present: read_presence(rest),
        notes: strip_markers(rest),
        origin,
    })
}

/// Read the checked state from a criterion tail. Glyphs win over
/// words; `not met` is checked before `met`. No readable marker means
/// `Unknown`.
fn read_presence(text: &str) -> Presence {
    if ABSENT_GLYPHS.iter().any(|g| text.contains(g)) {
        return Presence::Absent;
    }
    if PRESENT_GLYPHS.iter().any(|g| text.contains(g)) {
        return Presence::Present;
    }
    if ABSENT_WORDS.is_match(text) {
        return Presence::Absent;
    }
    if PRESENT_WORDS.is_match(text) {
        return Presence::Present;
    }
    Presence::Unknown
}

/// Criterion description with state markers removed.
fn strip_markers(rest: &str) -> Option<String> {
    let mut text = rest.to_string();
    for glyph in PRESENT_GLYPHS.iter().chain(ABSENT_GLYPHS.iter()) {
        text = text.replace(glyph, " ");
    }
    let text = STATE_WORDS.replace_all(&text, " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
