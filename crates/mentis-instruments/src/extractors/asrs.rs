use std::sync::LazyLock;

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{AsrsItem, AsrsSection, IntermediateRecord, SegmentRef};
use mentis_core::models::segment::ClassifiedSegment;
use regex::Regex;

use crate::InstrumentExtractor;
use crate::profile::{InstrumentProfile, ResponseRange, SectionSpec, codes, keyword};

/// `3. …` or `B7: …`: item number with optional part letter.
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:([ab])\s*)?(\d{1,2})\s*[.:)]\s*(.*)$").unwrap());

/// Trailing frequency word, e.g. `… Very Often`.
static FREQ_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(very\s+often|often|sometimes|rarely|never)\s*$").unwrap());

/// Trailing numeric response, e.g. `… 3`.
static FREQ_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*$").unwrap());

/// Part A screens six items; Part B covers the remaining twelve.
const PART_A_ITEMS: u32 = 6;

static PROFILE: LazyLock<InstrumentProfile> = LazyLock::new(|| InstrumentProfile {
    kind: InstrumentKind::Asrs,
    name: "Adult ADHD Self-Report Scale".to_string(),
    keywords: vec![
        keyword(r"(?i)adult\s+adhd\s+self[-\s]report\s+scale"),
        keyword(r"(?i)self[-\s]report\s+scale"),
        keyword(r"\bASRS\b"),
    ],
    sections: vec![
        SectionSpec {
            id: "part_a".to_string(),
            name: "Part A".to_string(),
            item_codes: codes("A", 1, 6),
        },
        SectionSpec {
            id: "part_b".to_string(),
            name: "Part B".to_string(),
            item_codes: codes("B", 7, 18),
        },
    ],
    response_range: Some(ResponseRange { min: 0, max: 4 }),
    reaction_time_range_ms: None,
});

/// ASRS v1.1: eighteen frequency items numbered 1–18, split into Part
/// A (1–6) and Part B (7–18). Responses are digits 0–4 or frequency
/// words from never to very often.
pub struct AsrsExtractor;

impl InstrumentExtractor for AsrsExtractor {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Asrs
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

        for line in &classified.segment.lines {
            let line = line.trim();
            let Some(caps) = ITEM_RE.captures(line) else {
                continue;
            };
            let Ok(number) = caps[2].parse::<u32>() else {
                continue;
            };

            let section = match caps.get(1).map(|m| m.as_str().to_uppercase()) {
                Some(letter) if letter == "A" => AsrsSection::PartA,
                Some(_) => AsrsSection::PartB,
                None if number <= PART_A_ITEMS => AsrsSection::PartA,
                None => AsrsSection::PartB,
            };

            let (frequency, response_text) = read_response(&caps[3]);
            records.push(IntermediateRecord::AsrsItem(AsrsItem {
                section,
                item_number: number,
                frequency,
                response_text,
                origin,
            }));
        }

        records
    }
}

/// Read the frequency from an item tail: a trailing digit, or a
/// trailing frequency word mapped onto the 0–4 scale. Anything else
/// yields no frequency.
fn read_response(rest: &str) -> (Option<i64>, Option<String>) {
    if let Some(caps) = FREQ_DIGIT_RE.captures(rest)
        && let Ok(value) = caps[1].parse::<i64>()
    {
        return (Some(value), None);
    }

    if let Some(caps) = FREQ_WORD_RE.captures(rest) {
        let word = caps[1].to_string();
        return (frequency_value(&word), Some(word));
    }

    (None, None)
}

fn frequency_value(word: &str) -> Option<i64> {
    let normalized = word.to_lowercase();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.as_str() {
        "never" => Some(0),
        "rarely" => Some(1),
        "sometimes" => Some(2),
        "often" => Some(3),
        "very often" => Some(4),
        _ => None,
    }
}
