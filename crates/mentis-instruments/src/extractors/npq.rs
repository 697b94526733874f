use std::sync::LazyLock;

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{IntermediateRecord, NpqDomainScore, NpqItem, SegmentRef};
use mentis_core::models::segment::ClassifiedSegment;
use regex::Regex;

use crate::InstrumentExtractor;
use crate::profile::{InstrumentProfile, ResponseRange, SectionSpec, codes, keyword};

/// `Q12: 3` or `12. Trouble concentrating 2 Moderate`.
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^q?\s*(\d{1,3})\s*[.:)]\s*(.*)$").unwrap());

/// `Attention 12 Moderate`: a domain summary has no leading number
/// and ends with a severity word.
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z][a-z /&'-]*?)\s+(\d{1,3})\s+(severe|moderate|mild|not a problem)\s*$")
        .unwrap()
});

const SEVERITY_WORDS: [&str; 3] = ["severe", "moderate", "mild"];

static PROFILE: LazyLock<InstrumentProfile> = LazyLock::new(|| InstrumentProfile {
    kind: InstrumentKind::Npq,
    name: "Neuropsych Questionnaire".to_string(),
    keywords: vec![
        keyword(r"(?i)neuropsych(?:ological)?\s+questionnaire"),
        keyword(r"\bNPQ\b"),
    ],
    sections: vec![SectionSpec {
        id: "items".to_string(),
        name: "Questions".to_string(),
        item_codes: codes("Q", 1, 45),
    }],
    response_range: Some(ResponseRange { min: 0, max: 3 }),
    reaction_time_range_ms: None,
});

/// NPQ: 45 numbered questions on a 0–3 severity scale, plus per-domain
/// summary rows with a score and severity word.
pub struct NpqExtractor;

impl InstrumentExtractor for NpqExtractor {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Npq
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

            if let Some(caps) = DOMAIN_RE.captures(line) {
                let Ok(score) = caps[2].parse::<i64>() else {
                    continue;
                };
                records.push(IntermediateRecord::NpqDomain(NpqDomainScore {
                    domain: caps[1].trim().to_string(),
                    score,
                    severity: Some(caps[3].to_string()),
                    origin,
                }));
                continue;
            }

            if let Some(caps) = ITEM_RE.captures(line) {
                let Ok(number) = caps[1].parse::<u32>() else {
                    continue;
                };
                let (question_text, response, severity) = split_item_tail(&caps[2]);
                let out_of_scale = response
                    .is_some_and(|v| PROFILE.response_range.is_some_and(|r| !r.contains(v)));
                records.push(IntermediateRecord::NpqItem(NpqItem {
                    question_number: number,
                    response,
                    out_of_scale,
                    question_text,
                    severity,
                    origin,
                }));
            }
        }

        records
    }
}

/// Split an item tail into question text, numeric response, and
/// trailing severity word. Handles `3`, `Trouble concentrating 2`, and
/// `Trouble concentrating 2 Moderate`. A tail without a trailing
/// number yields no response.
fn split_item_tail(rest: &str) -> (Option<String>, Option<i64>, Option<String>) {
    let mut words: Vec<&str> = rest.split_whitespace().collect();

    let severity = words
        .last()
        .filter(|w| SEVERITY_WORDS.contains(&w.to_lowercase().as_str()))
        .map(|w| w.to_string());
    if severity.is_some() {
        words.pop();
    }

    let response = words.last().and_then(|w| w.parse::<i64>().ok());
    if response.is_some() {
        words.pop();
    }

    let text = if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    };
    (text, response, severity)
}
