use std::sync::LazyLock;

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{IntermediateRecord, SatTrial, SegmentRef};
use mentis_core::models::segment::ClassifiedSegment;
use regex::Regex;

use crate::InstrumentExtractor;
use crate::profile::{InstrumentProfile, keyword};

/// `Trial 7: 523 ms`: labeled trial row.
static LABELED_TRIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^trial\s*(\d{1,4})\s*[.:)]?\s+(\S+)(?:\s+(.*))?$").unwrap());

/// `7  523  x`: bare table row with index, time, optional error cell.
static BARE_TRIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})\s+(\S+)(?:\s+(.*))?$").unwrap());

/// Placeholder for a missing reaction time.
static MISSING_RT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:n/?a|-+|—|none)$").unwrap());

/// Error-column markers that flag a trial as incorrect.
static ERROR_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:x|✗|\*|yes|err(?:or)?|fail(?:ed)?|incorrect|1)$").unwrap());

static PROFILE: LazyLock<InstrumentProfile> = LazyLock::new(|| InstrumentProfile {
    kind: InstrumentKind::Sat,
    name: "Shifting Attention Test".to_string(),
    keywords: vec![
        keyword(r"(?i)shifting\s+attention\s+test"),
        keyword(r"\bSAT\b"),
    ],
    sections: Vec::new(),
    response_range: None,
    reaction_time_range_ms: Some((50.0, 10_000.0)),
});

/// SAT: variable-length trial tables with a reaction time per trial
/// and an optional error column. A trial whose time cannot be read is
/// kept with no time and counts as an error.
pub struct SatExtractor;

impl InstrumentExtractor for SatExtractor {
    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Sat
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
            let Some(caps) = LABELED_TRIAL_RE
                .captures(line)
                .or_else(|| BARE_TRIAL_RE.captures(line))
            else {
                continue;
            };
            let Ok(index) = caps[1].parse::<u32>() else {
                continue;
            };

            let reaction_time_ms = parse_reaction_time(&caps[2]);
            let error_cell = caps
                .get(3)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty());
            let marked_error = error_cell
                .and_then(|cell| cell.split_whitespace().next())
                .is_some_and(|word| ERROR_MARK_RE.is_match(word));

            records.push(IntermediateRecord::SatTrial(SatTrial {
                trial_index: index,
                reaction_time_ms,
                is_error: marked_error || reaction_time_ms.is_none(),
                origin,
            }));
        }

        records
    }
}

/// Parse a printed reaction time into milliseconds. Accepts bare
/// numbers, `ms` suffixes, and second suffixes (`0.52s`). Separator
/// commas are dropped.
fn parse_reaction_time(text: &str) -> Option<f64> {
    let trimmed = text
        .trim()
        .trim_end_matches(['.', ','])
        .replace(',', "")
        .to_lowercase();
    if trimmed.is_empty() || MISSING_RT_RE.is_match(&trimmed) {
        return None;
    }
    if let Some(number) = trimmed.strip_suffix("ms") {
        return number.trim().parse::<f64>().ok();
    }
    if let Some(number) = trimmed
        .strip_suffix("sec")
        .or_else(|| trimmed.strip_suffix('s'))
    {
        return number.trim().parse::<f64>().ok().map(|v| v * 1000.0);
    }
    trimmed.parse::<f64>().ok()
}
