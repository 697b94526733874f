use serde::{Deserialize, Serialize};

use super::instrument::InstrumentKind;
use super::record::Presence;
use super::segment::SegmentId;

/// Back-reference from an extracted value to the segment it came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentRef {
    pub segment_id: SegmentId,
    pub page: u32,
}

/// One NPQ question response. `response` is `None` when the printed
/// value did not parse as a number; `out_of_scale` marks a parsed value
/// outside the 0–3 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpqItem {
    pub question_number: u32,
    pub response: Option<i64>,
    pub out_of_scale: bool,
    pub question_text: Option<String>,
    pub severity: Option<String>,
    pub origin: SegmentRef,
}

/// One NPQ per-domain summary row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpqDomainScore {
    pub domain: String,
    pub score: i64,
    pub severity: Option<String>,
    pub origin: SegmentRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsmCategory {
    Inattention,
    HyperactivityImpulsivity,
    Unspecified,
}

impl DsmCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DsmCategory::Inattention => "inattention",
            DsmCategory::HyperactivityImpulsivity => "hyperactivity_impulsivity",
            DsmCategory::Unspecified => "unspecified",
        }
    }
}

/// One DSM criterion row with its checked state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsmCriterion {
    pub criterion_code: String,
    pub category: DsmCategory,
    pub present: Presence,
    pub notes: Option<String>,
    pub origin: SegmentRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsrsSection {
    PartA,
    PartB,
}

impl AsrsSection {
    pub fn letter(&self) -> &'static str {
        match self {
            AsrsSection::PartA => "A",
            AsrsSection::PartB => "B",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AsrsSection::PartA => "Part A",
            AsrsSection::PartB => "Part B",
        }
    }
}

/// One ASRS frequency response. `frequency` is `None` when the printed
/// response was neither a digit nor a known frequency word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrsItem {
    pub section: AsrsSection,
    pub item_number: u32,
    pub frequency: Option<i64>,
    pub response_text: Option<String>,
    pub origin: SegmentRef,
}

/// One SAT trial row. A non-numeric reaction time yields `None` and
/// marks the trial as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatTrial {
    pub trial_index: u32,
    pub reaction_time_ms: Option<f64>,
    pub is_error: bool,
    pub origin: SegmentRef,
}

/// Instrument-shaped value as produced by an extractor, before
/// normalization into the canonical schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntermediateRecord {
    NpqItem(NpqItem),
    NpqDomain(NpqDomainScore),
    DsmCriterion(DsmCriterion),
    AsrsItem(AsrsItem),
    SatTrial(SatTrial),
}

impl IntermediateRecord {
    pub fn instrument(&self) -> InstrumentKind {
        match self {
            IntermediateRecord::NpqItem(_) | IntermediateRecord::NpqDomain(_) => {
                InstrumentKind::Npq
            }
            IntermediateRecord::DsmCriterion(_) => InstrumentKind::Dsm,
            IntermediateRecord::AsrsItem(_) => InstrumentKind::Asrs,
            IntermediateRecord::SatTrial(_) => InstrumentKind::Sat,
        }
    }

    pub fn origin(&self) -> SegmentRef {
        match self {
            IntermediateRecord::NpqItem(r) => r.origin,
            IntermediateRecord::NpqDomain(r) => r.origin,
            IntermediateRecord::DsmCriterion(r) => r.origin,
            IntermediateRecord::AsrsItem(r) => r.origin,
            IntermediateRecord::SatTrial(r) => r.origin,
        }
    }
}
