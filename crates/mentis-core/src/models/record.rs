use serde::{Deserialize, Serialize};

use super::instrument::InstrumentKind;
use super::segment::SegmentId;

/// Ternary state for checklist-style items. `Unknown` marks a glyph or
/// word the extractor could not read as either checked or unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
    Unknown,
}

/// Typed payload of a canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CanonicalValue {
    Integer(i64),
    Real(f64),
    Presence(Presence),
    Missing,
}

/// Which scale the value lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    SeverityScale,
    FrequencyScale,
    Criterion,
    Milliseconds,
    DomainScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordValidity {
    Valid,
    OutOfRange,
    Unparsed,
    Duplicate,
}

/// Context preserved from extraction, per record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_trial: Option<bool>,
}

/// One observation in the shared schema. Every record traces back to
/// exactly one segment via `segment_id`; `source_page` is that
/// segment's page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub subject_id: String,
    pub instrument: InstrumentKind,
    pub item_code: String,
    pub value: CanonicalValue,
    pub scale: ScaleKind,
    pub source_page: u32,
    pub segment_id: SegmentId,
    pub validity: RecordValidity,
    #[serde(default)]
    pub metadata: RecordMetadata,
}
