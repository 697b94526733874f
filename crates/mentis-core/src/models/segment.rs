use std::fmt;

use serde::{Deserialize, Serialize};

use super::instrument::InstrumentKind;
use super::token::BoundingBox;

/// Per-run identity of a segment. Deterministic: the same token stream
/// always yields the same ids, so repeated runs are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub page: u32,
    pub index: u32,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}s{}", self.page, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Header,
    Row,
    Table,
}

/// A visual unit recovered from the token stream: one heading, one
/// label/value row, or one multi-row table block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub page: u32,
    pub kind: SegmentKind,
    pub region: BoundingBox,
    pub lines: Vec<String>,
    pub token_count: usize,
    pub ambiguous: bool,
}

impl Segment {
    /// Full text of the segment, one layout line per output line.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// How the classifier arrived at an instrument assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    Keyword,
    Continuation,
    Unmatched,
}

/// A segment together with its instrument assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedSegment {
    pub segment: Segment,
    pub instrument: InstrumentKind,
    pub confidence: MatchConfidence,
}
