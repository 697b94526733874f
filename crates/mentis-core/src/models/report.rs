use serde::{Deserialize, Serialize};

use super::instrument::InstrumentKind;

/// Aggregate verdict for one instrument batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Valid,
    PartiallyValid,
    Invalid,
}

impl BatchStatus {
    /// Severity rank, higher is worse.
    pub fn rank(&self) -> u8 {
        match self {
            BatchStatus::Valid => 0,
            BatchStatus::PartiallyValid => 1,
            BatchStatus::Invalid => 2,
        }
    }
}

/// An item code seen more than once, with every page it appeared on.
/// The first occurrence stays in the batch; later ones are marked
/// `Duplicate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateItem {
    pub item_code: String,
    pub pages: Vec<u32>,
}

/// A value that failed a range check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutOfRangeItem {
    pub item_code: String,
    pub page: u32,
    pub detail: String,
}

/// Completeness and consistency summary for one instrument batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub subject_id: String,
    pub instrument: InstrumentKind,
    /// `None` for instruments without a fixed item count.
    pub expected_count: Option<u32>,
    pub found_count: u32,
    /// Records outside the primary item scale, e.g. domain summaries.
    pub supplemental_count: u32,
    pub missing_items: Vec<String>,
    pub duplicate_items: Vec<DuplicateItem>,
    pub out_of_range: Vec<OutOfRangeItem>,
    pub unparsed_count: u32,
    pub status: BatchStatus,
}
