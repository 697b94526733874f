use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::finding::Finding;
use super::record::{CanonicalRecord, RecordValidity};
use super::report::{BatchStatus, ValidationReport};
use super::subject::SubjectInfo;

/// Everything one document run produced, handed to sinks as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub batch_id: Uuid,
    pub subject: SubjectInfo,
    pub records: Vec<CanonicalRecord>,
    pub reports: Vec<ValidationReport>,
    pub findings: Vec<Finding>,
    pub created_at: jiff::Timestamp,
}

impl DocumentBatch {
    /// Records whose validity is anything other than `Valid`.
    pub fn flagged_records(&self) -> Vec<&CanonicalRecord> {
        self.records
            .iter()
            .filter(|r| r.validity != RecordValidity::Valid)
            .collect()
    }

    /// Worst status across all instrument reports. An empty batch is
    /// `Valid`.
    pub fn overall_status(&self) -> BatchStatus {
        self.reports
            .iter()
            .map(|r| r.status)
            .max_by_key(BatchStatus::rank)
            .unwrap_or(BatchStatus::Valid)
    }
}
