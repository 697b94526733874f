use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifying fields read from the report header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub subject_id: String,
    pub test_date: Option<jiff::civil::Date>,
    pub age: Option<u32>,
    pub language: Option<String>,
}

impl SubjectInfo {
    /// Placeholder identity for documents whose header carries no id.
    pub fn unidentified() -> Self {
        SubjectInfo {
            subject_id: format!("unknown-{}", Uuid::new_v4()),
            test_date: None,
            age: None,
            language: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.subject_id.starts_with("unknown-")
    }
}
