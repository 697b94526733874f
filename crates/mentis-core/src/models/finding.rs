use serde::{Deserialize, Serialize};

use super::segment::SegmentId;

/// Classes of recoverable problems the pipeline surfaces as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    LayoutAmbiguity,
    ClassificationAmbiguity,
    ExtractionFieldError,
    ValidationFailure,
    PageFailure,
    MissingSubjectId,
}

/// One recoverable problem, carried in the output instead of aborting
/// the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: IssueKind,
    pub page: Option<u32>,
    pub segment_id: Option<SegmentId>,
    pub detail: String,
}

impl Finding {
    pub fn new(kind: IssueKind, detail: impl Into<String>) -> Self {
        Finding {
            kind,
            page: None,
            segment_id: None,
            detail: detail.into(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn at_segment(mut self, id: SegmentId) -> Self {
        self.page = Some(id.page);
        self.segment_id = Some(id);
        self
    }
}
