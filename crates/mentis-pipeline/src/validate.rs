//! Per-instrument batch validation.
//!
//! Each instrument batch runs through a small state machine: built
//! pending, checked exactly once, settled on a final status. Checks
//! mark records in place under the keep-first duplicate policy and the
//! report carries enough context to locate every problem on the page
//! it came from.

use std::collections::{HashMap, HashSet};

use mentis_core::models::finding::{Finding, IssueKind};
use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::record::{CanonicalRecord, CanonicalValue, RecordValidity, ScaleKind};
use mentis_core::models::report::{BatchStatus, DuplicateItem, OutOfRangeItem, ValidationReport};
use mentis_instruments::profile::ResponseRange;
use mentis_instruments::profile_for;
use tracing::debug;

/// Batch order is fixed so report order is stable across runs. The
/// second element is the scale carrying the instrument's primary
/// items; anything else counts as supplemental.
const BATCHES: [(InstrumentKind, ScaleKind); 4] = [
    (InstrumentKind::Npq, ScaleKind::SeverityScale),
    (InstrumentKind::Dsm, ScaleKind::Criterion),
    (InstrumentKind::Asrs, ScaleKind::FrequencyScale),
    (InstrumentKind::Sat, ScaleKind::Milliseconds),
];

/// Printed domain summaries score on a 0-100 scale.
const DOMAIN_SCORE_RANGE: ResponseRange = ResponseRange { min: 0, max: 100 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Pending,
    Checked(BatchStatus),
}

/// Validation state for one instrument batch.
pub struct BatchValidator {
    kind: InstrumentKind,
    primary: ScaleKind,
    state: BatchState,
}

impl BatchValidator {
    pub fn new(kind: InstrumentKind, primary: ScaleKind) -> Self {
        BatchValidator {
            kind,
            primary,
            state: BatchState::Pending,
        }
    }

    /// Settled status, `None` while the batch is still pending.
    pub fn status(&self) -> Option<BatchStatus> {
        match self.state {
            BatchState::Pending => None,
            BatchState::Checked(status) => Some(status),
        }
    }

    /// Run every check over this instrument's records and settle the
    /// batch status. `expected_here` says whether the classifier saw
    /// segments for this instrument; with it set, an empty batch is
    /// invalid rather than simply absent.
    pub fn check(
        &mut self,
        subject_id: &str,
        records: &mut [CanonicalRecord],
        expected_here: bool,
    ) -> ValidationReport {
        let profile = profile_for(self.kind);
        let indices: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.instrument == self.kind)
            .map(|(i, _)| i)
            .collect();

        // Keep-first duplicate policy: the first occurrence keeps its
        // validity, later ones are marked, and the report lists every
        // page the code appeared on.
        let mut pages_by_code: HashMap<String, Vec<u32>> = HashMap::new();
        let mut code_order: Vec<String> = Vec::new();
        for &idx in &indices {
            let record = &mut records[idx];
            if !pages_by_code.contains_key(&record.item_code) {
                code_order.push(record.item_code.clone());
            }
            let pages = pages_by_code.entry(record.item_code.clone()).or_default();
            if !pages.is_empty() {
                record.validity = RecordValidity::Duplicate;
            }
            pages.push(record.source_page);
        }
        let duplicate_items: Vec<DuplicateItem> = code_order
            .iter()
            .filter(|code| pages_by_code[*code].len() > 1)
            .map(|code| DuplicateItem {
                item_code: code.clone(),
                pages: pages_by_code[code].clone(),
            })
            .collect();

        let mut out_of_range: Vec<OutOfRangeItem> = Vec::new();
        for &idx in &indices {
            let record = &mut records[idx];
            if record.validity == RecordValidity::Duplicate {
                continue;
            }
            match record.value {
                CanonicalValue::Integer(v)
                    if matches!(
                        record.scale,
                        ScaleKind::SeverityScale | ScaleKind::FrequencyScale
                    ) =>
                {
                    if let Some(range) = profile.and_then(|p| p.response_range)
                        && !range.contains(v)
                    {
                        record.validity = RecordValidity::OutOfRange;
                        out_of_range.push(OutOfRangeItem {
                            item_code: record.item_code.clone(),
                            page: record.source_page,
                            detail: format!("response {v} outside {}..={}", range.min, range.max),
                        });
                    }
                }
                CanonicalValue::Integer(v) if record.scale == ScaleKind::DomainScore => {
                    if !DOMAIN_SCORE_RANGE.contains(v) {
                        record.validity = RecordValidity::OutOfRange;
                        out_of_range.push(OutOfRangeItem {
                            item_code: record.item_code.clone(),
                            page: record.source_page,
                            detail: format!(
                                "domain score {v} outside {}..={}",
                                DOMAIN_SCORE_RANGE.min, DOMAIN_SCORE_RANGE.max
                            ),
                        });
                    }
                }
                CanonicalValue::Real(v) if record.scale == ScaleKind::Milliseconds => {
                    if let Some((min, max)) = profile.and_then(|p| p.reaction_time_range_ms)
                        && !(min..=max).contains(&v)
                    {
                        record.validity = RecordValidity::OutOfRange;
                        out_of_range.push(OutOfRangeItem {
                            item_code: record.item_code.clone(),
                            page: record.source_page,
                            detail: format!("reaction time {v}ms outside {min}..{max}ms"),
                        });
                    }
                }
                _ => {}
            }
        }

        let mut found_codes: HashSet<&str> = HashSet::new();
        let mut found_count = 0u32;
        let mut supplemental_count = 0u32;
        let mut unparsed_count = 0u32;
        for &idx in &indices {
            let record = &records[idx];
            if record.scale == self.primary {
                found_codes.insert(record.item_code.as_str());
            }
            if record.validity == RecordValidity::Duplicate {
                continue;
            }
            if record.scale == self.primary {
                found_count += 1;
            } else {
                supplemental_count += 1;
            }
            if record.validity == RecordValidity::Unparsed {
                unparsed_count += 1;
            }
        }

        let missing_items: Vec<String> = profile
            .map(|p| {
                p.expected_item_codes()
                    .into_iter()
                    .filter(|code| !found_codes.contains(code.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        let expected_count = profile.and_then(|p| p.expected_count());

        // Zero records where segments were seen, or a batch whose every
        // value failed the range check, is invalid outright.
        let checked = found_count + supplemental_count;
        let status = if expected_here && indices.is_empty() {
            BatchStatus::Invalid
        } else if checked > 0 && out_of_range.len() as u32 == checked {
            BatchStatus::Invalid
        } else if !missing_items.is_empty()
            || !duplicate_items.is_empty()
            || !out_of_range.is_empty()
            || unparsed_count > 0
        {
            BatchStatus::PartiallyValid
        } else {
            BatchStatus::Valid
        };
        self.state = BatchState::Checked(status);

        debug!(
            instrument = %self.kind,
            found = found_count,
            missing = missing_items.len(),
            duplicates = duplicate_items.len(),
            status = ?status,
            "batch checked"
        );

        ValidationReport {
            subject_id: subject_id.to_string(),
            instrument: self.kind,
            expected_count,
            found_count,
            supplemental_count,
            missing_items,
            duplicate_items,
            out_of_range,
            unparsed_count,
            status,
        }
    }
}

fn validation_detail(report: &ValidationReport) -> String {
    let verdict = match report.status {
        BatchStatus::Invalid => "invalid",
        _ => "partially valid",
    };
    format!(
        "{} batch {verdict}: {} missing, {} duplicate, {} out of range, {} unparsed",
        report.instrument,
        report.missing_items.len(),
        report.duplicate_items.len(),
        report.out_of_range.len(),
        report.unparsed_count,
    )
}

/// Validate every instrument batch in one document. Emits one report
/// per instrument that produced records or was seen by the classifier,
/// plus a finding for each batch that did not come out fully valid.
pub fn validate_records(
    subject_id: &str,
    records: &mut [CanonicalRecord],
    instruments_seen: &HashSet<InstrumentKind>,
) -> (Vec<ValidationReport>, Vec<Finding>) {
    let mut reports = Vec::new();
    let mut findings = Vec::new();
    for (kind, primary) in BATCHES {
        let expected_here = instruments_seen.contains(&kind);
        let has_records = records.iter().any(|r| r.instrument == kind);
        if !expected_here && !has_records {
            continue;
        }
        let mut validator = BatchValidator::new(kind, primary);
        let report = validator.check(subject_id, records, expected_here);
        if report.status != BatchStatus::Valid {
            findings.push(Finding::new(
                IssueKind::ValidationFailure,
                validation_detail(&report),
            ));
        }
        reports.push(report);
    }
    (reports, findings)
}
