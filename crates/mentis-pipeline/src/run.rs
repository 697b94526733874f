//! Page-parallel pipeline driver.
//!
//! Pages fan out to blocking tasks in a bounded wave; outcomes merge
//! at a single barrier in page order, and only then does the
//! single-writer phase run (subject resolution, normalization,
//! validation, batch assembly). A failed or skipped page becomes a
//! finding, never an abort. The one fatal condition is a document with
//! no pages at all.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mentis_core::models::batch::DocumentBatch;
use mentis_core::models::finding::{Finding, IssueKind};
use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::IntermediateRecord;
use mentis_core::models::record::{CanonicalRecord, Presence};
use mentis_core::models::token::PageTokens;
use mentis_emit::{PersistenceSink, ReportingSink};
use mentis_instruments::all_extractors;
use mentis_layout::{SegmenterConfig, segment_page};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classify::classify_page;
use crate::error::PipelineError;
use crate::normalize::normalize_record;
use crate::subject::SubjectProbe;
use crate::validate::validate_records;

/// Cooperative cancellation shared with page tasks. Pages already
/// running finish normally; pages not yet scheduled are skipped and
/// recorded as findings.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub segmenter: SegmenterConfig,
    /// Upper bound on page tasks running at once.
    pub max_parallel_pages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            segmenter: SegmenterConfig::default(),
            max_parallel_pages: 4,
        }
    }
}

/// Everything one page task produces. Merged single-threaded after the
/// fan-in barrier.
struct PageOutcome {
    page: u32,
    records: Vec<IntermediateRecord>,
    instruments_seen: HashSet<InstrumentKind>,
    findings: Vec<Finding>,
    probe: SubjectProbe,
}

/// Per-field extraction problems, read back off the record flags.
fn field_findings(records: &[IntermediateRecord]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for record in records {
        let origin = record.origin();
        match record {
            IntermediateRecord::NpqItem(item) if item.response.is_none() => {
                findings.push(
                    Finding::new(
                        IssueKind::ExtractionFieldError,
                        format!("Q{}: response did not parse as a number", item.question_number),
                    )
                    .at_segment(origin.segment_id),
                );
            }
            IntermediateRecord::DsmCriterion(criterion)
                if criterion.present == Presence::Unknown =>
            {
                findings.push(
                    Finding::new(
                        IssueKind::ExtractionFieldError,
                        format!("{}: criterion state unreadable", criterion.criterion_code),
                    )
                    .at_segment(origin.segment_id),
                );
            }
            IntermediateRecord::AsrsItem(item) if item.frequency.is_none() => {
                findings.push(
                    Finding::new(
                        IssueKind::ExtractionFieldError,
                        format!(
                            "{}{}: response is neither a digit nor a frequency word",
                            item.section.letter(),
                            item.item_number
                        ),
                    )
                    .at_segment(origin.segment_id),
                );
            }
            IntermediateRecord::SatTrial(trial) if trial.reaction_time_ms.is_none() => {
                findings.push(
                    Finding::new(
                        IssueKind::ExtractionFieldError,
                        format!("trial {}: reaction time did not parse", trial.trial_index),
                    )
                    .at_segment(origin.segment_id),
                );
            }
            _ => {}
        }
    }
    findings
}

/// Pure per-page stage: segment, classify, extract. Touches no shared
/// state, so pages can run in any order.
fn process_page(page: PageTokens, config: &SegmenterConfig) -> PageOutcome {
    let page_no = page.page;
    let segments = segment_page(&page, config);

    let mut findings: Vec<Finding> = segments
        .iter()
        .filter(|s| s.ambiguous)
        .map(|s| {
            Finding::new(
                IssueKind::LayoutAmbiguity,
                format!("isolated single-token segment \"{}\"", s.text()),
            )
            .at_segment(s.id)
        })
        .collect();

    let probe = SubjectProbe::scan(&segments);

    let (classified, classify_findings) = classify_page(segments);
    findings.extend(classify_findings);

    let extractors = all_extractors();
    let mut records: Vec<IntermediateRecord> = Vec::new();
    let mut instruments_seen: HashSet<InstrumentKind> = HashSet::new();
    for segment in &classified {
        if segment.instrument == InstrumentKind::Unknown {
            continue;
        }
        instruments_seen.insert(segment.instrument);
        if let Some(extractor) = extractors.iter().find(|e| e.kind() == segment.instrument) {
            records.extend(extractor.extract(segment));
        }
    }

    let field_errors = field_findings(&records);
    for finding in &field_errors {
        warn!(page = page_no, detail = %finding.detail, "unparseable field kept for review");
    }
    findings.extend(field_errors);

    PageOutcome {
        page: page_no,
        records,
        instruments_seen,
        findings,
        probe,
    }
}

fn spawn_next(
    join_set: &mut JoinSet<PageOutcome>,
    queue: &mut std::vec::IntoIter<PageTokens>,
    segmenter: SegmenterConfig,
    cancel: &CancelFlag,
) {
    if cancel.is_cancelled() {
        return;
    }
    if let Some(page) = queue.next() {
        join_set.spawn_blocking(move || process_page(page, &segmenter));
    }
}

/// Run the full pipeline over pre-tokenized pages and assemble one
/// immutable batch.
pub async fn run_document(
    pages: Vec<PageTokens>,
    config: &PipelineConfig,
    cancel: &CancelFlag,
) -> Result<DocumentBatch, PipelineError> {
    if pages.is_empty() {
        return Err(PipelineError::EmptyDocument);
    }

    let total = pages.len();
    info!(pages = total, "starting document run");

    let segmenter = config.segmenter;
    let mut queue = pages.into_iter();
    let mut join_set: JoinSet<PageOutcome> = JoinSet::new();
    let mut outcomes: Vec<PageOutcome> = Vec::with_capacity(total);
    let mut late_findings: Vec<Finding> = Vec::new();

    for _ in 0..config.max_parallel_pages.max(1) {
        spawn_next(&mut join_set, &mut queue, segmenter, cancel);
    }
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                warn!(error = %err, "page task failed");
                late_findings.push(Finding::new(
                    IssueKind::PageFailure,
                    format!("page task failed: {err}"),
                ));
            }
        }
        spawn_next(&mut join_set, &mut queue, segmenter, cancel);
    }

    // Merge barrier. Page order here also fixes which duplicate
    // occurrence counts as first.
    outcomes.sort_by_key(|o| o.page);

    let mut findings: Vec<Finding> = Vec::new();
    let mut intermediates: Vec<IntermediateRecord> = Vec::new();
    let mut instruments_seen: HashSet<InstrumentKind> = HashSet::new();
    let mut probe = SubjectProbe::default();
    for outcome in outcomes {
        findings.extend(outcome.findings);
        intermediates.extend(outcome.records);
        instruments_seen.extend(outcome.instruments_seen);
        probe = probe.merge(outcome.probe);
    }
    findings.append(&mut late_findings);

    if cancel.is_cancelled() {
        for page in queue {
            findings.push(
                Finding::new(IssueKind::PageFailure, "page skipped: run cancelled")
                    .on_page(page.page),
            );
        }
    }

    let (subject, id_found) = probe.resolve();
    if !id_found {
        warn!(subject_id = %subject.subject_id, "no subject id found, placeholder assigned");
        findings.push(Finding::new(
            IssueKind::MissingSubjectId,
            "no subject id found in any page header",
        ));
    }

    let mut records: Vec<CanonicalRecord> = intermediates
        .into_iter()
        .map(|record| normalize_record(record, &subject.subject_id))
        .collect();

    let (reports, validation_findings) =
        validate_records(&subject.subject_id, &mut records, &instruments_seen);
    findings.extend(validation_findings);

    let batch = DocumentBatch {
        batch_id: Uuid::new_v4(),
        subject,
        records,
        reports,
        findings,
        created_at: jiff::Timestamp::now(),
    };

    info!(
        batch_id = %batch.batch_id,
        subject_id = %batch.subject.subject_id,
        records = batch.records.len(),
        findings = batch.findings.len(),
        status = ?batch.overall_status(),
        "document run complete"
    );

    Ok(batch)
}

/// Run a document and hand the finished batch to the given sinks.
pub async fn run_to_sinks(
    pages: Vec<PageTokens>,
    config: &PipelineConfig,
    cancel: &CancelFlag,
    persistence: &mut dyn PersistenceSink,
    reporting: &mut dyn ReportingSink,
) -> Result<DocumentBatch, PipelineError> {
    let batch = run_document(pages, config, cancel).await?;
    mentis_emit::dispatch(&batch, persistence, reporting)?;
    Ok(batch)
}
