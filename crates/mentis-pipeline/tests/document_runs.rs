//! Full document runs over hand-placed token pages: extraction across
//! instruments, merge-order guarantees, cancellation, and failure
//! isolation.

use mentis_core::models::finding::IssueKind;
use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::record::{CanonicalValue, RecordValidity};
use mentis_core::models::report::BatchStatus;
use mentis_core::models::token::{BoundingBox, PageTokens, Token};
use mentis_emit::MemorySink;
use mentis_pipeline::{CancelFlag, PipelineConfig, PipelineError, run_document, run_to_sinks};

fn tok(page: u32, text: &str, x: f32, y: f32) -> Token {
    Token {
        text: text.to_string(),
        page,
        bbox: BoundingBox {
            x0: x,
            y0: y,
            x1: x + text.chars().count() as f32 * 5.0,
            y1: y + 10.0,
        },
        font_size: Some(10.0),
    }
}

/// NPQ page: optional identity header, keyword line, two item rows.
fn npq_page(page: u32, with_header: bool) -> PageTokens {
    let mut tokens = Vec::new();
    if with_header {
        tokens.extend([
            tok(page, "Patient", 50.0, 20.0),
            tok(page, "ID:", 90.0, 20.0),
            tok(page, "P-1042", 130.0, 20.0),
        ]);
    }
    tokens.extend([
        tok(page, "Neuropsych", 50.0, 40.0),
        tok(page, "Questionnaire", 110.0, 40.0),
        tok(page, "Q1:", 50.0, 60.0),
        tok(page, "2", 120.0, 60.0),
        tok(page, "Q2:", 50.0, 74.0),
        tok(page, "3", 120.0, 74.0),
    ]);
    PageTokens { page, tokens }
}

fn dsm_page(page: u32) -> PageTokens {
    PageTokens {
        page,
        tokens: vec![
            tok(page, "DSM-5", 50.0, 40.0),
            tok(page, "Criteria", 78.0, 40.0),
            tok(page, "A1.", 50.0, 60.0),
            tok(page, "Careless", 120.0, 60.0),
            tok(page, "☒", 300.0, 60.0),
            tok(page, "A2.", 50.0, 74.0),
            tok(page, "Sustained", 120.0, 74.0),
            tok(page, "☐", 300.0, 74.0),
        ],
    }
}

fn asrs_page(page: u32) -> PageTokens {
    PageTokens {
        page,
        tokens: vec![
            tok(page, "Adult", 50.0, 40.0),
            tok(page, "ADHD", 78.0, 40.0),
            tok(page, "Self-Report", 105.0, 40.0),
            tok(page, "Scale", 165.0, 40.0),
            tok(page, "1.", 50.0, 60.0),
            tok(page, "Trouble", 120.0, 60.0),
            tok(page, "wrapping", 160.0, 60.0),
            tok(page, "up", 205.0, 60.0),
            tok(page, "Sometimes", 300.0, 60.0),
            tok(page, "2.", 50.0, 74.0),
            tok(page, "Fidgets", 120.0, 74.0),
            tok(page, "Never", 300.0, 74.0),
        ],
    }
}

fn sat_page(page: u32) -> PageTokens {
    PageTokens {
        page,
        tokens: vec![
            tok(page, "Shifting", 50.0, 40.0),
            tok(page, "Attention", 95.0, 40.0),
            tok(page, "Test", 145.0, 40.0),
            tok(page, "Trial", 50.0, 60.0),
            tok(page, "7:", 78.0, 60.0),
            tok(page, "523", 120.0, 60.0),
            tok(page, "ms", 140.0, 60.0),
            tok(page, "Trial", 50.0, 74.0),
            tok(page, "8:", 78.0, 74.0),
            tok(page, "n/a", 120.0, 74.0),
        ],
    }
}

/// One-row NPQ page, for duplicate scenarios.
fn one_item_page(page: u32, response: &str) -> PageTokens {
    PageTokens {
        page,
        tokens: vec![
            tok(page, "Neuropsych", 50.0, 40.0),
            tok(page, "Questionnaire", 110.0, 40.0),
            tok(page, "Q1:", 50.0, 60.0),
            tok(page, response, 120.0, 60.0),
        ],
    }
}

#[tokio::test]
async fn npq_document_extracts_items_under_the_probed_subject() {
    let batch = run_document(
        vec![npq_page(1, true)],
        &PipelineConfig::default(),
        &CancelFlag::new(),
    )
    .await
    .expect("run succeeds");

    assert_eq!(batch.subject.subject_id, "P-1042");
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].item_code, "Q1");
    assert_eq!(batch.records[0].value, CanonicalValue::Integer(2));
    assert_eq!(batch.records[1].item_code, "Q2");
    for record in &batch.records {
        assert_eq!(record.subject_id, "P-1042");
        assert_eq!(record.segment_id.page, record.source_page);
    }

    assert_eq!(batch.reports.len(), 1);
    let report = &batch.reports[0];
    assert_eq!(report.instrument, InstrumentKind::Npq);
    assert_eq!(report.found_count, 2);
    assert_eq!(report.expected_count, Some(45));
    assert!(report.missing_items.contains(&"Q3".to_string()));
    assert_eq!(report.status, BatchStatus::PartiallyValid);

    assert!(
        !batch
            .findings
            .iter()
            .any(|f| f.kind == IssueKind::MissingSubjectId)
    );
}

#[tokio::test]
async fn mixed_document_collects_every_instrument() {
    let pages = vec![npq_page(1, true), dsm_page(2), asrs_page(3), sat_page(4)];
    let batch = run_document(pages, &PipelineConfig::default(), &CancelFlag::new())
        .await
        .expect("run succeeds");

    assert_eq!(batch.records.len(), 8);
    let instruments: Vec<InstrumentKind> = batch.reports.iter().map(|r| r.instrument).collect();
    assert_eq!(
        instruments,
        vec![
            InstrumentKind::Npq,
            InstrumentKind::Dsm,
            InstrumentKind::Asrs,
            InstrumentKind::Sat
        ]
    );

    let sat_report = &batch.reports[3];
    assert_eq!(sat_report.expected_count, None);
    assert_eq!(sat_report.found_count, 2);
    assert_eq!(sat_report.unparsed_count, 1);
    assert_eq!(sat_report.status, BatchStatus::PartiallyValid);

    let missing_trial = batch
        .records
        .iter()
        .find(|r| r.item_code == "trial-8")
        .expect("unreadable trial kept");
    assert_eq!(missing_trial.value, CanonicalValue::Missing);
    assert_eq!(missing_trial.validity, RecordValidity::Unparsed);
    assert_eq!(missing_trial.metadata.error_trial, Some(true));

    assert!(
        batch
            .findings
            .iter()
            .any(|f| f.kind == IssueKind::ExtractionFieldError && f.detail.contains("trial 8"))
    );
    assert_eq!(batch.overall_status(), BatchStatus::PartiallyValid);

    for record in &batch.records {
        assert_eq!(record.segment_id.page, record.source_page);
        assert_eq!(record.subject_id, batch.subject.subject_id);
    }
}

#[tokio::test]
async fn duplicate_item_codes_keep_first_and_surface_both_pages() {
    let pages = vec![one_item_page(1, "2"), one_item_page(2, "3")];
    let batch = run_document(pages, &PipelineConfig::default(), &CancelFlag::new())
        .await
        .expect("run succeeds");

    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].source_page, 1);
    assert_eq!(batch.records[0].validity, RecordValidity::Valid);
    assert_eq!(batch.records[1].source_page, 2);
    assert_eq!(batch.records[1].validity, RecordValidity::Duplicate);

    let report = &batch.reports[0];
    assert_eq!(report.duplicate_items.len(), 1);
    assert_eq!(report.duplicate_items[0].item_code, "Q1");
    assert_eq!(report.duplicate_items[0].pages, vec![1, 2]);

    let flagged = batch.flagged_records();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].source_page, 2);
}

#[tokio::test]
async fn empty_document_is_the_only_fatal_error() {
    let result = run_document(Vec::new(), &PipelineConfig::default(), &CancelFlag::new()).await;

    assert!(matches!(result, Err(PipelineError::EmptyDocument)));
}

#[tokio::test]
async fn a_page_without_tokens_is_survivable() {
    let pages = vec![npq_page(1, true), PageTokens { page: 2, tokens: Vec::new() }];
    let batch = run_document(pages, &PipelineConfig::default(), &CancelFlag::new())
        .await
        .expect("run succeeds");

    assert_eq!(batch.records.len(), 2);
    assert!(
        !batch
            .findings
            .iter()
            .any(|f| f.kind == IssueKind::PageFailure)
    );
}

#[tokio::test]
async fn cancellation_skips_pages_not_yet_started() {
    let cancel = CancelFlag::new();
    cancel.cancel();

    let pages = vec![npq_page(1, true), dsm_page(2), sat_page(3)];
    let batch = run_document(pages, &PipelineConfig::default(), &cancel)
        .await
        .expect("cancelled run still completes");

    assert!(batch.records.is_empty());
    assert!(batch.reports.is_empty());

    let skipped: Vec<_> = batch
        .findings
        .iter()
        .filter(|f| f.kind == IssueKind::PageFailure)
        .collect();
    assert_eq!(skipped.len(), 3);
    for finding in &skipped {
        assert!(finding.detail.contains("cancelled"));
        assert!(finding.page.is_some());
    }
}

#[tokio::test]
async fn missing_subject_id_falls_back_to_a_placeholder() {
    let batch = run_document(
        vec![npq_page(1, false)],
        &PipelineConfig::default(),
        &CancelFlag::new(),
    )
    .await
    .expect("run succeeds");

    assert!(batch.subject.is_placeholder());
    assert!(
        batch
            .findings
            .iter()
            .any(|f| f.kind == IssueKind::MissingSubjectId)
    );
    assert_eq!(batch.records[0].subject_id, batch.subject.subject_id);
}

#[tokio::test]
async fn stray_singleton_tokens_are_flagged_not_dropped() {
    let mut page = one_item_page(1, "2");
    page.tokens.push(tok(1, "7", 50.0, 300.0));
    let batch = run_document(
        vec![page],
        &PipelineConfig::default(),
        &CancelFlag::new(),
    )
    .await
    .expect("run succeeds");

    assert_eq!(batch.records.len(), 1);
    let ambiguity = batch
        .findings
        .iter()
        .find(|f| f.kind == IssueKind::LayoutAmbiguity)
        .expect("singleton surfaced");
    assert!(ambiguity.detail.contains('7'));
    assert!(ambiguity.segment_id.is_some());
}

/// Re-running the same token stream yields byte-identical records,
/// reports, and findings.
#[tokio::test]
async fn reprocessing_the_same_document_is_deterministic() {
    let pages = vec![npq_page(1, true), dsm_page(2), asrs_page(3), sat_page(4)];
    let config = PipelineConfig::default();

    let first = run_document(pages.clone(), &config, &CancelFlag::new())
        .await
        .expect("first run succeeds");
    let second = run_document(pages, &config, &CancelFlag::new())
        .await
        .expect("second run succeeds");

    let records_a = serde_json::to_value(&first.records).expect("serialize");
    let records_b = serde_json::to_value(&second.records).expect("serialize");
    assert_eq!(records_a, records_b);

    let reports_a = serde_json::to_value(&first.reports).expect("serialize");
    let reports_b = serde_json::to_value(&second.reports).expect("serialize");
    assert_eq!(reports_a, reports_b);

    let findings_a = serde_json::to_value(&first.findings).expect("serialize");
    let findings_b = serde_json::to_value(&second.findings).expect("serialize");
    assert_eq!(findings_a, findings_b);
}

#[tokio::test]
async fn run_to_sinks_dispatches_the_finished_batch() {
    let mut persistence = MemorySink::new();
    let mut reporting = MemorySink::new();

    let batch = run_to_sinks(
        vec![one_item_page(1, "2")],
        &PipelineConfig::default(),
        &CancelFlag::new(),
        &mut persistence,
        &mut reporting,
    )
    .await
    .expect("run and dispatch succeed");

    assert_eq!(persistence.batches.len(), 1);
    assert_eq!(persistence.batches[0].batch_id, batch.batch_id);
}
