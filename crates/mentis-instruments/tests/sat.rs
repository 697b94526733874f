//! SAT trial extraction: reaction time units, missing values, error
//! marks.

use mentis_core::models::instrument::InstrumentKind;
use mentis_core::models::intermediate::{IntermediateRecord, SatTrial};
use mentis_core::models::segment::{
    ClassifiedSegment, MatchConfidence, Segment, SegmentId, SegmentKind,
};
use mentis_core::models::token::BoundingBox;
use mentis_instruments::extractor_for;

fn sat_segment(lines: &[&str]) -> ClassifiedSegment {
    ClassifiedSegment {
        segment: Segment {
            id: SegmentId { page: 5, index: 3 },
            page: 5,
            kind: SegmentKind::Table,
            region: BoundingBox {
                x0: 40.0,
                y0: 120.0,
                x1: 400.0,
                y1: 500.0,
            },
            lines: lines.iter().map(|l| l.to_string()).collect(),
            token_count: lines.len() * 3,
            ambiguous: false,
        },
        instrument: InstrumentKind::Sat,
        confidence: MatchConfidence::Keyword,
    }
}

fn extract(lines: &[&str]) -> Vec<SatTrial> {
    let extractor = extractor_for(InstrumentKind::Sat).expect("sat extractor registered");
    extractor
        .extract(&sat_segment(lines))
        .into_iter()
        .map(|record| match record {
            IntermediateRecord::SatTrial(trial) => trial,
            other => panic!("expected a sat trial, got {other:?}"),
        })
        .collect()
}

fn assert_ms(trial: &SatTrial, expected: f64) {
    let rt = trial.reaction_time_ms.expect("reaction time present");
    assert!((rt - expected).abs() < 1e-6, "got {rt}, expected {expected}");
}

#[test]
fn labeled_trial_parses_milliseconds() {
    let trials = extract(&["Trial 7: 523 ms"]);

    assert_eq!(trials.len(), 1);
    assert_eq!(trials[0].trial_index, 7);
    assert_ms(&trials[0], 523.0);
    assert!(!trials[0].is_error);
}

/// A trial whose time is unreadable stays in the output as an error
/// with no time.
#[test]
fn missing_time_marks_the_trial_as_an_error() {
    let trials = extract(&["Trial 9: n/a"]);

    assert_eq!(trials.len(), 1);
    assert_eq!(trials[0].reaction_time_ms, None);
    assert!(trials[0].is_error);
}

#[test]
fn seconds_suffix_scales_to_milliseconds() {
    let trials = extract(&["Trial 3: 0.52s"]);

    assert_ms(&trials[0], 520.0);
}

#[test]
fn thousands_separator_is_dropped() {
    let trials = extract(&["Trial 2: 1,042 ms"]);

    assert_ms(&trials[0], 1042.0);
}

#[test]
fn bare_table_rows_parse_index_time_and_error_cell() {
    let trials = extract(&["7  523  x", "8  601"]);

    assert_eq!(trials.len(), 2);
    assert_ms(&trials[0], 523.0);
    assert!(trials[0].is_error);
    assert_ms(&trials[1], 601.0);
    assert!(!trials[1].is_error);
}

#[test]
fn error_column_word_variants_are_read() {
    let trials = extract(&["9  480  error", "10  455  ok"]);

    assert!(trials[0].is_error);
    assert!(!trials[1].is_error);
}

#[test]
fn dash_placeholder_counts_as_missing() {
    let trials = extract(&["11  -"]);

    assert_eq!(trials[0].reaction_time_ms, None);
    assert!(trials[0].is_error);
}

#[test]
fn heading_lines_produce_no_trials() {
    let trials = extract(&["Shifting Attention Test", "Reaction Times"]);

    assert!(trials.is_empty());
}
