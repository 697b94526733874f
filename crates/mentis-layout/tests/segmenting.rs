//! Segmenter behavior over hand-placed token layouts. Coordinates are
//! page points, origin top-left, y growing downward.

use mentis_core::models::segment::SegmentKind;
use mentis_core::models::token::{BoundingBox, PageTokens, Token};
use mentis_layout::lines::group_tokens_into_lines;
use mentis_layout::{SegmenterConfig, segment_page};

fn tok(text: &str, x: f32, y: f32) -> Token {
    tok_sized(text, x, y, 10.0)
}

fn tok_sized(text: &str, x: f32, y: f32, size: f32) -> Token {
    Token {
        text: text.to_string(),
        page: 1,
        bbox: BoundingBox {
            x0: x,
            y0: y,
            x1: x + text.chars().count() as f32 * 5.0,
            y1: y + 10.0,
        },
        font_size: Some(size),
    }
}

fn page(tokens: Vec<Token>) -> PageTokens {
    PageTokens { page: 1, tokens }
}

#[test]
fn zero_token_page_yields_no_segments() {
    let config = SegmenterConfig::default();
    assert!(segment_page(&page(vec![]), &config).is_empty());
}

#[test]
fn baseline_jitter_within_tolerance_shares_a_line() {
    let config = SegmenterConfig::default();
    let lines = group_tokens_into_lines(
        vec![tok("Left", 50.0, 100.0), tok("Right", 120.0, 101.8)],
        &config,
    );
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text(), "Left  Right");
}

#[test]
fn distinct_baselines_split_into_lines() {
    let config = SegmenterConfig::default();
    let lines = group_tokens_into_lines(
        vec![tok("Upper", 50.0, 100.0), tok("Lower", 50.0, 106.0)],
        &config,
    );
    assert_eq!(lines.len(), 2);
}

/// Sub-word fragments sit almost touching and must rejoin without a
/// space.
#[test]
fn tiny_gaps_concatenate_fragments() {
    let config = SegmenterConfig::default();
    let lines = group_tokens_into_lines(
        vec![tok("Ques", 50.0, 100.0), tok("tion", 70.5, 100.0)],
        &config,
    );
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].cells, vec!["Question".to_string()]);
}

#[test]
fn label_value_pair_becomes_a_row_segment() {
    let config = SegmenterConfig::default();
    let segments = segment_page(&page(vec![tok("Q12:", 50.0, 100.0), tok("3", 90.0, 100.0)]), &config);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Row);
    assert_eq!(segments[0].lines, vec!["Q12:  3".to_string()]);
    assert_eq!(segments[0].token_count, 2);
}

#[test]
fn word_gaps_stay_in_one_cell_column_gaps_split() {
    let config = SegmenterConfig::default();
    let segments = segment_page(
        &page(vec![
            tok("Patient", 50.0, 100.0),
            tok("ID:", 90.0, 100.0),
            tok("AB-12", 130.0, 100.0),
        ]),
        &config,
    );

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].lines, vec!["Patient ID:  AB-12".to_string()]);
}

#[test]
fn aligned_multi_cell_lines_merge_into_a_table() {
    let config = SegmenterConfig::default();
    let mut tokens = Vec::new();
    for (i, y) in [100.0_f32, 114.0, 128.0].iter().enumerate() {
        tokens.push(tok(&format!("{}.", i + 1), 50.0, *y));
        tokens.push(tok("450", 120.0, *y));
    }
    let segments = segment_page(&page(tokens), &config);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Table);
    assert_eq!(segments[0].lines.len(), 3);
    assert_eq!(segments[0].token_count, 6);
}

#[test]
fn wide_vertical_gap_splits_table_runs() {
    let config = SegmenterConfig::default();
    let segments = segment_page(
        &page(vec![
            tok("1.", 50.0, 100.0),
            tok("450", 120.0, 100.0),
            tok("2.", 50.0, 114.0),
            tok("480", 120.0, 114.0),
            tok("3.", 50.0, 200.0),
            tok("455", 120.0, 200.0),
        ]),
        &config,
    );

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].kind, SegmentKind::Table);
    assert_eq!(segments[0].lines.len(), 2);
    assert_eq!(segments[1].kind, SegmentKind::Row);
}

#[test]
fn oversized_font_line_is_a_header_segment() {
    let config = SegmenterConfig::default();
    let segments = segment_page(
        &page(vec![
            tok_sized("SUMMARY", 50.0, 50.0, 16.0),
            tok("1.", 50.0, 100.0),
            tok("450", 120.0, 100.0),
            tok("2.", 50.0, 114.0),
            tok("480", 120.0, 114.0),
        ]),
        &config,
    );

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].kind, SegmentKind::Header);
    assert_eq!(segments[0].lines, vec!["SUMMARY".to_string()]);
    assert_eq!(segments[1].kind, SegmentKind::Table);
}

/// Without font information the segmenter falls back to the
/// uppercase-line heuristic for headings.
#[test]
fn uppercase_line_without_font_info_is_a_header() {
    let config = SegmenterConfig::default();
    let mut tokens = vec![
        tok("NPQ", 50.0, 50.0),
        tok("RESULTS", 70.0, 50.0),
        tok("Q1:", 50.0, 100.0),
        tok("2", 120.0, 100.0),
    ];
    for token in &mut tokens {
        token.font_size = None;
    }
    let segments = segment_page(&page(tokens), &config);

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].kind, SegmentKind::Header);
    assert_eq!(segments[1].kind, SegmentKind::Row);
}

/// A lone token far from every neighbour is kept as its own row but
/// carries the ambiguity flag.
#[test]
fn isolated_singleton_is_kept_and_flagged() {
    let config = SegmenterConfig::default();
    let segments = segment_page(
        &page(vec![
            tok("Q1:", 50.0, 100.0),
            tok("2", 120.0, 100.0),
            tok("7", 50.0, 300.0),
        ]),
        &config,
    );

    assert_eq!(segments.len(), 2);
    assert!(!segments[0].ambiguous);
    assert_eq!(segments[1].kind, SegmentKind::Row);
    assert_eq!(segments[1].lines, vec!["7".to_string()]);
    assert!(segments[1].ambiguous);
}

/// Every token lands in exactly one segment: segment token counts sum
/// to the page total.
#[test]
fn token_counts_sum_to_the_page_total() {
    let config = SegmenterConfig::default();
    let tokens = vec![
        tok_sized("RESULTS", 50.0, 40.0, 16.0),
        tok("1.", 50.0, 100.0),
        tok("450", 120.0, 100.0),
        tok("2.", 50.0, 114.0),
        tok("480", 120.0, 114.0),
        tok("Total", 50.0, 200.0),
        tok("errors:", 90.0, 200.0),
        tok("3", 150.0, 200.0),
        tok("7", 50.0, 400.0),
    ];
    let total = tokens.len();
    let segments = segment_page(&page(tokens), &config);

    let counted: usize = segments.iter().map(|s| s.token_count).sum();
    assert_eq!(counted, total);
}

#[test]
fn repeated_runs_produce_identical_segments() {
    let config = SegmenterConfig::default();
    let tokens = vec![
        tok("Q1:", 50.0, 100.0),
        tok("2", 120.0, 100.0),
        tok("Q2:", 50.0, 114.0),
        tok("0", 120.0, 114.0),
        tok("Notes", 50.0, 200.0),
    ];
    let first = segment_page(&page(tokens.clone()), &config);
    let second = segment_page(&page(tokens), &config);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.lines, b.lines);
    }
}
