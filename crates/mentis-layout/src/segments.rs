//! Segment assembly: lines into header, row, and table segments.

use mentis_core::models::segment::{Segment, SegmentId, SegmentKind};
use mentis_core::models::token::PageTokens;
use tracing::debug;

use crate::config::SegmenterConfig;
use crate::lines::{self, Line};

/// Minimum consecutive multi-cell lines to form a table block.
const TABLE_MIN_ROWS: usize = 2;

/// Fallback font size when the tokenizer reports none.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Upper length for the uppercase-heading fallback.
const HEADING_MAX_CHARS: usize = 64;

/// Group one page's tokens into segments. Every token lands in exactly
/// one segment; a zero-token page yields no segments.
///
/// Consecutive multi-cell lines merge into a single table segment.
/// Header lines always form their own segment. Everything else becomes
/// a one-line row segment; an isolated single-token row is kept but
/// marked ambiguous.
pub fn segment_page(page: &PageTokens, config: &SegmenterConfig) -> Vec<Segment> {
    let lines = lines::group_tokens_into_lines(page.tokens.clone(), config);
    if lines.is_empty() {
        return Vec::new();
    }

    let body_size = lines::body_font_size(&lines);

    let mut segments: Vec<Segment> = Vec::new();
    let mut table_run: Vec<Line> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if is_heading(line, body_size, config) {
            flush_table(&mut segments, &mut table_run, page.page);
            push_segment(
                &mut segments,
                page.page,
                SegmentKind::Header,
                std::slice::from_ref(line),
                false,
            );
            continue;
        }

        if line.cells.len() >= 2 {
            if let Some(prev) = table_run.last()
                && vertical_gap(prev, line) > gap_threshold(prev, config)
            {
                flush_table(&mut segments, &mut table_run, page.page);
            }
            table_run.push(line.clone());
            continue;
        }

        flush_table(&mut segments, &mut table_run, page.page);
        let ambiguous = line.token_count == 1 && is_isolated(&lines, i, config);
        if ambiguous {
            debug!(
                page = page.page,
                y = line.y,
                "isolated singleton token kept as its own segment"
            );
        }
        push_segment(
            &mut segments,
            page.page,
            SegmentKind::Row,
            std::slice::from_ref(line),
            ambiguous,
        );
    }
    flush_table(&mut segments, &mut table_run, page.page);

    segments
}

/// A line is a heading when its font clearly exceeds the page body
/// size, or, without font information, when it is short and almost
/// entirely uppercase.
fn is_heading(line: &Line, body_size: Option<f32>, config: &SegmenterConfig) -> bool {
    if let (Some(size), Some(body)) = (line.font_size, body_size) {
        return size > body + config.header_font_delta;
    }

    let text = line.text();
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 3 || text.chars().count() > HEADING_MAX_CHARS {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    upper * 5 >= letters.len() * 4
}

fn vertical_gap(a: &Line, b: &Line) -> f32 {
    (b.y - a.y).abs()
}

fn gap_threshold(line: &Line, config: &SegmenterConfig) -> f32 {
    line.font_size.unwrap_or(DEFAULT_FONT_SIZE) * config.block_gap_factor
}

/// Far from both neighbours: the gap to the previous and next lines
/// both exceed the block gap for this line's font size.
fn is_isolated(lines: &[Line], i: usize, config: &SegmenterConfig) -> bool {
    let threshold = gap_threshold(&lines[i], config);
    let before = i
        .checked_sub(1)
        .map(|p| vertical_gap(&lines[p], &lines[i]) > threshold)
        .unwrap_or(true);
    let after = lines
        .get(i + 1)
        .map(|n| vertical_gap(&lines[i], n) > threshold)
        .unwrap_or(true);
    before && after
}

/// Emit a pending table run. Runs shorter than [`TABLE_MIN_ROWS`] fall
/// back to per-line row segments.
fn flush_table(segments: &mut Vec<Segment>, run: &mut Vec<Line>, page: u32) {
    if run.is_empty() {
        return;
    }
    let run = std::mem::take(run);
    if run.len() >= TABLE_MIN_ROWS {
        push_segment(segments, page, SegmentKind::Table, &run, false);
    } else {
        for line in &run {
            push_segment(
                segments,
                page,
                SegmentKind::Row,
                std::slice::from_ref(line),
                false,
            );
        }
    }
}

fn push_segment(
    segments: &mut Vec<Segment>,
    page: u32,
    kind: SegmentKind,
    lines: &[Line],
    ambiguous: bool,
) {
    let mut region = lines[0].region;
    for line in &lines[1..] {
        region = region.union(&line.region);
    }
    segments.push(Segment {
        id: SegmentId {
            page,
            index: segments.len() as u32,
        },
        page,
        kind,
        region,
        lines: lines.iter().map(Line::text).collect(),
        token_count: lines.iter().map(|l| l.token_count).sum(),
        ambiguous,
    });
}
