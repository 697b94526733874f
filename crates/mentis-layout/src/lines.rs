//! Line clustering: flat token streams into baseline-aligned lines.

use std::collections::BTreeMap;

use mentis_core::models::token::{BoundingBox, Token};

use crate::config::SegmenterConfig;

/// Gap below which adjacent fragments are sub-word pieces and
/// concatenate with no separator.
const MIN_WORD_GAP: f32 = 1.5;

/// Quantisation bucket width for font sizes (points).
const FONT_SIZE_BUCKET: f32 = 0.5;

/// A horizontal run of tokens sharing (approximately) one baseline.
/// `cells` holds the column-separated texts, left to right.
#[derive(Debug, Clone)]
pub struct Line {
    pub y: f32,
    pub x: f32,
    pub cells: Vec<String>,
    pub region: BoundingBox,
    pub font_size: Option<f32>,
    pub token_count: usize,
}

impl Line {
    /// Cell texts joined with a two-space column separator.
    pub fn text(&self) -> String {
        self.cells.join("  ")
    }

    pub fn char_count(&self) -> usize {
        self.cells.iter().map(|c| c.chars().count()).sum()
    }
}

/// Cluster tokens into lines. A token joins the current cluster when
/// its vertical center is within `y_tolerance` of the cluster's first
/// token. Output is ordered top to bottom, left to right.
pub fn group_tokens_into_lines(mut tokens: Vec<Token>, config: &SegmenterConfig) -> Vec<Line> {
    if tokens.is_empty() {
        return Vec::new();
    }

    tokens.sort_by(|a, b| {
        a.bbox
            .center_y()
            .partial_cmp(&b.bbox.center_y())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Token> = vec![tokens.remove(0)];
    let mut current_y = current[0].bbox.center_y();

    for token in tokens {
        if (token.bbox.center_y() - current_y).abs() <= config.y_tolerance {
            current.push(token);
        } else {
            lines.push(assemble_line(std::mem::take(&mut current), config));
            current_y = token.bbox.center_y();
            current.push(token);
        }
    }

    if !current.is_empty() {
        lines.push(assemble_line(current, config));
    }

    lines
}

/// Build a [`Line`] from tokens known to share a baseline. Tokens are
/// sorted left to right; a horizontal gap of `column_gap` or more
/// starts a new cell.
fn assemble_line(mut tokens: Vec<Token>, config: &SegmenterConfig) -> Line {
    tokens.sort_by(|a, b| {
        a.bbox
            .x0
            .partial_cmp(&b.bbox.x0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut region = tokens[0].bbox;
    let mut cells: Vec<String> = Vec::new();
    let mut cell = String::new();

    for (i, token) in tokens.iter().enumerate() {
        region = region.union(&token.bbox);
        let piece = token.text.trim();
        if cell.is_empty() {
            cell.push_str(piece);
            continue;
        }
        let gap = token.bbox.x0 - tokens[i - 1].bbox.x1;
        if gap >= config.column_gap {
            cells.push(std::mem::take(&mut cell));
            cell.push_str(piece);
        } else if gap < MIN_WORD_GAP {
            cell.push_str(piece);
        } else {
            cell.push(' ');
            cell.push_str(piece);
        }
    }
    if !cell.is_empty() {
        cells.push(cell);
    }

    Line {
        y: tokens[0].bbox.center_y(),
        x: region.x0,
        cells,
        font_size: dominant_font_size(&tokens),
        token_count: tokens.len(),
        region,
    }
}

fn bucket_key(size: f32) -> i32 {
    ((size / FONT_SIZE_BUCKET).round() * FONT_SIZE_BUCKET * 100.0).round() as i32
}

/// Font size covering the most characters in the tokens, quantised to
/// half-point buckets. `None` when no token carries a size.
fn dominant_font_size(tokens: &[Token]) -> Option<f32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for token in tokens {
        if let Some(size) = token.font_size {
            *counts.entry(bucket_key(size)).or_insert(0) += token.text.chars().count();
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(key, _)| key as f32 / 100.0)
}

/// Page body size: the quantised font size covering the most
/// characters across all lines. `None` when the page carries no font
/// information.
pub fn body_font_size(lines: &[Line]) -> Option<f32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for line in lines {
        if let Some(size) = line.font_size {
            *counts.entry(bucket_key(size)).or_insert(0) += line.char_count();
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(key, _)| key as f32 / 100.0)
}
