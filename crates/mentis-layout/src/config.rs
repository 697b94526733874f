use serde::{Deserialize, Serialize};

/// Geometry thresholds for the segmenter. Defaults fit letter-size
/// clinical reports set at 10–12pt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Tokens whose vertical centers differ by no more than this many
    /// points share a line.
    pub y_tolerance: f32,

    /// Horizontal gap, in points, that separates two table cells on
    /// the same line.
    pub column_gap: f32,

    /// Points above the page body font size before a line counts as a
    /// header.
    pub header_font_delta: f32,

    /// Vertical gap, as a multiple of the font size, that separates
    /// blocks.
    pub block_gap_factor: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            y_tolerance: 2.5,
            column_gap: 18.0,
            header_font_delta: 1.5,
            block_gap_factor: 1.4,
        }
    }
}
