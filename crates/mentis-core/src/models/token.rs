use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page points, origin top-left, y growing
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// One positioned text run as delivered by the tokenizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub page: u32,
    pub bbox: BoundingBox,
    pub font_size: Option<f32>,
}

/// All tokens of one page, in tokenizer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTokens {
    pub page: u32,
    pub tokens: Vec<Token>,
}
