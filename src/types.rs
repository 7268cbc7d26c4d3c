use serde::{Deserialize, Serialize};
use std::fmt;

/// Width/height pair in integer pixels.
///
/// Parameter fields that accept an empty size (`min_window`, `max_window`)
/// treat it as "no constraint".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either side is non-positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Both sides multiplied by `factor` and rounded half away from zero.
    pub fn scaled(&self, factor: f64) -> Size {
        Size {
            width: (self.width as f64 * factor).round() as i32,
            height: (self.height as f64 * factor).round() as i32,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in integer pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Rectangle grown by `dx`/`dy` on every side.
    pub fn expanded(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x - dx,
            y: self.y - dy,
            width: self.width + 2 * dx,
            height: self.height + 2 * dy,
        }
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// One positive window before grouping, in base-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub rect: Rect,
    /// Scorer confidence for this window; larger means more confident.
    pub score: f64,
    /// Stage index reached by staged classifiers, 0 when the scorer has no
    /// stage notion.
    pub reject_level: u32,
    /// Pyramid level scale the window was found at (base pixels per scaled
    /// pixel).
    pub scale: f64,
}

/// Final detection after reduction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub rect: Rect,
    /// Number of raw windows merged into this box. Mean-shift output keeps
    /// this at 1 and reports its density in `score`.
    pub weight: usize,
    /// Aggregated confidence of the merged windows.
    pub score: f64,
}
