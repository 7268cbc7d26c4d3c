use window_detector::image::{ImageU8, ImageView};
use window_detector::scorer::{ScorerError, ScorerHints, WindowScore, WindowScorer};
use window_detector::{Rect, Size};

/// Generates a dark frame with one bright axis-aligned square.
pub fn bright_square_u8(width: usize, height: usize, square: Rect) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(!square.size().is_empty(), "square must be non-empty");

    let mut img = vec![20u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let inside = (x as i32) >= square.x
                && (x as i32) < square.right()
                && (y as i32) >= square.y
                && (y as i32) < square.bottom();
            if inside {
                img[y * width + x] = 220;
            }
        }
    }
    img
}

/// Scorer that accepts a window when its darkest pixel clears a floor.
///
/// An accepted window lies entirely inside the bright region, which keeps
/// the hit grid of a synthetic square exactly predictable.
pub struct BrightWindowScorer {
    pub window: Size,
    pub min_brightness: u8,
}

impl WindowScorer for BrightWindowScorer {
    fn window_size(&self) -> Size {
        self.window
    }

    fn evaluate(
        &self,
        window: &ImageU8<'_>,
        _hints: ScorerHints,
    ) -> Result<WindowScore, ScorerError> {
        let mut min = u8::MAX;
        let mut sum = 0u64;
        for row in window.rows() {
            for &v in row {
                min = min.min(v);
                sum += v as u64;
            }
        }
        let mean = sum as f64 / (window.w * window.h) as f64;
        Ok(WindowScore {
            positive: min >= self.min_brightness,
            score: mean / 255.0,
            reject_level: 1,
        })
    }
}
