//! Stride-grid window enumeration over one rendered pyramid level.

use crate::image::ImageU8;
use crate::pyramid::PyramidLevel;
use crate::scorer::{ScorerHints, WindowScorer};
use crate::types::{RawDetection, Rect, Size};
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Raw hits plus bookkeeping from scanning one level.
#[derive(Clone, Debug, Default)]
pub struct LevelScan {
    pub detections: Vec<RawDetection>,
    pub windows_evaluated: usize,
    pub scorer_errors: usize,
}

impl LevelScan {
    fn absorb(&mut self, other: LevelScan) {
        self.detections.extend(other.detections);
        self.windows_evaluated += other.windows_evaluated;
        self.scorer_errors += other.scorer_errors;
    }
}

/// Slide the base window across a rendered level and collect positive hits.
///
/// Window views share the level's buffer; the scorer sees each position
/// exactly once. Hits are mapped back to base-image pixels through the
/// level scale. A scorer error skips that window and bumps the error
/// counter. With the `parallel` feature, scan rows are distributed across
/// workers, each filling a private buffer that is concatenated afterwards.
///
/// `win_stride` must be at least 1 in each axis.
pub fn scan_level(
    scaled: &ImageU8<'_>,
    level: &PyramidLevel,
    scorer: &dyn WindowScorer,
    base_window: Size,
    win_stride: Size,
    hints: ScorerHints,
) -> LevelScan {
    assert!(
        win_stride.width >= 1 && win_stride.height >= 1,
        "window stride must be at least 1x1, got {win_stride}"
    );
    let win_w = base_window.width as usize;
    let win_h = base_window.height as usize;
    if scaled.w < win_w || scaled.h < win_h {
        return LevelScan::default();
    }
    let max_x = scaled.w - win_w;
    let max_y = scaled.h - win_h;
    let step_x = win_stride.width as usize;
    let step_y = win_stride.height as usize;

    let rows: Vec<usize> = (0..=max_y).step_by(step_y).collect();

    #[cfg(feature = "parallel")]
    let row_scans: Vec<LevelScan> = rows
        .par_iter()
        .map(|&y| scan_row(scaled, level, scorer, base_window, hints, y, max_x, step_x))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let row_scans: Vec<LevelScan> = rows
        .iter()
        .map(|&y| scan_row(scaled, level, scorer, base_window, hints, y, max_x, step_x))
        .collect();

    let mut scan = LevelScan::default();
    for row in row_scans {
        scan.absorb(row);
    }
    scan
}

#[allow(clippy::too_many_arguments)]
fn scan_row(
    scaled: &ImageU8<'_>,
    level: &PyramidLevel,
    scorer: &dyn WindowScorer,
    base_window: Size,
    hints: ScorerHints,
    y: usize,
    max_x: usize,
    step_x: usize,
) -> LevelScan {
    let win_w = base_window.width as usize;
    let win_h = base_window.height as usize;
    let mut out = LevelScan::default();

    let mut x = 0usize;
    while x <= max_x {
        out.windows_evaluated += 1;
        let window = scaled.window(x, y, win_w, win_h);
        match scorer.evaluate(&window, hints) {
            Ok(result) if result.positive => {
                out.detections.push(RawDetection {
                    rect: Rect {
                        x: (x as f64 * level.scale).round() as i32,
                        y: (y as f64 * level.scale).round() as i32,
                        width: level.window.width,
                        height: level.window.height,
                    },
                    score: result.score,
                    reject_level: result.reject_level,
                    scale: level.scale,
                });
            }
            Ok(_) => {}
            Err(err) => {
                debug!("level {} window at ({x}, {y}) skipped: {err}", level.index);
                out.scorer_errors += 1;
            }
        }
        x += step_x;
    }
    out
}
