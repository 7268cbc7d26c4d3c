#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod types;

// Building blocks the detector is assembled from. Public so custom scorers
// and standalone grouping stay usable without the pipeline.
pub mod grouping;
pub mod pyramid;
pub mod scorer;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{GroupingMode, MultiscaleDetector, Parallelism, ScanParams};
pub use crate::error::DetectError;
pub use crate::types::{Detection, RawDetection, Rect, Size};

// Run statistics returned alongside the detections.
pub use crate::diagnostics::{ScanReport, ScanStats};

// Standalone reduction helpers, usable on rectangles from any source.
pub use crate::grouping::{
    group_rectangles, group_rectangles_levels, group_rectangles_meanshift,
    group_rectangles_weighted,
};

// Scorer contract for plugging in custom window models.
pub use crate::scorer::{ScorerError, ScorerHints, TemplateScorer, WindowScore, WindowScorer};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use window_detector::prelude::*;
///
/// # fn main() -> Result<(), DetectError> {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let template = GrayImageU8::zeroed(24, 24);
/// let det = MultiscaleDetector::new(Box::new(TemplateScorer::new(template, 0.7)));
///
/// let report = det.detect(&img, &ScanParams::default())?;
/// println!(
///     "detections={} windows={}",
///     report.detections.len(),
///     report.stats.windows_evaluated
/// );
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{GrayImageU8, ImageU8};
    pub use crate::scorer::TemplateScorer;
    pub use crate::{
        DetectError, Detection, GroupingMode, MultiscaleDetector, Parallelism, Rect, ScanParams,
        ScanReport, Size,
    };
}
