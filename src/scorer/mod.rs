//! The pluggable window-classifier contract.
//!
//! The detector never looks inside a classifier: cascades, HOG/SVM models or
//! template matchers all sit behind [`WindowScorer`], selected at
//! construction and shared read-only across worker threads. Model loading
//! and file formats belong to the scorer implementation, not to the scan.

pub mod template;

pub use template::TemplateScorer;

use crate::image::ImageU8;
use crate::types::Size;
use std::fmt;

/// Outcome of evaluating a single window.
#[derive(Clone, Copy, Debug)]
pub struct WindowScore {
    /// Whether the window is considered a positive.
    pub positive: bool,
    /// Confidence value; larger means more confident.
    pub score: f64,
    /// Stage index reached by staged classifiers (0 when not staged).
    pub reject_level: u32,
}

/// Per-call hints forwarded from the scan parameters.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScorerHints {
    /// Allow the scorer to reject low-texture windows with a cheap edge test
    /// before running its full evaluation.
    pub edge_prune: bool,
}

/// Failure of a single window evaluation.
///
/// These are local: the scanner skips the window, bumps a counter and keeps
/// going.
#[derive(Clone, Debug)]
pub struct ScorerError(pub String);

impl fmt::Display for ScorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scorer failure: {}", self.0)
    }
}

impl std::error::Error for ScorerError {}

/// A windowed classifier evaluated at every scan position.
///
/// Implementations hold read-only state and are shared across worker
/// threads, hence the `Send + Sync` bound.
pub trait WindowScorer: Send + Sync {
    /// Native window size the scorer was built for.
    fn window_size(&self) -> Size;

    /// Whether the scorer can evaluate windows of `size`.
    fn supports_window_size(&self, size: Size) -> bool {
        size == self.window_size()
    }

    /// Classify one window. The view dimensions always equal the scan's
    /// base window.
    fn evaluate(
        &self,
        window: &ImageU8<'_>,
        hints: ScorerHints,
    ) -> Result<WindowScore, ScorerError>;
}
