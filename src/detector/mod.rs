//! Multiscale sliding-window detector.
//!
//! Overview
//! - Derives a ladder of scale levels from the image size and the scan
//!   parameters, keeping the window at the scorer's base size while the
//!   image shrinks.
//! - Renders each level with bilinear downscaling into a scratch buffer that
//!   is reused across levels.
//! - Slides the base window over every level on a stride grid and collects
//!   the scorer's positive windows as raw candidates in base-image
//!   coordinates.
//! - Reduces raw candidates to final detections with the configured grouping
//!   mode: similarity clustering, mean-shift in position/scale space, or no
//!   reduction at all.
//! - Supports biggest-only scans, cooperative cancellation between levels,
//!   and an explicit worker-thread policy.
//!
//! Modules
//! - [`params`] – scan configuration and its validation.
//! - `pipeline` – the main [`MultiscaleDetector`] implementation.
//! - `scanner` – stride-grid enumeration of one rendered level.

pub mod params;
mod pipeline;
mod scanner;

pub use params::{GroupingMode, ScanParams};
pub use pipeline::{MultiscaleDetector, Parallelism};
pub use scanner::{scan_level, LevelScan};
