//! Detector pipeline driving the multiscale scan end-to-end.
//!
//! The [`MultiscaleDetector`] exposes a simple API: feed a grayscale image
//! and get grouped detections with detailed run statistics. Internally it
//! coordinates level geometry, per-level rendering into a reused scratch
//! buffer, the stride-grid window scan, and the configured reduction of raw
//! hits into final boxes.
//!
//! Typical usage:
//! ```no_run
//! use window_detector::{MultiscaleDetector, ScanParams};
//! use window_detector::image::{GrayImageU8, ImageU8};
//! use window_detector::scorer::TemplateScorer;
//!
//! # fn example(gray: ImageU8, template: GrayImageU8) -> Result<(), window_detector::DetectError> {
//! let detector = MultiscaleDetector::new(Box::new(TemplateScorer::new(template, 0.7)));
//! let report = detector.detect(&gray, &ScanParams::default())?;
//! for det in &report.detections {
//!     println!("{:?} weight {}", det.rect, det.weight);
//! }
//! # Ok(())
//! # }
//! ```
use super::params::{GroupingMode, ScanParams};
use super::scanner::{scan_level, LevelScan};
use crate::diagnostics::{ScanReport, ScanStats};
use crate::error::DetectError;
use crate::grouping::{group_rectangles_levels, group_rectangles_meanshift};
use crate::image::{GrayImageU8, ImageU8};
use crate::pyramid::{PyramidLevel, ScalePyramid};
use crate::scorer::{ScorerHints, WindowScorer};
use crate::types::{Detection, RawDetection, Rect, Size};
use log::debug;
use std::time::Instant;

/// Worker-thread policy for the scan stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// Scan on the calling thread with a single worker.
    SingleThreaded,
    /// Share the process-wide default worker pool.
    #[default]
    AllCores,
    /// Dedicated pool with exactly this many workers. Zero is rejected.
    Fixed(usize),
}

/// Multiscale sliding-window detector around a boxed [`WindowScorer`].
///
/// Construction is cheap; all sizing decisions happen per `detect` call from
/// the image dimensions and the supplied [`ScanParams`].
pub struct MultiscaleDetector {
    scorer: Box<dyn WindowScorer>,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for MultiscaleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiscaleDetector").finish_non_exhaustive()
    }
}

impl MultiscaleDetector {
    /// Create a detector that scans with the default worker policy.
    pub fn new(scorer: Box<dyn WindowScorer>) -> Self {
        Self {
            scorer,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Create a detector with an explicit worker policy.
    ///
    /// Without the `parallel` feature the policy is accepted but the scan
    /// always runs on the calling thread.
    pub fn with_parallelism(
        scorer: Box<dyn WindowScorer>,
        parallelism: Parallelism,
    ) -> Result<Self, DetectError> {
        if parallelism == Parallelism::Fixed(0) {
            return Err(DetectError::InvalidConfig(
                "fixed worker count must be at least 1".into(),
            ));
        }
        #[cfg(feature = "parallel")]
        {
            let pool = match parallelism {
                Parallelism::AllCores => None,
                Parallelism::SingleThreaded => Some(build_pool(1)?),
                Parallelism::Fixed(n) => Some(build_pool(n)?),
            };
            Ok(Self { scorer, pool })
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self { scorer })
        }
    }

    /// Run the full scan and reduction over `image`.
    pub fn detect(
        &self,
        image: &ImageU8<'_>,
        params: &ScanParams,
    ) -> Result<ScanReport, DetectError> {
        self.detect_with_cancel(image, params, &|| false)
    }

    /// Like [`detect`](Self::detect), polling `cancel` between levels.
    ///
    /// When `cancel` returns true the scan stops before the next level and
    /// the hits gathered so far are reduced and returned with
    /// `stats.cancelled` set. Cancellation is not an error.
    pub fn detect_with_cancel(
        &self,
        image: &ImageU8<'_>,
        params: &ScanParams,
        cancel: &dyn Fn() -> bool,
    ) -> Result<ScanReport, DetectError> {
        params.validate()?;
        let base_window = params.base_window;
        if !self.scorer.supports_window_size(base_window) {
            return Err(DetectError::UnsupportedWindow(base_window));
        }

        debug!(
            "detect start {}x{} base window {} stride {}",
            image.w, image.h, base_window, params.win_stride
        );
        let total_start = Instant::now();

        let image_size = Size::new(image.w as i32, image.h as i32);
        let pyramid = ScalePyramid::new(image_size, params);
        let mut levels: Vec<PyramidLevel> = pyramid.levels().collect();
        if params.find_biggest {
            levels.reverse();
        }

        let hints = ScorerHints {
            edge_prune: params.edge_prune,
        };
        let mut stats = ScanStats::default();
        let mut raw: Vec<RawDetection> = Vec::new();
        let mut scratch = GrayImageU8::zeroed(0, 0);

        let scan_start = Instant::now();
        for level in &levels {
            if cancel() {
                stats.cancelled = true;
                debug!("scan cancelled before level {}", level.index);
                break;
            }
            level.render(image, &mut scratch);
            let scaled = scratch.as_view();
            let scan = self.run_level(&scaled, level, base_window, params.win_stride, hints);
            stats.levels_scanned += 1;
            stats.windows_evaluated += scan.windows_evaluated;
            stats.scorer_errors += scan.scorer_errors;
            debug!(
                "level {} window {} scaled {}: {} hits from {} windows",
                level.index,
                level.window,
                level.scaled_size,
                scan.detections.len(),
                scan.windows_evaluated
            );
            let had_hits = !scan.detections.is_empty();
            raw.extend(scan.detections);
            // Biggest-only mode scans from the largest window down and stops
            // at the first level that produces hits.
            if params.find_biggest && had_hits {
                break;
            }
        }
        stats.raw_candidates = raw.len();
        stats
            .timing
            .push("scan", scan_start.elapsed().as_secs_f64() * 1000.0);

        let group_start = Instant::now();
        let detections = reduce(&raw, &params.grouping, base_window);
        stats
            .timing
            .push("grouping", group_start.elapsed().as_secs_f64() * 1000.0);
        stats.timing.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "detect done: {} raw candidates over {} levels -> {} detections",
            stats.raw_candidates,
            stats.levels_scanned,
            detections.len()
        );
        Ok(ScanReport { detections, stats })
    }

    fn run_level(
        &self,
        scaled: &ImageU8<'_>,
        level: &PyramidLevel,
        base_window: Size,
        win_stride: Size,
        hints: ScorerHints,
    ) -> LevelScan {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(|| {
                scan_level(
                    scaled,
                    level,
                    self.scorer.as_ref(),
                    base_window,
                    win_stride,
                    hints,
                )
            });
        }
        scan_level(
            scaled,
            level,
            self.scorer.as_ref(),
            base_window,
            win_stride,
            hints,
        )
    }
}

#[cfg(feature = "parallel")]
fn build_pool(threads: usize) -> Result<rayon::ThreadPool, DetectError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|err| DetectError::WorkerPool(err.to_string()))
}

/// Reduce raw hits to final detections under the configured grouping mode.
fn reduce(raw: &[RawDetection], grouping: &GroupingMode, base_window: Size) -> Vec<Detection> {
    if raw.is_empty() {
        return Vec::new();
    }
    match *grouping {
        GroupingMode::None => raw
            .iter()
            .map(|d| Detection {
                rect: d.rect,
                weight: 1,
                score: d.score,
            })
            .collect(),
        GroupingMode::Rectangles {
            group_threshold,
            eps,
        } => {
            let rects: Vec<Rect> = raw.iter().map(|d| d.rect).collect();
            let reject_levels: Vec<u32> = raw.iter().map(|d| d.reject_level).collect();
            let scores: Vec<f64> = raw.iter().map(|d| d.score).collect();
            let (rects, weights, scores) =
                group_rectangles_levels(&rects, &reject_levels, &scores, group_threshold, eps);
            rects
                .into_iter()
                .zip(weights)
                .zip(scores)
                .map(|((rect, weight), score)| Detection {
                    rect,
                    weight,
                    score,
                })
                .collect()
        }
        GroupingMode::MeanShift { detect_threshold } => {
            let rects: Vec<Rect> = raw.iter().map(|d| d.rect).collect();
            let scores: Vec<f64> = raw.iter().map(|d| d.score).collect();
            let scales: Vec<f64> = raw.iter().map(|d| d.scale).collect();
            let (rects, densities) = group_rectangles_meanshift(
                &rects,
                &scores,
                &scales,
                detect_threshold,
                base_window,
            );
            rects
                .into_iter()
                .zip(densities)
                .map(|(rect, score)| Detection {
                    rect,
                    weight: 1,
                    score,
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{ScorerError, WindowScore};
    use std::cell::Cell;

    struct BrightCenter {
        window: Size,
        min_mean: f64,
    }

    impl WindowScorer for BrightCenter {
        fn window_size(&self) -> Size {
            self.window
        }
        fn evaluate(
            &self,
            window: &ImageU8<'_>,
            _hints: ScorerHints,
        ) -> Result<WindowScore, ScorerError> {
            let mut sum = 0u64;
            for y in 0..window.h {
                for x in 0..window.w {
                    sum += window.get(x, y) as u64;
                }
            }
            let mean = sum as f64 / (window.w * window.h) as f64;
            Ok(WindowScore {
                positive: mean >= self.min_mean,
                score: mean / 255.0,
                reject_level: 1,
            })
        }
    }

    fn bright_square(size: usize, square: Rect) -> GrayImageU8 {
        GrayImageU8::from_fn(size, size, |x, y| {
            let inside = (x as i32) >= square.x
                && (x as i32) < square.right()
                && (y as i32) >= square.y
                && (y as i32) < square.bottom();
            if inside {
                220
            } else {
                20
            }
        })
    }

    fn scorer() -> Box<dyn WindowScorer> {
        Box::new(BrightCenter {
            window: Size::new(12, 12),
            min_mean: 160.0,
        })
    }

    fn params() -> ScanParams {
        ScanParams {
            base_window: Size::new(12, 12),
            win_stride: Size::new(2, 2),
            scale_factor: 1.2,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_window_size_the_scorer_cannot_score() {
        let detector = MultiscaleDetector::new(scorer());
        let img = bright_square(64, Rect::new(20, 20, 10, 10));
        let mut p = params();
        p.base_window = Size::new(16, 16);
        let err = detector.detect(&img.as_view(), &p).unwrap_err();
        assert!(matches!(err, DetectError::UnsupportedWindow(_)));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = MultiscaleDetector::with_parallelism(scorer(), Parallelism::Fixed(0))
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidConfig(_)));
    }

    #[test]
    fn groups_single_level_hits_into_one_box() {
        let detector = MultiscaleDetector::new(scorer());
        let img = bright_square(64, Rect::new(24, 24, 16, 16));
        let mut p = params();
        // Capping at the base window keeps the scan on the unscaled level,
        // where the hit grid is exact: a 12x12 window passes the 160 mean
        // at 21 stride positions around the square.
        p.max_window = Size::new(12, 12);
        let report = detector.detect(&img.as_view(), &p).unwrap();
        assert_eq!(report.stats.levels_scanned, 1);
        assert_eq!(report.stats.raw_candidates, 21);
        assert_eq!(report.detections.len(), 1, "{:?}", report.detections);
        let det = &report.detections[0];
        assert_eq!(det.rect, Rect::new(26, 26, 12, 12));
        assert_eq!(det.weight, 21);
        // Cluster score comes from the brightest member, a window fully
        // inside the square.
        assert!((det.score - 220.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn cancellation_stops_after_the_first_level() {
        let detector = MultiscaleDetector::new(scorer());
        let img = bright_square(64, Rect::new(24, 24, 16, 16));
        let polled = Cell::new(0usize);
        let cancel = || {
            polled.set(polled.get() + 1);
            polled.get() > 1
        };
        let report = detector
            .detect_with_cancel(&img.as_view(), &params(), &cancel)
            .unwrap();
        assert!(report.stats.cancelled);
        assert_eq!(report.stats.levels_scanned, 1);
    }

    #[test]
    fn grouping_none_returns_every_raw_hit() {
        let detector = MultiscaleDetector::new(scorer());
        let img = bright_square(64, Rect::new(24, 24, 16, 16));
        let mut p = params();
        p.grouping = GroupingMode::None;
        let report = detector.detect(&img.as_view(), &p).unwrap();
        assert!(report.stats.raw_candidates > 0);
        assert_eq!(report.detections.len(), report.stats.raw_candidates);
        assert!(report.detections.iter().all(|d| d.weight == 1));
    }

    #[test]
    fn empty_image_yields_no_detections() {
        let detector = MultiscaleDetector::new(scorer());
        let img = GrayImageU8::zeroed(64, 64);
        let report = detector.detect(&img.as_view(), &params()).unwrap();
        assert!(report.detections.is_empty());
        assert!(report.stats.windows_evaluated > 0);
        assert!(report.stats.levels_scanned > 1);
    }
}
