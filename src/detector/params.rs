//! Scan-time configuration for the multiscale detector.
//!
//! Defaults follow common cascade-detector practice: a tenth-step scale
//! ladder, a two-pixel stride and neighbour-count grouping. For tuning,
//! start with `scale_factor` (coverage vs. cost) and the grouping
//! threshold (recall vs. duplicate suppression).

use crate::error::DetectError;
use crate::types::Size;

/// How raw window hits are reduced into final detections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GroupingMode {
    /// Keep every raw hit, weight 1 each.
    None,
    /// Union-find clustering over the rectangle-similarity predicate.
    Rectangles { group_threshold: usize, eps: f64 },
    /// Mean-shift density modes in (x, y, log-scale) space.
    MeanShift { detect_threshold: f64 },
}

impl Default for GroupingMode {
    fn default() -> Self {
        GroupingMode::Rectangles {
            group_threshold: 3,
            eps: 0.2,
        }
    }
}

/// Parameters of one multiscale scan, immutable for the duration of a run.
#[derive(Clone, Debug)]
pub struct ScanParams {
    /// Window size the scorer evaluates, in scaled-image pixels.
    pub base_window: Size,
    /// Scan grid step in x and y, in scaled-image pixels (>= 1 each).
    pub win_stride: Size,
    /// Geometric growth of the effective window between levels (> 1).
    pub scale_factor: f64,
    /// Smallest effective window to report; empty means unbounded.
    pub min_window: Size,
    /// Largest effective window to report; empty means unbounded.
    pub max_window: Size,
    /// Reduction applied to the raw hits.
    pub grouping: GroupingMode,
    /// Scan levels from the largest window downward and stop at the first
    /// level that yields a hit.
    pub find_biggest: bool,
    /// Forwarded to the scorer so it may skip low-texture windows early.
    pub edge_prune: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            base_window: Size::new(24, 24),
            win_stride: Size::new(2, 2),
            scale_factor: 1.1,
            min_window: Size::default(),
            max_window: Size::default(),
            grouping: GroupingMode::default(),
            find_biggest: false,
            edge_prune: false,
        }
    }
}

impl ScanParams {
    /// Check every invariant that must hold before any scanning starts.
    ///
    /// Runs never produce partial results for configuration problems; this
    /// rejects them up front.
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.base_window.is_empty() {
            return Err(DetectError::InvalidConfig(format!(
                "base window must be non-empty, got {}",
                self.base_window
            )));
        }
        if self.win_stride.width < 1 || self.win_stride.height < 1 {
            return Err(DetectError::InvalidConfig(format!(
                "window stride must be at least 1x1, got {}",
                self.win_stride
            )));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(DetectError::InvalidConfig(format!(
                "scale factor must exceed 1, got {}",
                self.scale_factor
            )));
        }
        if !self.min_window.is_empty()
            && !self.max_window.is_empty()
            && (self.min_window.width > self.max_window.width
                || self.min_window.height > self.max_window.height)
        {
            return Err(DetectError::InvalidConfig(format!(
                "min window {} exceeds max window {}",
                self.min_window, self.max_window
            )));
        }
        match self.grouping {
            GroupingMode::Rectangles { eps, .. } => {
                if !eps.is_finite() || eps < 0.0 {
                    return Err(DetectError::InvalidConfig(format!(
                        "grouping eps must be non-negative, got {eps}"
                    )));
                }
            }
            GroupingMode::MeanShift { detect_threshold } => {
                if !detect_threshold.is_finite() {
                    return Err(DetectError::InvalidConfig(format!(
                        "detect threshold must be finite, got {detect_threshold}"
                    )));
                }
            }
            GroupingMode::None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(ScanParams::default().validate().is_ok());
    }

    #[test]
    fn bad_configs_are_rejected() {
        let mut p = ScanParams::default();
        p.win_stride = Size::new(0, 2);
        assert!(p.validate().is_err());

        let mut p = ScanParams::default();
        p.scale_factor = 1.0;
        assert!(p.validate().is_err());

        let mut p = ScanParams::default();
        p.base_window = Size::new(0, 24);
        assert!(p.validate().is_err());

        let mut p = ScanParams::default();
        p.min_window = Size::new(60, 60);
        p.max_window = Size::new(40, 40);
        assert!(p.validate().is_err());

        let mut p = ScanParams::default();
        p.grouping = GroupingMode::Rectangles {
            group_threshold: 3,
            eps: -0.1,
        };
        assert!(p.validate().is_err());
    }
}
