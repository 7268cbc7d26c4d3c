//! Scale-level geometry for the multiscale scan.
//!
//! The scan keeps the window at the scorer's base size and shrinks the image
//! instead: every level renders the input downscaled by `scale` and the
//! effective detection window in base-image pixels grows as
//! `base_window * scale`. Level geometry is generated lazily; rendering into
//! a caller-owned scratch buffer happens only for levels that are actually
//! scanned.

use crate::detector::ScanParams;
use crate::image::{resize_bilinear_into, GrayImageU8, ImageU8};
use crate::types::Size;

/// Geometry of one scale step.
#[derive(Clone, Copy, Debug)]
pub struct PyramidLevel {
    /// Zero-based index in generation order (smallest window first).
    pub index: usize,
    /// Base-image pixels per scaled-image pixel at this level.
    pub scale: f64,
    /// Effective window size in base-image pixels.
    pub window: Size,
    /// Dimensions of the downscaled image the base window slides over.
    pub scaled_size: Size,
}

impl PyramidLevel {
    /// Render the downscaled image for this level into `scratch`.
    pub fn render(&self, image: &ImageU8<'_>, scratch: &mut GrayImageU8) {
        scratch.resize_to(self.scaled_size.width as usize, self.scaled_size.height as usize);
        resize_bilinear_into(image, scratch);
    }
}

/// Lazy generator of the scan levels for one image/parameter pair.
///
/// The sequence is finite and restartable: `levels()` can be called any
/// number of times and always yields the same geometry.
#[derive(Clone, Debug)]
pub struct ScalePyramid {
    image_size: Size,
    base_window: Size,
    min_window: Size,
    max_window: Size,
    scale_factor: f64,
}

impl ScalePyramid {
    /// Capture the level geometry for `image_size` under `params`.
    ///
    /// `params.scale_factor` must exceed 1; `detect` validates this before
    /// construction.
    pub fn new(image_size: Size, params: &ScanParams) -> Self {
        assert!(
            params.scale_factor > 1.0,
            "scale factor must exceed 1, got {}",
            params.scale_factor
        );
        Self {
            image_size,
            base_window: params.base_window,
            min_window: params.min_window,
            max_window: params.max_window,
            scale_factor: params.scale_factor,
        }
    }

    /// Iterate levels from the smallest effective window upward.
    pub fn levels(&self) -> Levels {
        Levels {
            image_size: self.image_size,
            base_window: self.base_window,
            min_window: self.min_window,
            max_window: self.max_window,
            scale_factor: self.scale_factor,
            factor: 1.0,
            index: 0,
            last_window: None,
        }
    }
}

/// Iterator over [`PyramidLevel`]s.
pub struct Levels {
    image_size: Size,
    base_window: Size,
    min_window: Size,
    max_window: Size,
    scale_factor: f64,
    factor: f64,
    index: usize,
    last_window: Option<Size>,
}

impl Iterator for Levels {
    type Item = PyramidLevel;

    fn next(&mut self) -> Option<PyramidLevel> {
        loop {
            let factor = self.factor;
            let window = self.base_window.scaled(factor);
            let scaled_size = Size {
                width: (self.image_size.width as f64 / factor).round() as i32,
                height: (self.image_size.height as f64 / factor).round() as i32,
            };

            // The scaled image must still hold at least one base window.
            if scaled_size.width < self.base_window.width
                || scaled_size.height < self.base_window.height
            {
                return None;
            }
            if !self.max_window.is_empty()
                && (window.width > self.max_window.width
                    || window.height > self.max_window.height)
            {
                return None;
            }

            self.factor *= self.scale_factor;

            if window.width < self.min_window.width || window.height < self.min_window.height {
                continue;
            }
            // Rounding can repeat a window size for tiny base windows; such
            // levels would rescan the same geometry.
            if self.last_window == Some(window) {
                continue;
            }
            self.last_window = Some(window);

            let level = PyramidLevel {
                index: self.index,
                scale: factor,
                window,
                scaled_size,
            };
            self.index += 1;
            return Some(level);
        }
    }
}
