//! Density-mode grouping of weighted detections in (x, y, log-scale) space.
//!
//! Each detection becomes a weighted sample at its window centre with its
//! pyramid scale on a log axis. Samples ascend to the local density mode
//! under a diagonal Gaussian kernel whose spatial bandwidth grows with the
//! sample's scale, converged samples merge into modes, and a mode is kept
//! when the kernel-weighted sample mass around it exceeds the detection
//! threshold.

use crate::types::{Rect, Size};
use log::debug;
use nalgebra::Vector3;

/// Tunables for the mean-shift reduction.
#[derive(Clone, Debug)]
pub struct MeanShiftParams {
    /// Squared normalised step length below which a sample has converged.
    pub mode_eps: f64,
    /// Iteration cap per sample. Hitting it yields a best-effort mode and a
    /// debug log entry, never an error.
    pub max_iterations: usize,
    /// Squared kernel-normalised distance under which two converged samples
    /// collapse into the same mode.
    pub merge_eps: f64,
    /// Kernel bandwidth in (x, y, log-scale). The x/y components are
    /// multiplied by each sample's scale.
    pub kernel: Vector3<f64>,
}

impl Default for MeanShiftParams {
    fn default() -> Self {
        Self {
            mode_eps: 1e-5,
            max_iterations: 20,
            merge_eps: 1.0,
            kernel: Vector3::new(8.0, 16.0, 1.3f64.ln()),
        }
    }
}

/// Mean-shift reduction with default parameters.
///
/// `rects`, `weights` and `scales` run parallel; `win_det_size` is the
/// detector's base window, from which output rectangles are sized as
/// `win_det_size * exp(mode scale)`.
pub fn group_rectangles_meanshift(
    rects: &[Rect],
    weights: &[f64],
    scales: &[f64],
    detect_threshold: f64,
    win_det_size: Size,
) -> (Vec<Rect>, Vec<f64>) {
    group_rectangles_meanshift_with(
        &MeanShiftParams::default(),
        rects,
        weights,
        scales,
        detect_threshold,
        win_det_size,
    )
}

/// Mean-shift reduction with explicit parameters.
pub fn group_rectangles_meanshift_with(
    params: &MeanShiftParams,
    rects: &[Rect],
    weights: &[f64],
    scales: &[f64],
    detect_threshold: f64,
    win_det_size: Size,
) -> (Vec<Rect>, Vec<f64>) {
    assert!(
        rects.len() == weights.len() && rects.len() == scales.len(),
        "per-rectangle inputs must have matching lengths"
    );
    assert!(
        scales.iter().all(|&s| s > 0.0),
        "detection scales must be positive"
    );
    if rects.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let positions: Vec<Vector3<f64>> = rects
        .iter()
        .zip(scales)
        .map(|(r, &s)| {
            Vector3::new(
                r.x as f64 + r.width as f64 * 0.5,
                r.y as f64 + r.height as f64 * 0.5,
                s.ln(),
            )
        })
        .collect();

    let shift = MeanShift {
        positions: &positions,
        weights,
        kernel: params.kernel,
    };

    let mut capped = 0usize;
    let mut converged = Vec::with_capacity(positions.len());
    for start in &positions {
        let (mode, ok) = shift.mode_of(*start, params);
        if !ok {
            capped += 1;
        }
        converged.push(mode);
    }
    if capped > 0 {
        debug!(
            "mean-shift hit the {}-iteration cap for {} of {} samples",
            params.max_iterations,
            capped,
            positions.len()
        );
    }

    let mut modes: Vec<Vector3<f64>> = Vec::new();
    for point in &converged {
        let known = modes
            .iter()
            .any(|m| shift.normalized_dist_sq(point, m) < params.merge_eps);
        if !known {
            modes.push(*point);
        }
    }

    let mut out_rects = Vec::new();
    let mut out_weights = Vec::new();
    for mode in &modes {
        let weight = shift.density(mode);
        if weight <= detect_threshold {
            continue;
        }
        let scale = mode.z.exp();
        let w = (win_det_size.width as f64 * scale).round() as i32;
        let h = (win_det_size.height as f64 * scale).round() as i32;
        out_rects.push(Rect {
            x: (mode.x - w as f64 * 0.5).round() as i32,
            y: (mode.y - h as f64 * 0.5).round() as i32,
            width: w,
            height: h,
        });
        out_weights.push(weight);
    }
    (out_rects, out_weights)
}

struct MeanShift<'a> {
    positions: &'a [Vector3<f64>],
    weights: &'a [f64],
    kernel: Vector3<f64>,
}

impl MeanShift<'_> {
    /// Kernel bandwidth around a sample; x/y widen with the sample's scale.
    fn bandwidth(&self, at: &Vector3<f64>) -> Vector3<f64> {
        let s = at.z.exp();
        Vector3::new(self.kernel.x * s, self.kernel.y * s, self.kernel.z)
    }

    /// One ascent step: the weighted mean of all samples around `point`,
    /// each sample seen through its own bandwidth.
    fn step(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let mut num = Vector3::zeros();
        let mut den = Vector3::zeros();
        for (pos, &w) in self.positions.iter().zip(self.weights) {
            let bw = self.bandwidth(pos);
            let a = pos.component_div(&bw);
            let b = point.component_div(&bw);
            let d = a - b;
            let k = w * (-d.dot(&d) / 2.0).exp();
            num += k * a;
            den += Vector3::new(k / bw.x, k / bw.y, k / bw.z);
        }
        Vector3::new(num.x / den.x, num.y / den.y, num.z / den.z)
    }

    /// Squared distance between `a` and `b`, normalised by the bandwidth
    /// at `b`.
    fn normalized_dist_sq(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let bw = self.bandwidth(b);
        let d = (b - a).component_div(&bw);
        d.dot(&d)
    }

    /// Ascend from `start` until the step length drops under `mode_eps` or
    /// the iteration cap is reached.
    fn mode_of(&self, start: Vector3<f64>, params: &MeanShiftParams) -> (Vector3<f64>, bool) {
        let mut point = start;
        for _ in 0..params.max_iterations {
            let next = self.step(&point);
            let moved = self.normalized_dist_sq(&next, &point);
            point = next;
            if moved <= params.mode_eps {
                return (point, true);
            }
        }
        (point, false)
    }

    /// Kernel-weighted sample mass at `point`. Coincident samples sum their
    /// weights exactly.
    fn density(&self, point: &Vector3<f64>) -> f64 {
        let mut sum = 0.0;
        for (pos, &w) in self.positions.iter().zip(self.weights) {
            let bw = self.bandwidth(pos);
            let d = (pos - point).component_div(&bw);
            sum += w * (-d.dot(&d) / 2.0).exp();
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: Size = Size::new(64, 128);

    #[test]
    fn coincident_samples_sum_their_weights() {
        let rects = [Rect::new(50, 60, 64, 128), Rect::new(50, 60, 64, 128)];
        let weights = [1.5, 2.5];
        let scales = [1.0, 1.0];
        let (boxes, out) = group_rectangles_meanshift(&rects, &weights, &scales, 2.0, WIN);
        assert_eq!(boxes.len(), 1);
        assert!(
            (out[0] - 4.0).abs() < 1e-9,
            "cluster weight should be the exact sum, got {}",
            out[0]
        );
        assert_eq!(boxes[0], Rect::new(50, 60, 64, 128));
    }

    #[test]
    fn overlapping_samples_merge_into_one_mode() {
        let rects = [Rect::new(50, 60, 64, 128), Rect::new(54, 62, 64, 128)];
        let weights = [2.0, 2.0];
        let scales = [1.0, 1.0];
        let (boxes, out) = group_rectangles_meanshift(&rects, &weights, &scales, 1.0, WIN);
        assert_eq!(boxes.len(), 1, "near hits should merge: {boxes:?}");
        assert!(out[0] > 3.5 && out[0] <= 4.0, "merged weight ~sum, got {}", out[0]);
    }

    #[test]
    fn distant_samples_stay_separate() {
        let rects = [Rect::new(10, 10, 64, 128), Rect::new(400, 300, 64, 128)];
        let weights = [2.0, 3.0];
        let scales = [1.0, 1.0];
        let (boxes, out) = group_rectangles_meanshift(&rects, &weights, &scales, 1.0, WIN);
        assert_eq!(boxes.len(), 2);
        assert!((out[0] - 2.0).abs() < 1e-6);
        assert!((out[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn weak_modes_fall_under_the_threshold() {
        let rects = [Rect::new(10, 10, 64, 128)];
        let (boxes, out) = group_rectangles_meanshift(&rects, &[0.5], &[1.0], 2.0, WIN);
        assert!(boxes.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let (boxes, out) = group_rectangles_meanshift(&[], &[], &[], 2.0, WIN);
        assert!(boxes.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn scale_shapes_the_output_rectangle() {
        // A single sample at scale 2 reports a window twice the base size
        // centred on the sample.
        let rects = [Rect::new(100, 100, 128, 256)];
        let (boxes, _) = group_rectangles_meanshift(&rects, &[3.0], &[2.0], 1.0, WIN);
        // Sizes round half away from zero, so exp(ln 2) landing a hair off
        // 2 still reports the exact doubled window.
        assert_eq!(boxes, vec![Rect::new(100, 100, 128, 256)]);
    }
}
