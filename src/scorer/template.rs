//! Normalised cross-correlation against a fixed grayscale template.

use super::{ScorerError, ScorerHints, WindowScore, WindowScorer};
use crate::image::{GrayImageU8, ImageU8, ImageView};
use crate::types::Size;

/// Minimum per-pixel standard deviation (in gray levels) for a window to be
/// worth correlating when edge pruning is requested.
const MIN_WINDOW_SIGMA: f64 = 4.0;

/// Reference scorer: zero-mean normalised cross-correlation.
///
/// A window is positive when its correlation with the template exceeds the
/// threshold. Correlation is scale- and offset-invariant in intensity, so a
/// darker or brighter rendition of the template still matches.
#[derive(Clone, Debug)]
pub struct TemplateScorer {
    template: GrayImageU8,
    threshold: f64,
    t_mean: f64,
    t_norm: f64,
}

impl TemplateScorer {
    /// Build a scorer from a template and a correlation threshold in
    /// `[-1, 1]`.
    pub fn new(template: GrayImageU8, threshold: f64) -> Self {
        assert!(
            template.width() > 0 && template.height() > 0,
            "template must be non-empty"
        );
        let n = (template.width() * template.height()) as f64;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for row in template.rows() {
            for &v in row {
                let v = v as f64;
                sum += v;
                sum_sq += v * v;
            }
        }
        let t_mean = sum / n;
        let t_norm = (sum_sq - sum * sum / n).max(0.0).sqrt();
        Self {
            template,
            threshold,
            t_mean,
            t_norm,
        }
    }
}

impl WindowScorer for TemplateScorer {
    fn window_size(&self) -> Size {
        Size {
            width: self.template.width() as i32,
            height: self.template.height() as i32,
        }
    }

    fn evaluate(
        &self,
        window: &ImageU8<'_>,
        hints: ScorerHints,
    ) -> Result<WindowScore, ScorerError> {
        let (tw, th) = (self.template.width(), self.template.height());
        if window.w != tw || window.h != th {
            return Err(ScorerError(format!(
                "window {}x{} does not match template {tw}x{th}",
                window.w, window.h
            )));
        }

        let n = (tw * th) as f64;
        let mut sum_w = 0.0f64;
        let mut sum_w_sq = 0.0f64;
        let mut sum_wt = 0.0f64;
        for (wrow, trow) in window.rows().zip(self.template.rows()) {
            for (&wv, &tv) in wrow.iter().zip(trow.iter()) {
                let wv = wv as f64;
                sum_w += wv;
                sum_w_sq += wv * wv;
                sum_wt += wv * tv as f64;
            }
        }

        let w_norm = (sum_w_sq - sum_w * sum_w / n).max(0.0).sqrt();
        if hints.edge_prune && w_norm < MIN_WINDOW_SIGMA * n.sqrt() {
            // Too flat to contain the template.
            return Ok(WindowScore {
                positive: false,
                score: 0.0,
                reject_level: 0,
            });
        }

        let denom = w_norm * self.t_norm;
        let score = if denom > f64::EPSILON {
            (sum_wt - self.t_mean * sum_w) / denom
        } else {
            0.0
        };

        Ok(WindowScore {
            positive: score >= self.threshold,
            score,
            reject_level: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_template() -> GrayImageU8 {
        GrayImageU8::from_fn(8, 8, |x, y| (x * 20 + y * 10) as u8)
    }

    #[test]
    fn template_matches_itself_perfectly() {
        let tpl = gradient_template();
        let scorer = TemplateScorer::new(tpl.clone(), 0.9);
        let score = scorer
            .evaluate(&tpl.as_view(), ScorerHints::default())
            .unwrap();
        assert!(score.positive);
        assert!(
            (score.score - 1.0).abs() < 1e-9,
            "self correlation should be 1, got {}",
            score.score
        );
    }

    #[test]
    fn brightness_shift_does_not_change_score() {
        let tpl = gradient_template();
        let shifted = GrayImageU8::from_fn(8, 8, |x, y| (x * 20 + y * 10 + 40) as u8);
        let scorer = TemplateScorer::new(tpl, 0.9);
        let score = scorer
            .evaluate(&shifted.as_view(), ScorerHints::default())
            .unwrap();
        assert!((score.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flat_window_pruned_when_hinted() {
        let scorer = TemplateScorer::new(gradient_template(), 0.5);
        let flat = GrayImageU8::from_fn(8, 8, |_, _| 120);
        let pruned = scorer
            .evaluate(&flat.as_view(), ScorerHints { edge_prune: true })
            .unwrap();
        assert!(!pruned.positive);
        assert_eq!(pruned.score, 0.0);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let scorer = TemplateScorer::new(gradient_template(), 0.5);
        let wrong = GrayImageU8::zeroed(10, 8);
        assert!(scorer
            .evaluate(&wrong.as_view(), ScorerHints::default())
            .is_err());
        assert!(!scorer.supports_window_size(Size::new(10, 8)));
        assert!(scorer.supports_window_size(Size::new(8, 8)));
    }
}
