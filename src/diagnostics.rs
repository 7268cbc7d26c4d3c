//! Run statistics and timings reported alongside detections.

use crate::types::Detection;
use serde::{Deserialize, Serialize};

/// Timing entry describing a single stage of the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one detect run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }
}

/// Counters describing how much work one detect run performed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    /// Pyramid levels actually scanned (short in biggest-only or cancelled
    /// runs).
    pub levels_scanned: usize,
    /// Windows handed to the scorer across all levels.
    pub windows_evaluated: usize,
    /// Windows skipped because the scorer reported an error.
    pub scorer_errors: usize,
    /// Positive windows before reduction.
    pub raw_candidates: usize,
    /// True when the caller's cancellation check stopped the scan early.
    pub cancelled: bool,
    pub timing: TimingBreakdown,
}

/// Detections plus bookkeeping for one run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub detections: Vec<Detection>,
    pub stats: ScanStats,
}
