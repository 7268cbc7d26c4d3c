use crate::types::Size;
use err_derive::Error;

/// Errors surfaced by the detection API.
///
/// Per-window scorer failures are not represented here; the scanner skips
/// the affected window and counts it in the run statistics.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The scan parameters failed validation; nothing was scanned.
    #[error(display = "invalid scan configuration: {}", _0)]
    InvalidConfig(String),

    /// The scorer does not accept the configured base window.
    #[error(display = "scorer does not support a {} base window", _0)]
    UnsupportedWindow(Size),

    /// The dedicated worker pool could not be constructed.
    #[error(display = "worker pool construction failed: {}", _0)]
    WorkerPool(String),
}
