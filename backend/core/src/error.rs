use thiserror::Error;

use crate::validate::RejectReason;

/// Top-level error taxonomy for the PostLens runtime.
///
/// Per-image failures are carried as values inside `ExtractionResult`; the
/// `Display` strings below are exactly what callers see in those results.
#[derive(Debug, Error)]
pub enum LensError {
    /// A file failed the upload allow-list or size ceiling.
    #[error("{0}")]
    ValidationRejected(String),

    /// The understanding service returned non-2xx, timed out, or was
    /// unreachable. `detail` is for logs only.
    #[error("Failed to process image with {service}")]
    RemoteCallFailed { service: String, detail: String },

    /// The structured answer parsed but its confidence was under threshold.
    #[error("Markdown confidence too low")]
    LowConfidence { confidence: f64 },

    /// The notification sink rejected the formatted output.
    #[error("Failed to send message to {sink}")]
    RelayFailed { sink: String, detail: String },

    /// Anything unexpected during orchestration.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<RejectReason> for LensError {
    fn from(reason: RejectReason) -> Self {
        LensError::ValidationRejected(reason.to_string())
    }
}
