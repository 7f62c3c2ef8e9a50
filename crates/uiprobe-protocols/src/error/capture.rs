//! Screen capture errors.

use thiserror::Error;

use super::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("No monitor found")]
    NoMonitor,
}

impl Categorized for CaptureError {
    fn category(&self) -> ErrorCategory {
        match self {
            CaptureError::CaptureFailed(_) => ErrorCategory::TransientToolError,
            CaptureError::EncodingFailed(_) => ErrorCategory::Unknown,
            CaptureError::NoMonitor => ErrorCategory::NonRetryableError,
        }
    }
}
