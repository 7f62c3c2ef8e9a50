//! Vision errors.

use thiserror::Error;

use uiprobe_protocols::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid {axis} scale factor: {value}")]
    InvalidScale { axis: &'static str, value: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for VisionError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => VisionError::Io(e),
            other => VisionError::Decode(other.to_string()),
        }
    }
}

impl Categorized for VisionError {
    fn category(&self) -> ErrorCategory {
        match self {
            VisionError::Decode(_) | VisionError::InvalidScale { .. } => {
                ErrorCategory::NonRetryableError
            }
            VisionError::Io(_) => ErrorCategory::TransientToolError,
        }
    }
}
