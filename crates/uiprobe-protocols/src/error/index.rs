//! Element index (vector store) errors.

use thiserror::Error;

use super::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A background task of the index client failed (panicked or was aborted).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Categorized for IndexError {
    fn category(&self) -> ErrorCategory {
        match self {
            IndexError::Connection(_) => ErrorCategory::TransientToolError,
            IndexError::Request { status, .. } if *status == 429 || *status >= 500 => {
                ErrorCategory::TransientToolError
            }
            IndexError::Request { .. } => ErrorCategory::NonRetryableError,
            IndexError::DimensionMismatch { .. } => ErrorCategory::NonRetryableError,
            IndexError::Serialization(_) => ErrorCategory::NonRetryableError,
            IndexError::Embedding(_) | IndexError::Internal(_) => ErrorCategory::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_is_transient() {
        let err = IndexError::Connection("refused".to_string());
        assert_eq!(err.category(), ErrorCategory::TransientToolError);
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_request_status_classification() {
        let server = IndexError::Request {
            status: 503,
            message: "unavailable".to_string(),
        };
        let client = IndexError::Request {
            status: 400,
            message: "bad".to_string(),
        };
        assert_eq!(server.category(), ErrorCategory::TransientToolError);
        assert_eq!(client.category(), ErrorCategory::NonRetryableError);
    }

    #[test]
    fn test_internal_is_unknown() {
        let err = IndexError::Internal("task panicked".to_string());
        assert_eq!(err.category(), ErrorCategory::Unknown);
        assert_eq!(err.to_string(), "Internal error: task panicked");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = IndexError::DimensionMismatch {
            expected: 128,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "Vector dimension mismatch: expected 128, got 64"
        );
    }
}
