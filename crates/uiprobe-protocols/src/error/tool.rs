//! Tool execution errors.

use thiserror::Error;

use super::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution timed out after {0} seconds")]
    Timeout(u64),

    #[error("Tool execution was cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Categorized for ToolError {
    fn category(&self) -> ErrorCategory {
        match self {
            ToolError::ExecutionFailed(_) | ToolError::Io(_) => ErrorCategory::TransientToolError,
            ToolError::NotFound(_) | ToolError::InvalidParameters(_) => {
                ErrorCategory::NonRetryableError
            }
            ToolError::Timeout(_) => ErrorCategory::Timeout,
            ToolError::Cancelled => ErrorCategory::TerminationByUser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_not_found() {
        let err = ToolError::NotFound("test_tool".to_string());
        assert!(err.to_string().contains("Tool not found"));
        assert_eq!(err.category(), ErrorCategory::NonRetryableError);
    }

    #[test]
    fn test_tool_error_timeout() {
        let err = ToolError::Timeout(30);
        assert!(err.to_string().contains("timed out"));
        assert_eq!(err.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn test_cancelled_is_user_termination() {
        assert_eq!(
            ToolError::Cancelled.category(),
            ErrorCategory::TerminationByUser
        );
    }

    #[test]
    fn test_tool_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ToolError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
        assert_eq!(err.category(), ErrorCategory::TransientToolError);
    }
}
