//! Embedding model errors.

use thiserror::Error;

use super::{Categorized, ErrorCategory};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding failed: {0}")]
    Failed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Token budget exhausted: {0}")]
    BudgetExceeded(String),
}

impl Categorized for EmbeddingError {
    fn category(&self) -> ErrorCategory {
        match self {
            EmbeddingError::Network(_) => ErrorCategory::TransientToolError,
            EmbeddingError::Api { status, .. } if *status == 429 || *status >= 500 => {
                ErrorCategory::TransientToolError
            }
            EmbeddingError::Api { .. }
            | EmbeddingError::InvalidInput(_)
            | EmbeddingError::BudgetExceeded(_) => ErrorCategory::NonRetryableError,
            EmbeddingError::Failed(_) => ErrorCategory::Unknown,
        }
    }
}

impl From<EmbeddingError> for super::IndexError {
    fn from(err: EmbeddingError) -> Self {
        super::IndexError::Embedding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::Failed("test error".to_string());
        assert_eq!(err.to_string(), "Embedding failed: test error");

        let err = EmbeddingError::InvalidInput("bad input".to_string());
        assert_eq!(err.to_string(), "Invalid input: bad input");
    }

    #[test]
    fn test_budget_exceeded_is_non_retryable() {
        let err = EmbeddingError::BudgetExceeded("101 > 100".to_string());
        assert_eq!(err.category(), ErrorCategory::NonRetryableError);
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let err = EmbeddingError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::TransientToolError);
    }
}
