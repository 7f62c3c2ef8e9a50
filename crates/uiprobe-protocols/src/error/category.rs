//! Closed failure taxonomy shared by every component.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity attached to an error category; selects the log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The user stopped the run.
    TerminationByUser,
    /// A tool call failed in a way that may succeed on retry.
    TransientToolError,
    /// Retrying cannot help (bad input, auth, budget exhausted).
    NonRetryableError,
    /// A time or attempt bound was exceeded.
    Timeout,
    /// A UI state verification concluded that the expected state is absent.
    VerificationFailed,
    /// Anything not otherwise classified.
    Unknown,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        ErrorCategory::TerminationByUser,
        ErrorCategory::TransientToolError,
        ErrorCategory::NonRetryableError,
        ErrorCategory::Timeout,
        ErrorCategory::VerificationFailed,
        ErrorCategory::Unknown,
    ];

    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::TransientToolError)
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorCategory::TerminationByUser => Severity::Info,
            ErrorCategory::TransientToolError => Severity::Warn,
            ErrorCategory::NonRetryableError => Severity::Error,
            ErrorCategory::Timeout => Severity::Warn,
            ErrorCategory::VerificationFailed => Severity::Error,
            ErrorCategory::Unknown => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::TerminationByUser => "TERMINATION_BY_USER",
            ErrorCategory::TransientToolError => "TRANSIENT_TOOL_ERROR",
            ErrorCategory::NonRetryableError => "NON_RETRYABLE_ERROR",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::VerificationFailed => "VERIFICATION_FAILED",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know which [`ErrorCategory`] they belong to.
pub trait Categorized: std::error::Error + Send + Sync + 'static {
    fn category(&self) -> ErrorCategory;
}

/// A typed, category-bearing failure.
///
/// Raised by the classification framework when it escalates; wraps the
/// original error as its source.
#[derive(Debug, Error)]
#[error("{category}: {message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClassifiedError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any categorized error, keeping it as the source.
    pub fn from_error<E: Categorized>(error: E) -> Self {
        Self {
            category: error.category(),
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::TransientToolError, message)
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NonRetryableError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unknown, message)
    }
}

impl Categorized for ClassifiedError {
    fn category(&self) -> ErrorCategory {
        self.category
    }
}

#[cfg(test)]
#[path = "category_tests.rs"]
mod tests;
