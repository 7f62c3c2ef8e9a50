//! Runtime errors.

use thiserror::Error;

use uiprobe_protocols::{Categorized, ErrorCategory};

/// Token budget errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Token budget exceeded: used {used} of {ceiling}")]
    Exceeded { used: u64, ceiling: i64 },
}

impl Categorized for BudgetError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::NonRetryableError
    }
}

/// Misuse of the verification manager.
///
/// Ordinary verification failure is never an error: it is a failed
/// [`VerificationSnapshot`](crate::VerificationSnapshot).
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("No verification has been submitted")]
    NotSubmitted,

    #[error("A verification is already running")]
    AlreadyRunning,

    #[error("Verification manager is closed")]
    Closed,

    #[error("Failed to start verification worker: {0}")]
    Runtime(#[from] std::io::Error),
}
