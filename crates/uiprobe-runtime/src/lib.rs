//! # uiprobe Runtime
//!
//! Resilience layer of the perception engine:
//!
//! - [`RetryPolicy`] / [`RetryState`] - immutable limits and per-sequence counters
//! - [`ErrorClassifyingHandler`] - retry-or-propagate decisions over [`ErrorCategory`]
//! - [`RetryExecutor`] - async retry loop with exponential backoff
//! - [`VerificationManager`] - bounded retry/timeout loop on a dedicated worker thread
//! - [`BudgetManager`] - token usage ledger with ceiling enforcement
//!
//! [`ErrorCategory`]: uiprobe_protocols::ErrorCategory

pub mod budget;
pub mod error;
pub mod executor;
pub mod handler;
pub mod retry;
pub mod verification;

pub use budget::{BudgetManager, BudgetTotals};
pub use error::{BudgetError, VerificationError};
pub use executor::RetryExecutor;
pub use handler::ErrorClassifyingHandler;
pub use retry::{RetryPolicy, RetryState};
pub use verification::{VerificationManager, VerificationSnapshot, VerificationStatus};
