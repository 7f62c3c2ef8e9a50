//! Category-driven retry decisions.

use std::collections::HashSet;

use tracing::{error, info, warn};

use uiprobe_protocols::{Categorized, ClassifiedError, ErrorCategory, Severity};

use crate::retry::{RetryPolicy, RetryState};

/// Decides whether a failure is absorbed or propagated.
///
/// Categories in the terminal set abort immediately. Everything else is
/// counted against the [`RetryPolicy`]; when the policy is exhausted the
/// failure escalates as [`ErrorCategory::Timeout`], whether the bound that
/// tripped was elapsed time or the attempt count.
#[derive(Debug, Clone)]
pub struct ErrorClassifyingHandler {
    terminal: HashSet<ErrorCategory>,
}

impl Default for ErrorClassifyingHandler {
    fn default() -> Self {
        Self {
            terminal: [
                ErrorCategory::NonRetryableError,
                ErrorCategory::Timeout,
                ErrorCategory::VerificationFailed,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl ErrorClassifyingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category to the terminal set.
    pub fn with_terminal(mut self, category: ErrorCategory) -> Self {
        self.terminal.insert(category);
        self
    }

    /// Remove a category from the terminal set.
    pub fn without_terminal(mut self, category: ErrorCategory) -> Self {
        self.terminal.remove(&category);
        self
    }

    pub fn is_terminal(&self, category: ErrorCategory) -> bool {
        self.terminal.contains(&category)
    }

    /// Handle one failure of a retry sequence.
    ///
    /// Returns the error message when the failure is absorbed. Terminal
    /// failures propagate without touching `state`. With `fail_on_timeout`
    /// false, exhaustion never propagates.
    pub fn handle<E: Categorized>(
        &self,
        error: E,
        state: &RetryState,
        policy: &RetryPolicy,
        fail_on_timeout: bool,
    ) -> Result<String, ClassifiedError> {
        let category = error.category();
        if self.is_terminal(category) {
            log_failure(category, &error.to_string());
            return Err(ClassifiedError::from_error(error));
        }

        state.start_clock();
        let attempts = state.record_attempt();
        let message = error.to_string();
        log_failure(category, &message);

        if fail_on_timeout {
            if let Some(timeout) = policy.timeout {
                let elapsed = state.elapsed();
                if elapsed > timeout {
                    warn!("Retry time bound exceeded after {:?}: {}", elapsed, message);
                    return Err(ClassifiedError::timeout(format!(
                        "Timed out after {}ms: {}",
                        elapsed.as_millis(),
                        message
                    ))
                    .with_source(ClassifiedError::from_error(error)));
                }
            }

            if attempts > policy.max_retries {
                warn!("Retries exhausted after {} attempts: {}", attempts, message);
                return Err(ClassifiedError::timeout(format!(
                    "Max retries ({}) exceeded: {}",
                    policy.max_retries, message
                ))
                .with_source(ClassifiedError::from_error(error)));
            }
        }

        Ok(message)
    }
}

fn log_failure(category: ErrorCategory, message: &str) {
    match category.severity() {
        Severity::Info => info!("[{}] {}", category, message),
        Severity::Warn => warn!("[{}] {}", category, message),
        Severity::Error => error!("[{}] {}", category, message),
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
