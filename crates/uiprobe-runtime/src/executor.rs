//! Async retry loop driven by error categories.

use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, warn};

use uiprobe_protocols::{Categorized, ClassifiedError};

use crate::handler::ErrorClassifyingHandler;
use crate::retry::{RetryPolicy, RetryState};

/// Retries an operation while its failures are retryable.
///
/// Only [`TransientToolError`](uiprobe_protocols::ErrorCategory::TransientToolError)
/// failures are retried; any other category propagates at once. Exhausting
/// the policy propagates a `Timeout` failure.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    handler: ErrorClassifyingHandler,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            handler: ErrorClassifyingHandler::default(),
        }
    }

    pub fn with_handler(mut self, handler: ErrorClassifyingHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds or the policy gives up.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Categorized,
    {
        let state = RetryState::new();

        loop {
            match operation().await {
                Ok(value) => {
                    if state.attempts() > 0 {
                        debug!("Operation succeeded after {} retries", state.attempts());
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !e.category().is_retryable() {
                        return Err(ClassifiedError::from_error(e));
                    }

                    let message = self.handler.handle(e, &state, &self.policy, true)?;
                    let delay = self.policy.delay_for_attempt(state.attempts() - 1);

                    warn!(
                        "Operation failed (attempt {}/{}): {}, retrying in {:?}",
                        state.attempts(),
                        self.policy.max_retries + 1,
                        message,
                        delay
                    );

                    sleep(delay).await;
                }
            }
        }
    }
}
