//! Retry policy and per-sequence retry state.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use uiprobe_config::RetryPolicyConfig;

/// Retry limits for one kind of operation.
///
/// Built once from configuration and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Overall time bound; `None` is unbounded.
    pub timeout: Option<Duration>,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryPolicyConfig::tool())
    }
}

impl RetryPolicy {
    /// Fixed-delay policy. `timeout_ms <= 0` means unbounded.
    pub fn new(max_retries: u32, base_delay_ms: u64, timeout_ms: i64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            timeout: timeout_from_millis(timeout_ms),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// A single attempt, no waiting.
    pub fn fail_fast() -> Self {
        Self::new(0, 0, 0)
    }

    /// Enable exponential backoff capped at `max_delay`.
    pub fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.backoff_multiplier = multiplier;
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let delay = delay.min(self.max_delay.as_millis() as f64).max(0.0);
        Duration::from_millis(delay as u64)
    }
}

impl From<&RetryPolicyConfig> for RetryPolicy {
    fn from(config: &RetryPolicyConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            timeout: timeout_from_millis(config.timeout_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

fn timeout_from_millis(timeout_ms: i64) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms as u64))
}

/// Mutable counters of one retry sequence.
///
/// Exactly one per logical sequence; the atomics only make a stray shared
/// reference harmless.
#[derive(Debug, Default)]
pub struct RetryState {
    attempts: AtomicU32,
    started_at: OnceLock<Instant>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Count one more attempt and return the new total.
    pub fn record_attempt(&self) -> u32 {
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start the clock on first call; later calls return the original instant.
    pub fn start_clock(&self) -> Instant {
        *self.started_at.get_or_init(Instant::now)
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }

    /// Time since the clock started, zero if it has not.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .get()
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Restart the sequence.
    pub fn reset(&mut self) {
        self.attempts = AtomicU32::new(0);
        self.started_at = OnceLock::new();
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
