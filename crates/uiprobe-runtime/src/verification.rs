//! Bounded retry/timeout verification loop.
//!
//! A [`VerificationManager`] owns one dedicated worker thread. Each submitted
//! verification captures the screen, runs the caller's check against it and
//! records a [`VerificationSnapshot`], repeating until the check passes or the
//! [`RetryPolicy`] is exhausted. Exhaustion is not an error: waiting callers
//! get the last snapshot, which carries the failure evidence.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use uiprobe_protocols::{CheckOutcome, ScreenCapture, Screenshot, VerificationCheck};

use crate::error::VerificationError;
use crate::retry::RetryPolicy;

const WORKER_THREAD_NAME: &str = "uiprobe-verification";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Idle,
    Running,
    /// Cancellation requested; the worker has not yet left the current attempt.
    Cancelling,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

impl VerificationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Cancelled
        )
    }
}

/// Result of the most recent attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSnapshot {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Screenshot>,
    /// 1-based attempt that produced this snapshot; 0 when synthesized.
    pub attempt: u32,
    pub recorded_at: DateTime<Utc>,
}

impl VerificationSnapshot {
    pub fn failure(message: impl Into<String>, attempt: u32) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
            screenshot: None,
            attempt,
            recorded_at: Utc::now(),
        }
    }

    fn from_outcome(outcome: CheckOutcome, screenshot: Screenshot, attempt: u32) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            payload: outcome.payload,
            screenshot: Some(screenshot),
            attempt,
            recorded_at: Utc::now(),
        }
    }
}

/// Shared state of one submitted verification.
///
/// `status` is the source of truth. Blocking waiters sleep on `changed` so
/// their deadline never depends on the worker runtime's timer; async waiters
/// follow the `watch` mirror.
struct Run {
    status: Mutex<VerificationStatus>,
    changed: Condvar,
    notify: watch::Sender<VerificationStatus>,
    snapshot: Mutex<Option<VerificationSnapshot>>,
    fault: Mutex<Option<String>>,
    attempts: AtomicU32,
    cancel: CancellationToken,
}

impl Run {
    fn new() -> Self {
        let (notify, _) = watch::channel(VerificationStatus::Running);
        Self {
            status: Mutex::new(VerificationStatus::Running),
            changed: Condvar::new(),
            notify,
            snapshot: Mutex::new(None),
            fault: Mutex::new(None),
            attempts: AtomicU32::new(0),
            cancel: CancellationToken::new(),
        }
    }

    fn status(&self) -> VerificationStatus {
        *self.status.lock()
    }

    fn transition(
        &self,
        next: impl FnOnce(VerificationStatus) -> Option<VerificationStatus>,
    ) -> bool {
        let mut status = self.status.lock();
        let Some(next) = next(*status) else {
            return false;
        };
        *status = next;
        self.notify.send_replace(next);
        self.changed.notify_all();
        true
    }

    /// Move to a terminal status unless already finished. A run that was
    /// asked to cancel always ends as `Cancelled`.
    fn finish(&self, next: VerificationStatus) -> bool {
        self.transition(|current| match current {
            s if s.is_terminal() => None,
            VerificationStatus::Cancelling => Some(VerificationStatus::Cancelled),
            _ => Some(next),
        })
    }

    /// Signal the worker. The run stays `Cancelling` until the worker exits.
    fn request_cancel(&self) -> bool {
        self.cancel.cancel();
        self.transition(|current| {
            (current == VerificationStatus::Running).then_some(VerificationStatus::Cancelling)
        })
    }

    /// Block until terminal or `timeout`; true when terminal.
    fn wait_terminal(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut status = self.status.lock();
        while !status.is_terminal() {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut status, deadline).timed_out() {
                        return status.is_terminal();
                    }
                }
                None => self.changed.wait(&mut status),
            }
        }
        true
    }

    fn record(&self, snapshot: VerificationSnapshot) {
        *self.snapshot.lock() = Some(snapshot);
    }

    /// Last snapshot, or a synthesized failure when no attempt completed.
    fn result(&self) -> VerificationSnapshot {
        if let Some(snapshot) = self.snapshot.lock().clone() {
            return snapshot;
        }
        let message = match self.fault.lock().clone() {
            Some(fault) => format!("Verification worker failed: {}", fault),
            None if self.cancel.is_cancelled() => {
                "Verification cancelled before any attempt completed".to_string()
            }
            None => "No verification attempt completed".to_string(),
        };
        VerificationSnapshot::failure(message, 0)
    }
}

/// Marks the run finished when the worker task ends, including when the
/// task is dropped by a runtime shutdown.
struct WorkerExit(Arc<Run>);

impl Drop for WorkerExit {
    fn drop(&mut self) {
        self.0.finish(VerificationStatus::Cancelled);
    }
}

/// Runs verifications on a dedicated single worker thread.
///
/// At most one verification is in flight: [`submit`](Self::submit) rejects
/// until the previous worker task has actually exited, including one that
/// was cancelled but is still inside a check. Blocking waits are timed on the
/// caller's thread, so a check that blocks the worker cannot stretch them;
/// prefer [`wait_for_completion_async`](Self::wait_for_completion_async)
/// inside async code.
pub struct VerificationManager {
    runtime: Mutex<Option<Runtime>>,
    capture: Arc<dyn ScreenCapture>,
    current: Mutex<Option<Arc<Run>>>,
}

impl VerificationManager {
    /// Start the worker thread.
    pub fn new(capture: Arc<dyn ScreenCapture>) -> Result<Self, VerificationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()?;
        debug!("Verification worker started");

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            capture,
            current: Mutex::new(None),
        })
    }

    /// Start a verification in the background and return immediately.
    pub fn submit(
        &self,
        check: Arc<dyn VerificationCheck>,
        policy: RetryPolicy,
    ) -> Result<(), VerificationError> {
        let runtime = self.runtime.lock();
        let runtime = runtime.as_ref().ok_or(VerificationError::Closed)?;

        let mut current = self.current.lock();
        if let Some(run) = current.as_ref() {
            if !run.status().is_terminal() {
                return Err(VerificationError::AlreadyRunning);
            }
        }

        let run = Arc::new(Run::new());
        info!(
            "Submitting verification: max_retries={}, timeout={:?}",
            policy.max_retries, policy.timeout
        );
        let capture = self.capture.clone();
        let worker_run = run.clone();
        runtime.spawn(async move {
            let _exit = WorkerExit(worker_run.clone());
            run_verification(capture, check, policy, worker_run).await;
        });
        *current = Some(run);
        Ok(())
    }

    pub fn status(&self) -> VerificationStatus {
        self.current
            .lock()
            .as_ref()
            .map(|run| run.status())
            .unwrap_or(VerificationStatus::Idle)
    }

    /// Attempts made by the current verification.
    pub fn attempts(&self) -> u32 {
        self.current
            .lock()
            .as_ref()
            .map(|run| run.attempts.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn last_snapshot(&self) -> Option<VerificationSnapshot> {
        self.current
            .lock()
            .as_ref()
            .and_then(|run| run.snapshot.lock().clone())
    }

    /// Request cancellation. Takes effect between attempts; a running check
    /// is never interrupted, so the status stays `Cancelling` until the
    /// worker leaves it. Returns false when nothing was running.
    pub fn cancel(&self) -> bool {
        let Some(run) = self.current.lock().clone() else {
            return false;
        };
        run.request_cancel()
    }

    /// Block up to `timeout` for the current verification to finish.
    ///
    /// On timeout the verification is cancelled and the last snapshot is
    /// returned. Only misuse is an error.
    pub fn wait_for_completion(
        &self,
        timeout: Duration,
    ) -> Result<VerificationSnapshot, VerificationError> {
        let run = self.current_run()?;
        if !run.wait_terminal(timeout) {
            cancel_after_timeout(&run, timeout);
        }
        Ok(run.result())
    }

    /// Async form of [`wait_for_completion`](Self::wait_for_completion).
    pub async fn wait_for_completion_async(
        &self,
        timeout: Duration,
    ) -> Result<VerificationSnapshot, VerificationError> {
        let run = self.current_run()?;
        let mut status = run.notify.subscribe();
        let finished = tokio::time::timeout(timeout, status.wait_for(|s| s.is_terminal()))
            .await
            .is_ok_and(|changed| changed.is_ok());
        if !finished {
            cancel_after_timeout(&run, timeout);
        }
        Ok(run.result())
    }

    pub fn is_closed(&self) -> bool {
        self.runtime.lock().is_none()
    }

    /// Cancel any running verification and stop the worker thread, waiting
    /// a bounded time for it to exit. Idempotent.
    pub fn close(&self) {
        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };
        let run = self.current.lock().clone();
        if let Some(run) = &run {
            run.request_cancel();
        }

        if Handle::try_current().is_ok() {
            runtime.shutdown_background();
        } else {
            runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
        }
        // A worker stuck in a check outlives the shutdown bound; nothing can
        // be submitted after close, so the run is finished here.
        if let Some(run) = run {
            run.finish(VerificationStatus::Cancelled);
        }
        info!("Verification worker stopped");
    }

    fn current_run(&self) -> Result<Arc<Run>, VerificationError> {
        self.current
            .lock()
            .clone()
            .ok_or(VerificationError::NotSubmitted)
    }
}

impl Drop for VerificationManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn cancel_after_timeout(run: &Run, timeout: Duration) {
    warn!("Verification did not finish within {:?}, cancelling", timeout);
    run.request_cancel();
}

async fn run_verification(
    capture: Arc<dyn ScreenCapture>,
    check: Arc<dyn VerificationCheck>,
    policy: RetryPolicy,
    run: Arc<Run>,
) {
    let started = Instant::now();

    loop {
        if run.cancel.is_cancelled() {
            run.finish(VerificationStatus::Cancelled);
            return;
        }

        let attempt = run.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = match attempt_once(capture.as_ref(), check.as_ref(), attempt).await {
            Ok(snapshot) => snapshot,
            Err(fault) => {
                warn!("Verification attempt {} faulted: {}", attempt, fault);
                *run.fault.lock() = Some(fault);
                run.finish(VerificationStatus::Failed);
                return;
            }
        };

        let success = snapshot.success;
        debug!(
            "Verification attempt {}: success={}, message={}",
            attempt, success, snapshot.message
        );
        run.record(snapshot);

        if success {
            info!("Verification succeeded on attempt {}", attempt);
            run.finish(VerificationStatus::Succeeded);
            return;
        }

        if let Some(timeout) = policy.timeout {
            if started.elapsed() >= timeout {
                info!("Verification timed out after {} attempts", attempt);
                run.finish(VerificationStatus::TimedOut);
                return;
            }
        }

        if attempt > policy.max_retries {
            info!("Verification failed after {} attempts", attempt);
            run.finish(VerificationStatus::Failed);
            return;
        }

        tokio::select! {
            _ = run.cancel.cancelled() => {
                debug!("Verification cancelled after {} attempts", attempt);
                run.finish(VerificationStatus::Cancelled);
                return;
            }
            _ = tokio::time::sleep(policy.delay_for_attempt(attempt - 1)) => {}
        }
    }
}

/// Capture, then check. Capture and check errors are failed attempts;
/// `Err` is reserved for panics.
async fn attempt_once(
    capture: &dyn ScreenCapture,
    check: &dyn VerificationCheck,
    attempt: u32,
) -> Result<VerificationSnapshot, String> {
    let screenshot = match AssertUnwindSafe(capture.capture(None, true)).catch_unwind().await {
        Ok(Ok(screenshot)) => screenshot,
        Ok(Err(e)) => {
            return Ok(VerificationSnapshot::failure(
                format!("Screen capture failed: {}", e),
                attempt,
            ));
        }
        Err(panic) => return Err(panic_message(panic)),
    };

    match AssertUnwindSafe(check.check(&screenshot)).catch_unwind().await {
        Ok(Ok(outcome)) => Ok(VerificationSnapshot::from_outcome(outcome, screenshot, attempt)),
        Ok(Err(e)) => {
            let mut snapshot = VerificationSnapshot::failure(e.to_string(), attempt);
            snapshot.screenshot = Some(screenshot);
            Ok(snapshot)
        }
        Err(panic) => Err(panic_message(panic)),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;
