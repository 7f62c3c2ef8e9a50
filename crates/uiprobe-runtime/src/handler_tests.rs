use std::time::Duration;

use uiprobe_protocols::ToolError;

use super::*;

fn transient() -> ClassifiedError {
    ClassifiedError::transient("element not rendered yet")
}

#[test]
fn test_default_terminal_set() {
    let handler = ErrorClassifyingHandler::default();
    assert!(handler.is_terminal(ErrorCategory::NonRetryableError));
    assert!(handler.is_terminal(ErrorCategory::Timeout));
    assert!(handler.is_terminal(ErrorCategory::VerificationFailed));
    assert!(!handler.is_terminal(ErrorCategory::TransientToolError));
    assert!(!handler.is_terminal(ErrorCategory::TerminationByUser));
}

#[test]
fn test_terminal_category_propagates_without_touching_state() {
    let handler = ErrorClassifyingHandler::default().with_terminal(ErrorCategory::TerminationByUser);
    let state = RetryState::new();
    let policy = RetryPolicy::new(5, 10, 0);

    let err = handler
        .handle(ToolError::Cancelled, &state, &policy, true)
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::TerminationByUser);
    assert_eq!(state.attempts(), 0);
    assert!(state.started_at().is_none());
}

#[test]
fn test_non_retryable_propagates_immediately() {
    let handler = ErrorClassifyingHandler::default();
    let state = RetryState::new();
    let policy = RetryPolicy::new(5, 10, 0);

    let err = handler
        .handle(ClassifiedError::non_retryable("bad input"), &state, &policy, true)
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::NonRetryableError);
    assert_eq!(state.attempts(), 0);
}

#[test]
fn test_transient_absorbed_until_max_retries() {
    let handler = ErrorClassifyingHandler::default();
    let state = RetryState::new();
    let policy = RetryPolicy::new(2, 10, 0);

    assert_eq!(
        handler.handle(transient(), &state, &policy, true).unwrap(),
        "TRANSIENT_TOOL_ERROR: element not rendered yet"
    );
    assert!(handler.handle(transient(), &state, &policy, true).is_ok());
    assert!(state.started_at().is_some());

    let err = handler.handle(transient(), &state, &policy, true).unwrap_err();
    assert_eq!(err.category, ErrorCategory::Timeout);
    assert!(err.message.contains("Max retries (2) exceeded"));
    assert_eq!(state.attempts(), 3);
}

#[test]
fn test_elapsed_time_escalates_as_timeout() {
    let handler = ErrorClassifyingHandler::default();
    let state = RetryState::new();
    let policy = RetryPolicy::new(100, 0, 5);

    assert!(handler.handle(transient(), &state, &policy, true).is_ok());
    std::thread::sleep(Duration::from_millis(20));

    let err = handler.handle(transient(), &state, &policy, true).unwrap_err();
    assert_eq!(err.category, ErrorCategory::Timeout);
    assert!(err.message.starts_with("Timed out after"));
}

#[test]
fn test_without_fail_on_timeout_never_escalates() {
    let handler = ErrorClassifyingHandler::default();
    let state = RetryState::new();
    let policy = RetryPolicy::new(0, 0, 1);

    std::thread::sleep(Duration::from_millis(5));
    for _ in 0..5 {
        assert!(handler.handle(transient(), &state, &policy, false).is_ok());
    }
    assert_eq!(state.attempts(), 5);
}

#[test]
fn test_unknown_is_counted_not_terminal() {
    let handler = ErrorClassifyingHandler::default();
    let state = RetryState::new();
    let policy = RetryPolicy::new(1, 0, 0);

    let message = handler
        .handle(ClassifiedError::unknown("weird"), &state, &policy, true)
        .unwrap();
    assert!(message.contains("weird"));
    assert_eq!(state.attempts(), 1);
}

#[test]
fn test_without_terminal() {
    let handler = ErrorClassifyingHandler::default().without_terminal(ErrorCategory::Timeout);
    assert!(!handler.is_terminal(ErrorCategory::Timeout));
}
