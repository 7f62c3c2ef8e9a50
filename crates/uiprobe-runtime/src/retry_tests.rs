use super::*;

#[test]
fn test_policy_default_matches_tool_config() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 2);
    assert_eq!(policy.base_delay, Duration::from_millis(500));
    assert_eq!(policy.timeout, None);
}

#[test]
fn test_non_positive_timeout_is_unbounded() {
    assert_eq!(RetryPolicy::new(3, 10, 0).timeout, None);
    assert_eq!(RetryPolicy::new(3, 10, -5).timeout, None);
    assert_eq!(
        RetryPolicy::new(3, 10, 250).timeout,
        Some(Duration::from_millis(250))
    );
}

#[test]
fn test_fixed_delay_policy() {
    let policy = RetryPolicy::new(5, 100, 0);
    assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(100));
}

#[test]
fn test_delay_calculation() {
    let policy = RetryPolicy::new(3, 100, 0).with_backoff(2.0, Duration::from_secs(30));

    assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
}

#[test]
fn test_delay_calculation_with_max() {
    let policy = RetryPolicy::new(3, 100, 0).with_backoff(2.0, Duration::from_millis(500));

    // 100 * 2^3 = 800, but max is 500
    assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
    assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(500));
}

#[test]
fn test_from_config() {
    let config = RetryPolicyConfig {
        max_retries: 4,
        base_delay_ms: 20,
        timeout_ms: 1_000,
        backoff_multiplier: 3.0,
        max_delay_ms: 90,
    };
    let policy = RetryPolicy::from(&config);
    assert_eq!(policy.max_retries, 4);
    assert_eq!(policy.timeout, Some(Duration::from_secs(1)));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(60));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(90));
}

#[test]
fn test_state_counts_attempts() {
    let state = RetryState::new();
    assert_eq!(state.attempts(), 0);
    assert_eq!(state.record_attempt(), 1);
    assert_eq!(state.record_attempt(), 2);
    assert_eq!(state.attempts(), 2);
}

#[test]
fn test_clock_is_set_once() {
    let state = RetryState::new();
    assert!(state.started_at().is_none());
    assert_eq!(state.elapsed(), Duration::ZERO);

    let first = state.start_clock();
    std::thread::sleep(Duration::from_millis(2));
    let second = state.start_clock();
    assert_eq!(first, second);
    assert!(state.elapsed() >= Duration::from_millis(2));
}

#[test]
fn test_reset() {
    let mut state = RetryState::new();
    state.start_clock();
    state.record_attempt();

    state.reset();
    assert_eq!(state.attempts(), 0);
    assert!(state.started_at().is_none());
}
