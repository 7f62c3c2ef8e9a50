use std::sync::Arc;

use uiprobe_protocols::{Categorized, ErrorCategory};

use super::*;

#[test]
fn test_consume_accumulates() {
    let budget = BudgetManager::new(0);
    budget.consume_tokens("gpt-4o", 50, 30, 20);
    budget.consume_tokens("gpt-4o", 10, 5, 0);

    assert_eq!(budget.total_tokens(), 95);
    assert_eq!(budget.input_tokens(), 60);
    assert_eq!(budget.output_tokens(), 35);
    assert_eq!(budget.cached_tokens(), 20);
}

#[test]
fn test_counters_saturate_instead_of_wrapping() {
    let budget = BudgetManager::new(100);
    budget.consume_tokens("gpt-4o", u64::MAX, 1, 0);
    budget.consume_tokens("gpt-4o", 10, u64::MAX, u64::MAX);

    assert_eq!(budget.total_tokens(), u64::MAX);
    assert_eq!(budget.input_tokens(), u64::MAX);
    assert_eq!(budget.output_tokens(), u64::MAX);
    assert_eq!(budget.cached_tokens(), u64::MAX);
    assert_eq!(
        budget.usage_for("gpt-4o"),
        Some(Usage::new(u64::MAX, u64::MAX, u64::MAX))
    );
    assert!(matches!(
        budget.check_budget(),
        Err(BudgetError::Exceeded { used: u64::MAX, ceiling: 100 })
    ));
}

#[test]
fn test_ceiling_is_inclusive() {
    let budget = BudgetManager::new(100);
    budget.consume_tokens("gpt-4o", 50, 30, 20);
    assert!(budget.check_budget().is_ok());

    budget.consume_tokens("gpt-4o", 20, 0, 0);
    assert!(budget.check_budget().is_ok());
    assert_eq!(budget.remaining(), Some(0));
}

#[test]
fn test_exceeding_ceiling_fails_non_retryable() {
    let budget = BudgetManager::new(99);
    budget.consume_tokens("gpt-4o", 50, 30, 20);
    assert!(budget.check_budget().is_ok());

    budget.consume_tokens("gpt-4o", 20, 0, 0);
    let err = budget.check_budget().unwrap_err();
    assert!(matches!(err, BudgetError::Exceeded { used: 100, ceiling: 99 }));
    assert_eq!(err.category(), ErrorCategory::NonRetryableError);
    assert_eq!(budget.remaining(), Some(0));
}

#[test]
fn test_non_positive_ceiling_is_unlimited() {
    for ceiling in [0, -1] {
        let budget = BudgetManager::new(ceiling);
        budget.consume_tokens("m", u32::MAX as u64, u32::MAX as u64, 0);
        assert!(budget.check_budget().is_ok());
        assert_eq!(budget.remaining(), None);
    }
}

#[test]
fn test_reset_zeroes_everything() {
    let budget = BudgetManager::new(10);
    budget.consume_tokens("a", 50, 30, 20);
    budget.consume_tokens("b", 1, 1, 1);

    budget.reset();

    assert_eq!(budget.total_tokens(), 0);
    assert_eq!(budget.input_tokens(), 0);
    assert_eq!(budget.output_tokens(), 0);
    assert_eq!(budget.cached_tokens(), 0);
    assert!(budget.usage_for("a").is_none());
    assert!(budget.check_budget().is_ok());
    assert_eq!(budget.ceiling(), 10);
}

#[test]
fn test_per_model_breakdown() {
    let budget = BudgetManager::new(0);
    budget.record("gpt-4o", &Usage::new(10, 5, 2));
    budget.record("text-embedding-3-small", &Usage::new(7, 0, 0));
    budget.record("gpt-4o", &Usage::new(1, 1, 0));

    assert_eq!(budget.usage_for("gpt-4o"), Some(Usage::new(11, 6, 2)));

    let snapshot = budget.snapshot();
    assert_eq!(snapshot.total_tokens, 24);
    assert_eq!(snapshot.by_model.len(), 2);
    assert_eq!(snapshot.by_model["text-embedding-3-small"].input_tokens, 7);
}

#[test]
fn test_concurrent_consumers() {
    let budget = Arc::new(BudgetManager::new(0));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let budget = budget.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    budget.consume_tokens("m", 2, 1, 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(budget.total_tokens(), 24_000);
    assert_eq!(budget.input_tokens(), 16_000);
    assert_eq!(budget.cached_tokens(), 8_000);
    assert_eq!(budget.usage_for("m").unwrap().output_tokens, 8_000);
}

#[test]
fn test_set_ceiling() {
    let budget = BudgetManager::from_config(&BudgetConfig::default());
    assert_eq!(budget.ceiling(), 0);
    budget.set_ceiling(5);
    budget.consume_tokens("m", 6, 0, 0);
    assert!(budget.check_budget().is_err());
}
