use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    // Unlimited budget is worth pointing out.
    assert!(result.warnings.iter().any(|w| w.path == "budget.token_ceiling"));
}

#[test]
fn test_validate_non_positive_scale() {
    let mut config = Config::default();
    config.display.scale_x = 0.0;
    config.display.scale_y = -1.0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "display.scale_x"));
    assert!(result.errors.iter().any(|e| e.path == "display.scale_y"));
}

#[test]
fn test_validate_empty_collection() {
    let mut config = Config::default();
    config.vector_store.collection.clear();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "vector_store.collection"));
}

#[test]
fn test_validate_unknown_embedding_provider() {
    let mut config = Config::default();
    config.embedding.provider = "word2vec".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "embedding.provider"));
}

#[test]
fn test_validate_openai_without_key_warns() {
    let mut config = Config::default();
    config.embedding.provider = "openai".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "embedding.api_key"));
}

#[test]
fn test_validate_dimension_mismatch() {
    let mut config = Config::default();
    config.embedding.dimension = 64;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "embedding.dimension"));
}

#[test]
fn test_validate_min_score_out_of_range() {
    let mut config = Config::default();
    config.retrieval.min_score = 1.5;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "retrieval.min_score"));
}

#[test]
fn test_validate_threshold_bounds() {
    let mut config = Config::default();
    config.matching.acceptance_threshold = 0.0;
    config.matching.merge_threshold = 1.2;

    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_validate_retry_delays() {
    let mut config = Config::default();
    config.retry.tool.base_delay_ms = 1_000;
    config.retry.tool.max_delay_ms = 10;
    config.retry.tool.backoff_multiplier = 0.5;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "retry.tool.max_delay_ms"));
    assert!(result.errors.iter().any(|e| e.path == "retry.tool.backoff_multiplier"));
}

#[test]
fn test_validate_unbounded_retry_warning() {
    let mut config = Config::default();
    config.retry.verification.timeout_ms = 0;
    config.retry.verification.max_retries = 500;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "retry.verification.timeout_ms"));
}
