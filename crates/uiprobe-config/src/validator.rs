//! Configuration validation.

use crate::schema::{Config, RetryPolicyConfig};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_display(config, &mut result);
        Self::validate_vector_store(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_retrieval(config, &mut result);
        Self::validate_matching(config, &mut result);
        Self::validate_retry("retry.verification", &config.retry.verification, &mut result);
        Self::validate_retry("retry.tool", &config.retry.tool, &mut result);
        Self::validate_budget(config, &mut result);

        result
    }

    fn validate_display(config: &Config, result: &mut ValidationResult) {
        for (path, scale) in [
            ("display.scale_x", config.display.scale_x),
            ("display.scale_y", config.display.scale_y),
        ] {
            if !scale.is_finite() || scale <= 0.0 {
                result.add_error(ValidationError::new(
                    path,
                    "scale factor must be a positive number",
                ));
            }
        }
    }

    fn validate_vector_store(config: &Config, result: &mut ValidationResult) {
        let store = &config.vector_store;
        if store.url.is_empty() {
            result.add_error(ValidationError::new("vector_store.url", "URL cannot be empty"));
        }
        if store.collection.is_empty() {
            result.add_error(ValidationError::new(
                "vector_store.collection",
                "Collection name cannot be empty",
            ));
        }
        if store.dimension == 0 {
            result.add_error(ValidationError::new(
                "vector_store.dimension",
                "dimension must be greater than 0",
            ));
        }
        if store.connect_retries > 10 {
            result.add_warning(ValidationWarning::new(
                "vector_store.connect_retries",
                "more than 10 startup retries delays failure reporting considerably",
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;
        match embedding.provider.as_str() {
            "hash" => {}
            "openai" => {
                if embedding.api_key.is_none() {
                    result.add_warning(ValidationWarning::new(
                        "embedding.api_key",
                        "No API key configured for the openai embedding provider",
                    ));
                }
            }
            other => result.add_error(ValidationError::new(
                "embedding.provider",
                format!("Unknown embedding provider '{}'", other),
            )),
        }
        if embedding.dimension != config.vector_store.dimension {
            result.add_error(ValidationError::new(
                "embedding.dimension",
                "must equal vector_store.dimension",
            ));
        }
    }

    fn validate_retrieval(config: &Config, result: &mut ValidationResult) {
        let retrieval = &config.retrieval;
        if retrieval.top_n == 0 {
            result.add_error(ValidationError::new(
                "retrieval.top_n",
                "top_n must be greater than 0",
            ));
        }
        if !(-1.0..=1.0).contains(&retrieval.min_score) {
            result.add_error(ValidationError::new(
                "retrieval.min_score",
                "min_score must be within [-1, 1]",
            ));
        }
        if retrieval.confident_score < retrieval.min_score {
            result.add_warning(ValidationWarning::new(
                "retrieval.confident_score",
                "confident_score below min_score makes every hit confident",
            ));
        }
    }

    fn validate_matching(config: &Config, result: &mut ValidationResult) {
        for (path, value) in [
            ("matching.acceptance_threshold", config.matching.acceptance_threshold),
            ("matching.merge_threshold", config.matching.merge_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                result.add_error(ValidationError::new(path, "must be within (0, 1]"));
            }
        }
    }

    fn validate_retry(path: &str, policy: &RetryPolicyConfig, result: &mut ValidationResult) {
        if !policy.backoff_multiplier.is_finite() || policy.backoff_multiplier < 1.0 {
            result.add_error(ValidationError::new(
                format!("{}.backoff_multiplier", path),
                "backoff_multiplier must be at least 1.0",
            ));
        }
        if policy.max_delay_ms < policy.base_delay_ms {
            result.add_error(ValidationError::new(
                format!("{}.max_delay_ms", path),
                "max_delay_ms must not be below base_delay_ms",
            ));
        }
        if policy.timeout_ms <= 0 && policy.max_retries > 100 {
            result.add_warning(ValidationWarning::new(
                format!("{}.timeout_ms", path),
                "unbounded timeout with more than 100 retries may run for a long time",
            ));
        }
    }

    fn validate_budget(config: &Config, result: &mut ValidationResult) {
        if config.budget.token_ceiling <= 0 {
            result.add_warning(ValidationWarning::new(
                "budget.token_ceiling",
                "token budget is unlimited",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
