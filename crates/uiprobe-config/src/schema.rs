//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Display scale factors (physical pixels per logical pixel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_scale")]
    pub scale_x: f64,

    #[serde(default = "default_scale")]
    pub scale_y: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale_x: default_scale(),
            scale_y: default_scale(),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Remote vector store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Vector dimension used when the collection has to be created.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Extra connection attempts at startup. 0 fails fast.
    #[serde(default)]
    pub connect_retries: u32,

    #[serde(default = "default_connect_backoff_ms")]
    pub connect_backoff_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            collection: default_collection(),
            api_key: None,
            dimension: default_dimension(),
            connect_retries: 0,
            connect_backoff_ms: default_connect_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "ui_elements".to_string()
}

fn default_dimension() -> usize {
    128
}

fn default_connect_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Embedding model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `"hash"` (offline, deterministic) or `"openai"` (OpenAI-compatible API).
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_embedding_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            dimension: default_dimension(),
            base_url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: None,
        }
    }
}

fn default_embedding_provider() -> String {
    "hash".to_string()
}

fn default_embedding_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Semantic retrieval thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Score at or above which a semantic hit is trusted without pixel matching.
    #[serde(default = "default_confident_score")]
    pub confident_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_score: default_min_score(),
            confident_score: default_confident_score(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_min_score() -> f32 {
    0.5
}

fn default_confident_score() -> f32 {
    0.8
}

/// Template matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            merge_threshold: default_merge_threshold(),
        }
    }
}

fn default_acceptance_threshold() -> f64 {
    0.9
}

fn default_merge_threshold() -> f64 {
    0.3
}

/// Retry policies by operation kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "RetryPolicyConfig::verification")]
    pub verification: RetryPolicyConfig,

    #[serde(default = "RetryPolicyConfig::tool")]
    pub tool: RetryPolicyConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            verification: RetryPolicyConfig::verification(),
            tool: RetryPolicyConfig::tool(),
        }
    }
}

/// Raw retry policy values, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    pub max_retries: u32,

    pub base_delay_ms: u64,

    /// Overall time bound; `<= 0` means unbounded.
    #[serde(default)]
    pub timeout_ms: i64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    pub max_delay_ms: u64,
}

impl RetryPolicyConfig {
    /// Defaults for UI state verification loops.
    pub fn verification() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            timeout_ms: 30_000,
            backoff_multiplier: 1.0,
            max_delay_ms: 1_000,
        }
    }

    /// Defaults for individual tool calls.
    pub fn tool() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            timeout_ms: 0,
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: 5_000,
        }
    }
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Token budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Ceiling on total (input + output) tokens; `<= 0` means unlimited.
    #[serde(default)]
    pub token_ceiling: i64,
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rotated log files; console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
