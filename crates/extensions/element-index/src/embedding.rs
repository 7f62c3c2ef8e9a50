//! Embedding models.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use uiprobe_config::EmbeddingConfig;
use uiprobe_protocols::{Embedding, EmbeddingError, EmbeddingProvider, Usage};
use uiprobe_runtime::BudgetManager;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Offline embedding by signed feature hashing of words and character
/// trigrams. Deterministic and cheap; similar wording gives similar vectors,
/// but it has no notion of meaning.
pub struct SimpleHashEmbedding {
    dimension: usize,
}

impl SimpleHashEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::new(vector);
        }

        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, word, 1.0);

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for trigram in padded.windows(3) {
                let trigram: String = trigram.iter().collect();
                self.add_feature(&mut vector, &trigram, 0.5);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Embedding::new(vector)
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();

        let idx = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

impl Default for SimpleHashEmbedding {
    fn default() -> Self {
        Self::new(128)
    }
}

#[async_trait]
impl EmbeddingProvider for SimpleHashEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self.hash_text(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
}

/// OpenAI-compatible `/embeddings` client.
///
/// With a ledger attached, each call is refused once the token budget is
/// exhausted and its usage is recorded afterwards.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    budget: Option<Arc<BudgetManager>>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            dimension,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: Arc<BudgetManager>) -> Self {
        self.budget = Some(budget);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        if let Some(budget) = &self.budget {
            budget
                .check_budget()
                .map_err(|e| EmbeddingError::BudgetExceeded(e.to_string()))?;
        }

        let mut request = self.client.post(self.endpoint()).json(&EmbeddingRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimension,
        });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, message });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Failed(format!("Invalid response: {}", e)))?;

        if let (Some(budget), Some(usage)) = (&self.budget, &body.usage) {
            budget.record(&self.model, &Usage::new(usage.prompt_tokens, 0, 0));
        }

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::Failed("Response contained no embedding".to_string()))?;
        if vector.len() != self.dimension {
            return Err(EmbeddingError::Failed(format!(
                "Expected {} dimensions, got {}",
                self.dimension,
                vector.len()
            )));
        }

        debug!("Embedded {} chars with {}", text.len(), self.model);
        Ok(Embedding::new(vector))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build the configured embedding model.
pub fn embedding_provider_from_config(
    config: &EmbeddingConfig,
    budget: Option<Arc<BudgetManager>>,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider.as_str() {
        "hash" => Ok(Arc::new(SimpleHashEmbedding::new(config.dimension))),
        "openai" => {
            let mut provider = OpenAiEmbeddingProvider::new(
                config.base_url.clone(),
                config.api_key.clone(),
                config.model.clone(),
                config.dimension,
            );
            if let Some(budget) = budget {
                provider = provider.with_budget(budget);
            }
            Ok(Arc::new(provider))
        }
        other => Err(EmbeddingError::InvalidInput(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
