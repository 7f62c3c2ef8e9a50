//! Qdrant REST backend.
//!
//! Points are keyed by element id and carry the serialized [`UiElement`] as
//! payload. The collection is created on connect when missing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use uiprobe_config::VectorStoreConfig;
use uiprobe_protocols::{Embedding, ElementIndex, IndexError, ScoredElement, UiElement};
use uiprobe_runtime::{RetryExecutor, RetryPolicy};

/// Upper bound on the startup backoff, as a multiple of the base delay.
const CONNECT_BACKOFF_CAP: u32 = 8;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

pub struct QdrantElementIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_key: Option<String>,
    dimension: usize,
}

impl std::fmt::Debug for QdrantElementIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantElementIndex")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl QdrantElementIndex {
    /// Connect with the policy derived from `config`.
    pub async fn from_config(config: &VectorStoreConfig) -> Result<Self, IndexError> {
        Self::connect(config, Self::connect_policy(config)).await
    }

    /// Startup policy: `connect_retries` extra attempts with exponential
    /// backoff. Zero retries fails on the first error.
    pub fn connect_policy(config: &VectorStoreConfig) -> RetryPolicy {
        let base = Duration::from_millis(config.connect_backoff_ms);
        RetryPolicy::new(config.connect_retries, config.connect_backoff_ms, 0)
            .with_backoff(2.0, base * CONNECT_BACKOFF_CAP)
    }

    /// Verify the store is reachable and the collection exists.
    ///
    /// Failure after the policy is exhausted is fatal.
    pub async fn connect(config: &VectorStoreConfig, policy: RetryPolicy) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| IndexError::Connection(e.to_string()))?;

        let index = Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
            dimension: config.dimension,
        };

        RetryExecutor::new(policy)
            .run(|| index.ensure_collection())
            .await
            .map_err(|e| {
                error!("Vector store unavailable at {}: {}", index.base_url, e);
                IndexError::Connection(format!(
                    "Failed to connect to vector store at {}: {}",
                    index.base_url, e
                ))
            })?;

        info!(
            "Connected to vector store {} (collection {})",
            index.base_url, index.collection
        );
        Ok(index)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, IndexError> {
        let response = builder
            .send()
            .await
            .map_err(|e| IndexError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            return Err(request_error(response).await);
        }
        Ok(response)
    }

    async fn ensure_collection(&self) -> Result<(), IndexError> {
        let url = self.collection_url();
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| IndexError::Connection(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                debug!("Collection {} exists", self.collection);
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                info!(
                    "Creating collection {} with dimension {}",
                    self.collection, self.dimension
                );
                let body = json!({
                    "vectors": { "size": self.dimension, "distance": "Cosine" }
                });
                self.send(self.request(Method::PUT, &url).json(&body)).await?;
                Ok(())
            }
            _ => Err(request_error(response).await),
        }
    }

    fn check_dimension(&self, vector: &Embedding) -> Result<(), IndexError> {
        if vector.dimension() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.dimension(),
            });
        }
        Ok(())
    }
}

async fn request_error(response: reqwest::Response) -> IndexError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    IndexError::Request { status, message }
}

#[async_trait]
impl ElementIndex for QdrantElementIndex {
    fn id(&self) -> &str {
        "qdrant"
    }

    async fn upsert(
        &self,
        id: Uuid,
        vector: Embedding,
        payload: UiElement,
    ) -> Result<(), IndexError> {
        self.check_dimension(&vector)?;
        let payload =
            serde_json::to_value(&payload).map_err(|e| IndexError::Serialization(e.to_string()))?;
        let body = json!({
            "points": [{ "id": id, "vector": vector.vector, "payload": payload }]
        });

        let url = format!("{}/points?wait=true", self.collection_url());
        self.send(self.request(Method::PUT, &url).json(&body)).await?;
        debug!("Upserted point {}", id);
        Ok(())
    }

    async fn search(
        &self,
        vector: &Embedding,
        min_score: f32,
        max_results: usize,
    ) -> Result<Vec<ScoredElement>, IndexError> {
        self.check_dimension(vector)?;
        let body = json!({
            "vector": vector.vector,
            "limit": max_results,
            "score_threshold": min_score,
            "with_payload": true
        });

        let url = format!("{}/points/search", self.collection_url());
        let response: SearchResponse = self
            .send(self.request(Method::POST, &url).json(&body))
            .await?
            .json()
            .await
            .map_err(|e| IndexError::Serialization(e.to_string()))?;

        let mut results = Vec::with_capacity(response.result.len());
        for point in response.result {
            let element = point
                .payload
                .map(serde_json::from_value::<UiElement>)
                .transpose()
                .map_err(|e| IndexError::Serialization(e.to_string()))?;
            match element {
                Some(element) => results.push(ScoredElement::new(element, point.score)),
                None => warn!("Point {} has no payload, skipping", point.id),
            }
        }
        results.sort_by(ScoredElement::rank_cmp);
        Ok(results)
    }

    async fn delete(&self, id: Uuid) -> Result<(), IndexError> {
        let body = json!({ "points": [id] });
        let url = format!("{}/points/delete?wait=true", self.collection_url());
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        debug!("Deleted point {}", id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "qdrant_tests.rs"]
mod tests;
