//! Element index protocol.
//!
//! A vector store keyed by element id, holding the element itself as payload.

use async_trait::async_trait;
use uuid::Uuid;

use crate::embedding::Embedding;
use crate::error::IndexError;
use crate::types::{ScoredElement, UiElement};

#[async_trait]
pub trait ElementIndex: Send + Sync {
    /// Backend identifier, for logging.
    fn id(&self) -> &str;

    /// Insert or overwrite the point stored under `id`.
    async fn upsert(&self, id: Uuid, vector: Embedding, payload: UiElement)
    -> Result<(), IndexError>;

    /// Similarity search restricted to `score >= min_score`, best first,
    /// at most `max_results` entries.
    async fn search(
        &self,
        vector: &Embedding,
        min_score: f32,
        max_results: usize,
    ) -> Result<Vec<ScoredElement>, IndexError>;

    /// Delete by id. Deleting an absent id succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), IndexError>;
}
