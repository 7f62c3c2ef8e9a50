//! In-process element index with brute-force cosine search.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use uiprobe_protocols::{Embedding, ElementIndex, IndexError, ScoredElement, UiElement};

/// Element index held in memory. Suited to tests and small offline runs.
#[derive(Default)]
pub struct InMemoryElementIndex {
    points: RwLock<HashMap<Uuid, (Embedding, UiElement)>>,
    dimension: Option<usize>,
}

impl InMemoryElementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject vectors of any other dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
            dimension: Some(dimension),
        }
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<UiElement> {
        self.points.read().get(&id).map(|(_, element)| element.clone())
    }

    fn check_dimension(&self, vector: &Embedding) -> Result<(), IndexError> {
        match self.dimension {
            Some(expected) if expected != vector.dimension() => Err(IndexError::DimensionMismatch {
                expected,
                actual: vector.dimension(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ElementIndex for InMemoryElementIndex {
    fn id(&self) -> &str {
        "memory"
    }

    async fn upsert(
        &self,
        id: Uuid,
        vector: Embedding,
        payload: UiElement,
    ) -> Result<(), IndexError> {
        self.check_dimension(&vector)?;
        self.points.write().insert(id, (vector, payload));
        Ok(())
    }

    async fn search(
        &self,
        vector: &Embedding,
        min_score: f32,
        max_results: usize,
    ) -> Result<Vec<ScoredElement>, IndexError> {
        self.check_dimension(vector)?;
        let points = self.points.read();
        let mut results: Vec<ScoredElement> = points
            .values()
            .map(|(embedding, element)| {
                ScoredElement::new(element.clone(), vector.cosine_similarity(embedding))
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Map order is random; ties must not depend on it.
        results.sort_by(ScoredElement::rank_cmp);
        results.truncate(max_results);
        Ok(results)
    }

    async fn delete(&self, id: Uuid) -> Result<(), IndexError> {
        self.points.write().remove(&id);
        Ok(())
    }
}
