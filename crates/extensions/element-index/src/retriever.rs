//! Semantic element retrieval.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use uiprobe_protocols::{ElementIndex, EmbeddingProvider, IndexError, ScoredElement, UiElement};

/// Extra hits requested beyond `top_n` so ties at the cutoff are visible.
const TIE_HEADROOM: usize = 4;
/// Stop widening the search once this many hits are requested.
const MAX_FETCH: usize = 1024;

/// Stores UI elements by the embedding of their description and finds
/// them again from free-text queries.
///
/// Adds no locking of its own; concurrent use relies on the index backend.
/// No per-call retry either: callers wrap operations in a
/// [`RetryExecutor`](uiprobe_runtime::RetryExecutor) when they want one.
#[derive(Clone)]
pub struct SemanticElementRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn ElementIndex>,
}

impl SemanticElementRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn ElementIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed the description and upsert; a repeated id overwrites.
    pub async fn store(&self, element: &UiElement) -> Result<(), IndexError> {
        let vector = self.embedder.embed(&element.description).await?;
        self.index
            .upsert(element.id, vector, element.clone())
            .await?;
        debug!("Stored element {} ({}) in {}", element.name, element.id, self.index.id());
        Ok(())
    }

    /// At most `top_n` elements scoring at least `min_score`, best first.
    ///
    /// Results are unique by id; equal scores are ordered by id. A backend
    /// may cut ties at its limit in any order, so the search is widened
    /// until the lowest hit scores strictly below the `top_n`-th result or
    /// the backend runs out of hits.
    pub async fn retrieve(
        &self,
        query: &str,
        top_n: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredElement>, IndexError> {
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let mut limit = top_n.saturating_add(TIE_HEADROOM);
        let cap = limit.max(MAX_FETCH);
        let mut results = loop {
            let hits = self.index.search(&vector, min_score, limit).await?;
            let exhausted = hits.len() < limit || limit >= cap;
            let floor = hits.iter().map(|h| h.score).fold(f32::INFINITY, f32::min);
            let ranked = rank_unique(hits, min_score);
            let settled = ranked
                .get(top_n - 1)
                .is_some_and(|cutoff| floor < cutoff.score);
            if exhausted || settled {
                break ranked;
            }
            debug!("Ties at the cutoff for {:?}, widening search past {}", query, limit);
            limit = limit.saturating_mul(2).min(cap);
        };
        results.truncate(top_n);

        debug!("Query {:?} matched {} elements", query, results.len());
        Ok(results)
    }

    /// Remove `old`, then store `new`.
    ///
    /// Not atomic: if the store fails, `old` is already gone.
    pub async fn update(&self, old: &UiElement, new: &UiElement) -> Result<(), IndexError> {
        self.remove(old).await?;
        self.store(new).await?;
        info!("Updated element {} -> {}", old.id, new.id);
        Ok(())
    }

    /// Delete by id. Removing an absent element succeeds.
    pub async fn remove(&self, element: &UiElement) -> Result<(), IndexError> {
        self.index.delete(element.id).await?;
        debug!("Removed element {}", element.id);
        Ok(())
    }
}

/// Keep the best score per id, drop hits below `min_score`, and rank.
fn rank_unique(hits: Vec<ScoredElement>, min_score: f32) -> Vec<ScoredElement> {
    let mut best: HashMap<_, ScoredElement> = HashMap::new();
    for hit in hits.into_iter().filter(|h| h.score >= min_score) {
        match best.get(&hit.element.id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.element.id, hit);
            }
        }
    }

    let mut ranked: Vec<ScoredElement> = best.into_values().collect();
    ranked.sort_by(ScoredElement::rank_cmp);
    ranked
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
