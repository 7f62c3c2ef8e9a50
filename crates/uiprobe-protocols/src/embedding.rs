//! Embedding model protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Vector for one element description or query. Serializes as a bare
/// array, the shape vector stores accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Cosine of the angle between two embeddings, in `[-1, 1]`.
    ///
    /// Vectors of different dimension are incomparable and an all-zero
    /// vector has no direction; both score 0 so they never pass a positive
    /// `min_score`.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.dimension() != other.dimension() {
            return 0.0;
        }

        let (dot, self_sq, other_sq) = self.vector.iter().zip(&other.vector).fold(
            (0.0f64, 0.0f64, 0.0f64),
            |(dot, a_sq, b_sq), (&a, &b)| {
                let (a, b) = (f64::from(a), f64::from(b));
                (dot + a * b, a_sq + a * a, b_sq + b * b)
            },
        );
        if self_sq == 0.0 || other_sq == 0.0 {
            return 0.0;
        }

        (dot / (self_sq.sqrt() * other_sq.sqrt())).clamp(-1.0, 1.0) as f32
    }
}

/// Trait for embedding models.
///
/// Treated as a synchronous, pure collaborator: the same text always maps to
/// the same vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCABULARY: [&str; 6] = ["ok", "cancel", "button", "blue", "search", "field"];

    /// Word counts over a fixed vocabulary; unknown words are ignored.
    fn describe(text: &str) -> Embedding {
        Embedding::new(
            VOCABULARY
                .iter()
                .map(|word| text.split_whitespace().filter(|w| w == word).count() as f32)
                .collect(),
        )
    }

    #[test]
    fn test_reworded_description_matches_fully() {
        let stored = describe("blue ok button");
        let query = describe("button ok blue");
        assert!((stored.cosine_similarity(&query) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sibling_buttons_partially_match() {
        let ok = describe("ok button");
        let cancel = describe("cancel button");
        assert!((ok.cosine_similarity(&cancel) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unrelated_controls_score_zero() {
        let button = describe("ok button");
        let field = describe("search field");
        assert_eq!(button.cosine_similarity(&field), 0.0);
    }

    #[test]
    fn test_description_outside_vocabulary_scores_zero() {
        let stored = describe("ok button");
        let empty = describe("volume slider");
        assert_eq!(empty.dimension(), VOCABULARY.len());
        assert_eq!(stored.cosine_similarity(&empty), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        let stored = describe("ok button");
        let truncated = Embedding::new(stored.vector[..3].to_vec());
        assert_eq!(stored.cosine_similarity(&truncated), 0.0);
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let embedding = Embedding::new(vec![0.5, 0.25]);
        assert_eq!(serde_json::to_string(&embedding).unwrap(), "[0.5,0.25]");
        let back: Embedding = serde_json::from_str("[0.5,0.25]").unwrap();
        assert_eq!(back, embedding);
    }
}
