//! UI element records held by the element index.

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Rect;

/// A discovered UI element.
///
/// The element index owns these; other components only hold copies returned
/// from a search. Mutation goes through remove + re-store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    /// Stable identity.
    pub id: Uuid,

    /// Short human-readable name.
    pub name: String,

    /// Descriptive text used as the embedding input.
    pub description: String,

    /// Representative visual template (image file) for pixel matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Last known bounds, in logical pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

impl UiElement {
    /// Create an element with a fresh id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            template: None,
            bounds: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Candidate match: an element paired with its similarity score.
///
/// Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredElement {
    pub element: UiElement,
    pub score: f32,
}

impl ScoredElement {
    pub fn new(element: UiElement, score: f32) -> Self {
        Self { element, score }
    }

    /// Ranking order: higher score first, equal scores by ascending id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.element.id.cmp(&other.element.id))
    }
}
