//! Element location: semantic lookup first, template matching as fallback.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use uiprobe_config::RetrievalConfig;
use uiprobe_protocols::{IndexError, Rect, ScoredElement, ScreenCapture, UiElement};
use uiprobe_vision::image_utils::{load_gray, screenshot_gray};
use uiprobe_vision::{CoordinateMapper, TemplateImageMatcher};

use crate::retriever::SemanticElementRetriever;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorSettings {
    pub top_n: usize,
    pub min_score: f32,
    /// Semantic hits at or above this score are trusted without pixel matching.
    pub confident_score: f32,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for LocatorSettings {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_n: config.top_n,
            min_score: config.min_score,
            confident_score: config.confident_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateMethod {
    Semantic,
    Template,
}

/// A located element, bounds in logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub element: UiElement,
    pub bounds: Rect,
    /// Similarity score for semantic hits, correlation score for template hits.
    pub score: f64,
    pub method: LocateMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocateOutcome {
    Found(Location),
    NotFound {
        reason: String,
        candidates: Vec<ScoredElement>,
    },
}

impl LocateOutcome {
    pub fn location(&self) -> Option<&Location> {
        match self {
            LocateOutcome::Found(location) => Some(location),
            LocateOutcome::NotFound { .. } => None,
        }
    }
}

/// Finds on-screen elements from a text description.
///
/// A confident semantic candidate with known bounds is returned directly.
/// Otherwise the candidates' templates are matched against a fresh capture
/// and the best hit is mapped back to logical pixels. Not finding the
/// element is an outcome, not an error; only index failures are errors.
pub struct ElementLocator {
    retriever: SemanticElementRetriever,
    capture: Arc<dyn ScreenCapture>,
    matcher: TemplateImageMatcher,
    mapper: CoordinateMapper,
    settings: LocatorSettings,
}

impl ElementLocator {
    pub fn new(
        retriever: SemanticElementRetriever,
        capture: Arc<dyn ScreenCapture>,
        matcher: TemplateImageMatcher,
        mapper: CoordinateMapper,
    ) -> Self {
        Self {
            retriever,
            capture,
            matcher,
            mapper,
            settings: LocatorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: LocatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn locate(&self, query: &str) -> Result<LocateOutcome, IndexError> {
        let candidates = self
            .retriever
            .retrieve(query, self.settings.top_n, self.settings.min_score)
            .await?;

        let Some(best) = candidates.first() else {
            return Ok(not_found("No stored element matches the query", candidates));
        };

        if best.score >= self.settings.confident_score {
            if let Some(bounds) = best.element.bounds {
                info!("Located {} semantically (score {:.3})", best.element.name, best.score);
                return Ok(LocateOutcome::Found(Location {
                    element: best.element.clone(),
                    bounds,
                    score: best.score as f64,
                    method: LocateMethod::Semantic,
                }));
            }
        }

        let templated: Vec<UiElement> = candidates
            .iter()
            .filter(|c| c.element.template.is_some())
            .map(|c| c.element.clone())
            .collect();
        if templated.is_empty() {
            return Ok(not_found(
                "No confident candidate and no candidate has a template",
                candidates,
            ));
        }

        let screenshot = match self.capture.capture(None, true).await {
            Ok(screenshot) => screenshot,
            Err(e) => {
                warn!("Screen capture failed during locate: {}", e);
                return Ok(not_found(format!("Screen capture failed: {}", e), candidates));
            }
        };

        let matcher = self.matcher;
        let matched = tokio::task::spawn_blocking(move || best_template_match(&matcher, &screenshot, templated))
            .await
            .map_err(join_failure)?;

        match matched {
            Err(reason) => Ok(not_found(reason, candidates)),
            Ok(Some((element, physical, score))) => {
                let bounds = self.mapper.to_logical_rect(physical);
                info!(
                    "Located {} by template at {:?} (score {:.3})",
                    element.name, bounds, score
                );
                Ok(LocateOutcome::Found(Location {
                    element,
                    bounds,
                    score,
                    method: LocateMethod::Template,
                }))
            }
            Ok(None) => Ok(not_found(
                "No candidate template matched the screen",
                candidates,
            )),
        }
    }
}

fn not_found(reason: impl Into<String>, candidates: Vec<ScoredElement>) -> LocateOutcome {
    let reason = reason.into();
    debug!("Locate failed: {}", reason);
    LocateOutcome::NotFound { reason, candidates }
}

fn join_failure(e: JoinError) -> IndexError {
    error!("Template matching task failed: {}", e);
    IndexError::Internal(format!("Template matching task failed: {}", e))
}

/// Best physical-pixel match over all candidate templates. `Err` carries
/// the reason when the screenshot itself is unusable.
fn best_template_match(
    matcher: &TemplateImageMatcher,
    screenshot: &uiprobe_protocols::Screenshot,
    candidates: Vec<UiElement>,
) -> Result<Option<(UiElement, Rect, f64)>, String> {
    let screen = screenshot_gray(screenshot).map_err(|e| {
        warn!("Cannot decode screenshot: {}", e);
        format!("Cannot decode screenshot: {}", e)
    })?;

    let best = candidates
        .into_iter()
        .filter_map(|element| {
            let path = element.template.as_ref()?;
            let template = match load_gray(path) {
                Ok(template) => template,
                Err(e) => {
                    warn!("Cannot load template {}: {}", path.display(), e);
                    return None;
                }
            };
            let hit = matcher.find_scored_matches(&screen, &template).into_iter().next()?;
            Some((element, hit.rect, hit.score))
        })
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
    Ok(best)
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
