//! Vision tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use uiprobe_protocols::{Rect, Tool, ToolDefinition, ToolError, ToolProvider, ToolResult};

use crate::image_utils::load_gray;
use crate::mapper::CoordinateMapper;
use crate::matcher::TemplateImageMatcher;

#[derive(Debug, Deserialize)]
pub struct FindTemplateParams {
    /// Screenshot path (physical pixels).
    pub screen: String,
    /// Template image path (physical pixels).
    pub template: String,
    /// Maximum matches to return.
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TemplateHit {
    /// Logical coordinates.
    pub rect: Rect,
    pub physical: Rect,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct FindTemplateResult {
    pub count: usize,
    pub matches: Vec<TemplateHit>,
}

/// Find a template image inside a screenshot.
pub struct FindTemplateTool {
    definition: ToolDefinition,
    matcher: TemplateImageMatcher,
    mapper: CoordinateMapper,
}

impl FindTemplateTool {
    pub fn new(matcher: TemplateImageMatcher, mapper: CoordinateMapper) -> Self {
        let definition = ToolDefinition::new(
            "vision_find_template",
            "Find Template",
            "Locate a template image inside a screenshot. Returns logical-pixel rectangles, best match first.",
        )
        .with_parameters_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "screen": {
                    "type": "string",
                    "description": "Path to the screenshot"
                },
                "template": {
                    "type": "string",
                    "description": "Path to the template image"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of matches to return"
                }
            },
            "required": ["screen", "template"]
        }));

        Self {
            definition,
            matcher,
            mapper,
        }
    }
}

#[async_trait]
impl Tool for FindTemplateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: FindTemplateParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let matcher = self.matcher;
        let screen_path = params.screen.clone();
        let template_path = params.template.clone();
        let matches = tokio::task::spawn_blocking(move || {
            let screen = load_gray(&screen_path)?;
            let template = load_gray(&template_path)?;
            Ok::<_, crate::VisionError>(matcher.find_scored_matches(&screen, &template))
        })
        .await
        .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
        .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let limit = params.max_results.unwrap_or(usize::MAX);
        let hits: Vec<TemplateHit> = matches
            .into_iter()
            .take(limit)
            .map(|m| TemplateHit {
                rect: self.mapper.to_logical_rect(m.rect),
                physical: m.rect,
                score: m.score,
            })
            .collect();

        debug!(
            "Template {} found {} times in {}",
            params.template,
            hits.len(),
            params.screen
        );

        let result = FindTemplateResult {
            count: hits.len(),
            matches: hits,
        };
        let output = serde_json::to_value(&result)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        if result.count == 0 {
            return Ok(ToolResult::failure("Template not found", Some(output)));
        }
        Ok(ToolResult::success_json(
            format!("Found {} matches", result.count),
            output,
        ))
    }
}

/// Tools exposed by the vision extension.
pub struct VisionToolProvider {
    matcher: TemplateImageMatcher,
    mapper: CoordinateMapper,
}

impl VisionToolProvider {
    pub fn new(matcher: TemplateImageMatcher, mapper: CoordinateMapper) -> Self {
        Self { matcher, mapper }
    }
}

impl ToolProvider for VisionToolProvider {
    fn provider_id(&self) -> &str {
        "vision"
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(FindTemplateTool::new(self.matcher, self.mapper))]
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
