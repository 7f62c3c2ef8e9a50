//! Element tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use uiprobe_protocols::{Tool, ToolDefinition, ToolError, ToolProvider, ToolResult};

use crate::locator::{ElementLocator, LocateOutcome, LocatorSettings};
use crate::retriever::SemanticElementRetriever;

#[derive(Debug, Deserialize)]
pub struct ElementSearchParams {
    pub query: String,
    pub top_n: Option<usize>,
    pub min_score: Option<f32>,
}

/// Rank stored elements against a description.
pub struct ElementSearchTool {
    definition: ToolDefinition,
    retriever: SemanticElementRetriever,
    settings: LocatorSettings,
}

impl ElementSearchTool {
    pub fn new(retriever: SemanticElementRetriever, settings: LocatorSettings) -> Self {
        let definition = ToolDefinition::new(
            "element_search",
            "Search Elements",
            "Find stored UI elements whose description is similar to the query, best first.",
        )
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Description of the element"
                },
                "top_n": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of results"
                },
                "min_score": {
                    "type": "number",
                    "description": "Minimum similarity score"
                }
            },
            "required": ["query"]
        }));

        Self {
            definition,
            retriever,
            settings,
        }
    }
}

#[async_trait]
impl Tool for ElementSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: ElementSearchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let top_n = params.top_n.unwrap_or(self.settings.top_n);
        let min_score = params.min_score.unwrap_or(self.settings.min_score);
        let results = self
            .retriever
            .retrieve(&params.query, top_n, min_score)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        debug!("element_search '{}' -> {} results", params.query, results.len());

        let output = json!({ "count": results.len(), "results": results });
        if results.is_empty() {
            return Ok(ToolResult::failure("No matching elements", Some(output)));
        }
        Ok(ToolResult::success_json(
            format!("Found {} elements", results.len()),
            output,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ElementLocateParams {
    pub query: String,
}

/// Locate an element on the current screen.
pub struct ElementLocateTool {
    definition: ToolDefinition,
    locator: Arc<ElementLocator>,
}

impl ElementLocateTool {
    pub fn new(locator: Arc<ElementLocator>) -> Self {
        let definition = ToolDefinition::new(
            "element_locate",
            "Locate Element",
            "Find an element on screen from its description. Returns logical-pixel bounds.",
        )
        .with_parameters_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Description of the element"
                }
            },
            "required": ["query"]
        }));

        Self {
            definition,
            locator,
        }
    }
}

#[async_trait]
impl Tool for ElementLocateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: ElementLocateParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let outcome = self
            .locator
            .locate(&params.query)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        let output =
            serde_json::to_value(&outcome).map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        match outcome {
            LocateOutcome::Found(location) => Ok(ToolResult::success_json(
                format!("Located {} at {:?}", location.element.name, location.bounds),
                output,
            )),
            LocateOutcome::NotFound { reason, .. } => Ok(ToolResult::failure(reason, Some(output))),
        }
    }
}

/// Tools exposed by the element index extension.
///
/// `element_locate` is only offered when a locator (and so a screen) is available.
pub struct ElementToolProvider {
    retriever: SemanticElementRetriever,
    locator: Option<Arc<ElementLocator>>,
    settings: LocatorSettings,
}

impl ElementToolProvider {
    pub fn new(retriever: SemanticElementRetriever, settings: LocatorSettings) -> Self {
        Self {
            retriever,
            locator: None,
            settings,
        }
    }

    pub fn with_locator(mut self, locator: Arc<ElementLocator>) -> Self {
        self.locator = Some(locator);
        self
    }
}

impl ToolProvider for ElementToolProvider {
    fn provider_id(&self) -> &str {
        "element-index"
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = vec![Arc::new(ElementSearchTool::new(
            self.retriever.clone(),
            self.settings,
        ))];
        if let Some(locator) = &self.locator {
            tools.push(Arc::new(ElementLocateTool::new(locator.clone())));
        }
        tools
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
