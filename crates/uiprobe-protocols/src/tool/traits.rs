//! Tool trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ToolDefinition, ToolResult};
use crate::error::ToolError;

/// Core trait for tools.
///
/// Tools are executable units that agents can invoke to perform actions.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Validate the parameters before execution.
    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        let definition = self.definition();
        if let Some(schema) = &definition.parameters_schema {
            if schema.get("type") == Some(&serde_json::json!("object")) && !params.is_object() {
                return Err(ToolError::InvalidParameters(
                    "Parameters must be an object".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A component that exposes tools.
///
/// The list is static: a provider returns the same tool ids every time.
pub trait ToolProvider: Send + Sync {
    /// Identifier of the providing component.
    fn provider_id(&self) -> &str;

    /// The tools this component exposes.
    fn tools(&self) -> Vec<Arc<dyn Tool>>;
}
