//! Tool execution result types.

use serde::{Deserialize, Serialize};

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful.
    pub success: bool,

    /// Output content.
    pub content: String,

    /// Structured output (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create a successful result with text content.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: None,
        }
    }

    /// Create a successful result with structured output.
    pub fn success_json(content: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: Some(output),
        }
    }

    /// Create an unsuccessful result that still carries evidence.
    pub fn failure(content: impl Into<String>, output: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            content: content.into(),
            structured_output: output,
        }
    }
}
