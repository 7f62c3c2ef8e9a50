//! Tool definition types.

use serde::{Deserialize, Serialize};

/// Definition of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique identifier for the tool.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON Schema for the parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_schema: Option<serde_json::Value>,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
        }
    }

    /// Set the parameters schema.
    pub fn with_parameters_schema(mut self, schema: serde_json::Value) -> Self {
        self.parameters_schema = Some(schema);
        self
    }

    /// Schema to hand to a model, falling back to an empty object schema.
    pub fn input_schema(&self) -> serde_json::Value {
        self.parameters_schema.clone().unwrap_or_else(|| {
            serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_new() {
        let def = ToolDefinition::new("element_search", "Element Search", "Search elements");
        assert_eq!(def.id, "element_search");
        assert!(def.parameters_schema.is_none());
    }

    #[test]
    fn test_input_schema_default() {
        let def = ToolDefinition::new("t", "T", "d");
        assert_eq!(def.input_schema()["type"], "object");
    }

    #[test]
    fn test_input_schema_explicit() {
        let def = ToolDefinition::new("t", "T", "d")
            .with_parameters_schema(serde_json::json!({"type": "object", "required": ["q"]}));
        assert_eq!(def.input_schema()["required"][0], "q");
    }

    #[test]
    fn test_schema_skipped_when_none() {
        let def = ToolDefinition::new("t", "T", "d");
        let json = serde_json::to_string(&def).unwrap();
        assert!(!json.contains("parameters_schema"));
    }
}
