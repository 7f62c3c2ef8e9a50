//! Tool registry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use uiprobe_protocols::{Tool, ToolDefinition, ToolError, ToolProvider, ToolResult};

use crate::error::RegistryError;

/// Registry of tools keyed by definition id.
///
/// Thread-safe; ids are unique across all providers.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the id is taken.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let id = tool.definition().id.clone();
        match self.tools.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(RegistryError::AlreadyRegistered(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                debug!("Registered tool: {}", entry.key());
                entry.insert(tool);
                Ok(())
            }
        }
    }

    /// Register every tool of a provider.
    ///
    /// Stops at the first duplicate; tools registered before it stay.
    pub fn register_provider(&self, provider: &dyn ToolProvider) -> Result<usize, RegistryError> {
        let tools = provider.tools();
        let count = tools.len();
        for tool in tools {
            self.register(tool)?;
        }
        info!(
            "Registered {} tools from provider {}",
            count,
            provider.provider_id()
        );
        Ok(count)
    }

    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.tools
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).map(|tool| tool.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    /// Definitions of all tools, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self
            .tools
            .iter()
            .map(|tool| tool.definition().clone())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate parameters and run a tool by id.
    pub async fn execute(
        &self,
        id: &str,
        params: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(id)
            .ok_or_else(|| ToolError::NotFound(id.to_string()))?;
        tool.validate(&params)?;
        debug!("Executing tool: {}", id);
        tool.execute(params).await
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
