//! Component wiring for the CLI.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use uiprobe_config::{Config, ConfigValidator};
use uiprobe_core::ToolRegistry;
use uiprobe_element_index::{
    ElementLocator, ElementToolProvider, LocatorSettings, QdrantElementIndex,
    SemanticElementRetriever, embedding_provider_from_config,
};
use uiprobe_protocols::{ClassifiedError, ScreenCapture, ToolResult};
use uiprobe_runtime::{BudgetManager, RetryExecutor, RetryPolicy};
use uiprobe_vision::{CoordinateMapper, TemplateImageMatcher, VisionToolProvider};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Log validation warnings and reject invalid configurations.
pub(crate) fn check_config(config: &Config) -> CliResult<()> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        let details: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        return Err(format!("Invalid configuration: {}", details.join("; ")).into());
    }
    Ok(())
}

/// Shared components built from one configuration.
pub(crate) struct App {
    pub config: Config,
    pub budget: Arc<BudgetManager>,
    pub registry: Arc<ToolRegistry>,
    pub matcher: TemplateImageMatcher,
    pub mapper: CoordinateMapper,
    tool_policy: RetryPolicy,
}

impl App {
    /// Build the vision components and register their tools.
    pub fn new(config: Config) -> CliResult<Self> {
        let budget = Arc::new(BudgetManager::from_config(&config.budget));
        let matcher = TemplateImageMatcher::from_config(&config.matching);
        let mapper = CoordinateMapper::from_config(&config.display)?;
        let tool_policy = RetryPolicy::from(&config.retry.tool);

        let registry = Arc::new(ToolRegistry::new());
        registry.register_provider(&VisionToolProvider::new(matcher, mapper))?;

        Ok(Self {
            config,
            budget,
            registry,
            matcher,
            mapper,
            tool_policy,
        })
    }

    pub fn locator_settings(&self) -> LocatorSettings {
        LocatorSettings::from(&self.config.retrieval)
    }

    /// Connect to the vector store and build the retriever.
    pub async fn retriever(&self) -> CliResult<SemanticElementRetriever> {
        let embedder =
            embedding_provider_from_config(&self.config.embedding, Some(self.budget.clone()))?;
        let index = QdrantElementIndex::from_config(&self.config.vector_store).await?;
        Ok(SemanticElementRetriever::new(embedder, Arc::new(index)))
    }

    /// Register the element tools, with `element_locate` when a screen is available.
    pub fn register_element_tools(
        &self,
        retriever: SemanticElementRetriever,
        capture: Option<Arc<dyn ScreenCapture>>,
    ) -> CliResult<()> {
        let mut provider = ElementToolProvider::new(retriever.clone(), self.locator_settings());
        if let Some(capture) = capture {
            let locator = ElementLocator::new(retriever, capture, self.matcher, self.mapper)
                .with_settings(self.locator_settings());
            provider = provider.with_locator(Arc::new(locator));
        }
        let count = self.registry.register_provider(&provider)?;
        info!("Registered {} element tools", count);
        Ok(())
    }

    /// Run a registered tool under the tool retry policy.
    pub async fn call_tool(&self, id: &str, params: Value) -> Result<ToolResult, ClassifiedError> {
        RetryExecutor::new(self.tool_policy.clone())
            .run(|| self.registry.execute(id, params.clone()))
            .await
    }

    /// Log the token ledger when anything was spent.
    pub fn report_usage(&self) {
        let totals = self.budget.snapshot();
        if totals.total_tokens > 0 {
            info!(
                "Token usage: {} total ({} input, {} output)",
                totals.total_tokens, totals.input_tokens, totals.output_tokens
            );
        }
    }
}

/// Live screen capture of the primary monitor.
#[cfg(feature = "desktop")]
pub(crate) fn desktop_capture() -> CliResult<Arc<dyn ScreenCapture>> {
    Ok(Arc::new(uiprobe_vision::DesktopCapture::new()))
}

#[cfg(not(feature = "desktop"))]
pub(crate) fn desktop_capture() -> CliResult<Arc<dyn ScreenCapture>> {
    Err("uiprobe was built without screen capture; rebuild with --features desktop".into())
}
