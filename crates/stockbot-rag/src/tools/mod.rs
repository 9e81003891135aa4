//! Tools the agent can call: document retrieval, web search, and company financials
//!
//! Each tool advertises a JSON-schema for its arguments and returns plain text
//! that is fed back to the model as a tool message.

mod polygon;
mod retriever;
mod tavily;

pub use polygon::PolygonFinancialsTool;
pub use retriever::RetrieverTool;
pub use tavily::TavilySearchTool;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{AppConfig, Secrets};
use crate::error::{Error, Result};
use crate::providers::ToolSpec;

/// A callable tool
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool
    fn name(&self) -> &str;

    /// What the tool does, shown to the model
    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    /// Run the tool with parsed arguments
    async fn call(&self, args: &Value) -> Result<String>;

    /// Schema advertised to the chat model
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Read a required, non-blank string argument
pub(crate) fn string_arg(tool: &str, args: &Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::tool(tool, format!("missing required argument '{}'", key)))
}

/// Tools bound to one agent
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the retriever plus every external tool whose key is set
    pub fn from_config(config: &AppConfig, secrets: &Secrets) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RetrieverTool::from_config(config, secrets)));

        match &secrets.tavily_api_key {
            Some(key) => registry.register(Arc::new(TavilySearchTool::new(&config.tools.tavily, key))),
            None => tracing::warn!("{} not set, web search tool disabled", Secrets::TAVILY),
        }

        match &secrets.polygon_api_key {
            Some(key) => {
                registry.register(Arc::new(PolygonFinancialsTool::new(&config.tools.polygon, key)))
            }
            None => tracing::warn!("{} not set, financials tool disabled", Secrets::POLYGON),
        }

        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name with JSON-encoded arguments
    ///
    /// Never fails: unknown tools, malformed arguments, and tool errors are
    /// returned as text so the model can react to them.
    pub async fn execute(&self, name: &str, raw_args: &str) -> String {
        let Some(tool) = self.get(name) else {
            tracing::warn!("Model requested unknown tool '{}'", name);
            return format!("Error: unknown tool '{}'. Available tools: {}", name, self.names().join(", "));
        };

        let args: Value = if raw_args.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw_args) {
                Ok(args) => args,
                Err(e) => return format!("Error: invalid arguments for '{}': {}", name, e),
            }
        };

        match tool.call(&args).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }
}
