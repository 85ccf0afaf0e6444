//! Tool Registry
//!
//! The [`ToolRegistry`] aggregates tool providers and implements
//! [`ToolExecutorPort`]. It routes each call by tool name to the provider
//! that registered it.
//!
//! # Priority-Based Resolution
//!
//! When two providers offer the same tool, the one with the higher
//! priority wins. A deployment can register a self-hosted weather backend
//! above the public NWS one without removing the latter.
//!
//! [`discover`](ToolRegistry::discover) must run before the registry is
//! used; until then it exposes no tools.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use haven_application::ToolExecutorPort;
use haven_domain::tool::{ToolCall, ToolError, ToolProvider, ToolSpec};
use serde_json::Value;

pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> index into `providers` (filled by discovery)
    tool_mapping: HashMap<String, usize>,
    tool_spec: ToolSpec,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            tool_mapping: HashMap::new(),
            tool_spec: ToolSpec::new(),
        }
    }

    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Self {
        self.register_arc(Arc::new(provider))
    }

    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Merge the tools of every available provider, highest priority first.
    pub async fn discover(&mut self) {
        self.providers
            .sort_by_key(|p| std::cmp::Reverse(p.priority()));

        let mut tool_spec = ToolSpec::new();
        let mut tool_mapping = HashMap::new();

        for (idx, provider) in self.providers.iter().enumerate() {
            if !provider.is_available().await {
                tracing::debug!(provider = provider.id(), "Provider not available, skipping");
                continue;
            }
            for tool in provider.tools() {
                if tool_mapping.contains_key(&tool.name) {
                    tracing::trace!(
                        tool = %tool.name,
                        provider = provider.id(),
                        "Tool already registered by higher priority provider"
                    );
                    continue;
                }
                tracing::debug!(tool = %tool.name, provider = provider.id(), "Registered tool");
                tool_mapping.insert(tool.name.clone(), idx);
                tool_spec = tool_spec.register(tool);
            }
        }

        self.tool_spec = tool_spec;
        self.tool_mapping = tool_mapping;
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Id of the provider serving `tool_name`, once discovered.
    pub fn provider_of(&self, tool_name: &str) -> Option<&str> {
        self.tool_mapping
            .get(tool_name)
            .map(|&idx| self.providers[idx].id())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        match self.tool_mapping.get(&call.tool_name) {
            Some(&idx) => self.providers[idx].execute(call).await,
            None => Err(ToolError::invalid_arguments(format!(
                "unknown tool '{}'",
                call.tool_name
            ))),
        }
    }
}
