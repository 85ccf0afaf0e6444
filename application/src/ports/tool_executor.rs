//! Tool executor port
//!
//! Dispatches one attempt of a validated tool call to its backend.
//! Timeouts, retries and record keeping sit above this port in
//! [`ToolInvoker`](crate::use_cases::tool_invoker::ToolInvoker).

use async_trait::async_trait;
use haven_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolSpec};

#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Descriptors of every tool this executor can run
    fn tool_spec(&self) -> &ToolSpec;

    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError>;
}
