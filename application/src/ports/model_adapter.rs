//! Model adapter port
//!
//! Defines the interface for communicating with language-model providers.
//! Callers only ever see [`ModelReply`]; provider wire shapes stay inside
//! the adapters.

use async_trait::async_trait;
use haven_domain::{ConversationContext, ModelReply, ToolDefinition};
use thiserror::Error;

/// Errors that can occur during a generation step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Timeout")]
    Timeout,
}

/// Adapter over one language-model provider
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Stable identity recorded in the audit log (e.g. `openai:gpt-4o-mini`)
    fn provider_id(&self) -> &str;

    /// Produce either a tool-call request or a draft answer for the history
    async fn generate(
        &self,
        context: &ConversationContext,
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError>;
}
