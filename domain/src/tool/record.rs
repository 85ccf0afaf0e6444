//! Record of one tool invocation, owned by the Turn that issued it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::entities::ToolCall;
use super::value_objects::{ToolError, ToolErrorKind};

/// Result or error of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(serde_json::Value),
    Failure(ToolError),
}

/// Immutable record of a tool call: what was asked, what came back,
/// how long the last attempt took and how many retries were spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: HashMap<String, serde_json::Value>,
    pub outcome: ToolOutcome,
    /// Latency of the last attempt in milliseconds
    pub latency_ms: u64,
    /// Retries after the first attempt
    pub retry_count: u32,
    pub started_at: DateTime<Utc>,
    /// Issued by the orchestrator rather than requested by the model
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub injected: bool,
}

impl ToolCallRecord {
    pub fn success(
        call: &ToolCall,
        output: serde_json::Value,
        latency_ms: u64,
        retry_count: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::build(call, ToolOutcome::Success(output), latency_ms, retry_count, started_at)
    }

    pub fn failure(
        call: &ToolCall,
        error: ToolError,
        latency_ms: u64,
        retry_count: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::build(call, ToolOutcome::Failure(error), latency_ms, retry_count, started_at)
    }

    fn build(
        call: &ToolCall,
        outcome: ToolOutcome,
        latency_ms: u64,
        retry_count: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.tool_name.clone(),
            arguments: call.arguments.clone(),
            outcome,
            latency_ms,
            retry_count,
            started_at,
            injected: false,
        }
    }

    pub fn mark_injected(mut self) -> Self {
        self.injected = true;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            ToolOutcome::Success(v) => Some(v),
            ToolOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure(e) => Some(e),
        }
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error().map(|e| e.kind)
    }

    /// Total attempts made, including the first.
    pub fn attempts(&self) -> u32 {
        match self.error_kind() {
            Some(ToolErrorKind::InvalidArguments) => 0,
            _ => self.retry_count + 1,
        }
    }

    /// Content fed back to the model for this call.
    pub fn model_content(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(v) => v.to_string(),
            ToolOutcome::Failure(e) => serde_json::json!({
                "error": { "kind": e.kind, "message": e.message }
            })
            .to_string(),
        }
    }
}
