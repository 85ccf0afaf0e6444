//! Tool invoker use case.
//!
//! Runs a [`ToolCall`] against the [`ToolExecutorPort`] under the tool's
//! [`RetryPolicy`] and always produces a [`ToolCallRecord`]; failures are
//! values in the record, never errors to the caller.
//!
//! | Outcome of an attempt | Action |
//! |-----------------------|--------|
//! | success, output valid | record success |
//! | success, output invalid | record `upstream-error` |
//! | timeout | retry after backoff |
//! | `tool-unavailable` | retry after backoff |
//! | `upstream-error` / `invalid-arguments` | record immediately |
//!
//! After the last attempt a retryable failure is recorded as
//! `tool-unavailable` with the latency of that last attempt.

use crate::ports::tool_executor::ToolExecutorPort;
use chrono::Utc;
use haven_domain::{
    DefaultToolValidator, RetryPolicy, ToolCall, ToolCallRecord, ToolDefinition, ToolError,
    ToolSpec, ToolValidator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct ToolInvoker {
    executor: Arc<dyn ToolExecutorPort>,
    validator: DefaultToolValidator,
    overrides: HashMap<String, RetryPolicy>,
}

impl ToolInvoker {
    pub fn new(executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            executor,
            validator: DefaultToolValidator,
            overrides: HashMap::new(),
        }
    }

    /// Per-tool policy overrides from configuration.
    pub fn with_overrides(mut self, overrides: HashMap<String, RetryPolicy>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn tool_spec(&self) -> &ToolSpec {
        self.executor.tool_spec()
    }

    /// Descriptors offered to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.executor
            .tool_spec()
            .sorted()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn policy_for(&self, definition: &ToolDefinition) -> RetryPolicy {
        self.overrides
            .get(&definition.name)
            .copied()
            .unwrap_or(definition.policy)
    }

    /// Run several calls concurrently; records come back in call order.
    pub async fn invoke_all(&self, calls: &[ToolCall]) -> Vec<ToolCallRecord> {
        futures::future::join_all(calls.iter().map(|call| self.invoke(call))).await
    }

    /// Run one call to completion under its retry policy.
    pub async fn invoke(&self, call: &ToolCall) -> ToolCallRecord {
        let started_at = Utc::now();

        let Some(definition) = self.executor.get_tool(&call.tool_name) else {
            warn!(tool = %call.tool_name, "Unknown tool requested");
            return ToolCallRecord::failure(
                call,
                ToolError::invalid_arguments(format!("Unknown tool '{}'", call.tool_name)),
                0,
                0,
                started_at,
            );
        };

        if let Err(message) = self.validator.validate(call, definition) {
            debug!(tool = %call.tool_name, "Rejected arguments: {}", message);
            return ToolCallRecord::failure(
                call,
                ToolError::invalid_arguments(message),
                0,
                0,
                started_at,
            );
        }

        let policy = self.policy_for(definition);
        let mut last_error = ToolError::timeout(&call.tool_name, policy.max_attempts());
        let mut last_latency = 0;

        for attempt in 0..policy.max_attempts() {
            if attempt > 0 {
                tokio::time::sleep(policy.backoff_for(attempt)).await;
            }

            let attempt_start = Instant::now();
            let result = tokio::time::timeout(policy.timeout, self.executor.execute(call)).await;
            last_latency = attempt_start.elapsed().as_millis() as u64;

            match result {
                Ok(Ok(output)) => {
                    return match self.validator.validate_output(&output, definition) {
                        Ok(()) => {
                            debug!(
                                tool = %call.tool_name,
                                latency_ms = last_latency,
                                retries = attempt,
                                "Tool call succeeded"
                            );
                            ToolCallRecord::success(call, output, last_latency, attempt, started_at)
                        }
                        Err(message) => ToolCallRecord::failure(
                            call,
                            ToolError::upstream(message),
                            last_latency,
                            attempt,
                            started_at,
                        ),
                    };
                }
                Ok(Err(error)) if error.kind.is_transient() => {
                    warn!(
                        tool = %call.tool_name,
                        attempt = attempt + 1,
                        "Tool unavailable: {}",
                        error.message
                    );
                    last_error = error;
                }
                Ok(Err(error)) => {
                    return ToolCallRecord::failure(call, error, last_latency, attempt, started_at);
                }
                Err(_) => {
                    warn!(
                        tool = %call.tool_name,
                        attempt = attempt + 1,
                        "Tool timed out after {:?}",
                        policy.timeout
                    );
                    last_error = ToolError::timeout(&call.tool_name, attempt + 1);
                }
            }
        }

        ToolCallRecord::failure(
            call,
            ToolError::unavailable(last_error.message),
            last_latency,
            policy.max_retries,
            started_at,
        )
    }
}
