//! HTTP plumbing shared by the tool backends.
//!
//! Failures map onto tool error kinds so the invoker knows what to retry:
//! transport errors, 429 and 5xx are `tool-unavailable`; other 4xx and
//! unparseable bodies are `upstream-error`.

use haven_domain::ToolError;
use haven_domain::tool::ProviderError;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub(crate) fn client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::ConfigurationError(format!("HTTP client: {}", e)))
}

/// Send the request and decode a JSON body.
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, ToolError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ToolError::unavailable(format!("request failed: {}", e)))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ToolError::unavailable(format!("failed to read response: {}", e)))?;

    if let Some(err) = status_error(status, &body) {
        return Err(err);
    }
    serde_json::from_str(&body)
        .map_err(|e| ToolError::upstream(format!("invalid JSON from service: {}", e)))
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> Option<ToolError> {
    if status.is_success() {
        return None;
    }
    let snippet: String = body.chars().take(200).collect();
    let message = format!("service returned {}: {}", status, snippet);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Some(ToolError::unavailable(message))
    } else {
        Some(ToolError::upstream(message))
    }
}
