//! OpenAI-compatible Chat Completions adapter.
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` shape (Azure OpenAI, vLLM, Ollama, ...).

use super::schema::parameters_schema;
use super::{HttpSettings, classify_send_error};
use async_trait::async_trait;
use haven_application::{ModelAdapter, ModelError};
use haven_domain::{ConversationContext, Message, ModelReply, Role, ToolCall, ToolDefinition};
use serde_json::{Value, json};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    http: reqwest::Client,
    settings: HttpSettings,
    id: String,
}

impl OpenAiAdapter {
    pub fn new(settings: HttpSettings) -> Result<Self, ModelError> {
        if settings.api_key.is_empty() {
            return Err(ModelError::NotConfigured("OpenAI API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ModelError::NotConfigured(format!("HTTP client: {}", e)))?;
        Ok(Self {
            id: format!("openai:{}", settings.model),
            http,
            settings,
        })
    }

    fn request_body(&self, context: &ConversationContext, tools: &[ToolDefinition]) -> Value {
        let mut body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": messages_to_openai(context.messages()),
        });
        if !tools.is_empty() {
            body["tools"] = tools_to_openai(tools);
        }
        body
    }
}

#[async_trait]
impl ModelAdapter for OpenAiAdapter {
    fn provider_id(&self) -> &str {
        &self.id
    }

    async fn generate(
        &self,
        context: &ConversationContext,
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError> {
        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let body = self.request_body(context, tools);
        debug!(provider = %self.id, messages = context.len(), "Sending chat completion request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ModelError::Connection(format!("failed to read response body: {}", e)))?;
        if !status.is_success() {
            return Err(ModelError::RequestFailed(format!("API returned {}: {}", status, text)));
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|e| ModelError::InvalidResponse(format!("invalid JSON response: {}", e)))?;
        parse_openai_response(&v)
    }
}

/// System prompt stays in the `messages` array; tool results use
/// `role: "tool"` with a `tool_call_id`.
pub fn messages_to_openai(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| match msg.role {
            Role::System => json!({"role": "system", "content": msg.content}),
            Role::User => json!({"role": "user", "content": msg.content}),
            Role::Assistant if msg.tool_calls.is_empty() => {
                json!({"role": "assistant", "content": msg.content})
            }
            Role::Assistant => {
                let tool_calls: Vec<Value> = msg
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.tool_name,
                                "arguments": Value::Object(tc.arguments.clone().into_iter().collect()).to_string(),
                            }
                        })
                    })
                    .collect();
                json!({"role": "assistant", "content": Value::Null, "tool_calls": tool_calls})
            }
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": msg.tool_call_id,
                "content": msg.content,
            }),
        })
        .collect()
}

pub fn tools_to_openai(tools: &[ToolDefinition]) -> Value {
    let tool_values: Vec<Value> = tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": parameters_schema(t),
                }
            })
        })
        .collect();
    json!(tool_values)
}

pub fn parse_openai_response(v: &Value) -> Result<ModelReply, ModelError> {
    let message = &v["choices"][0]["message"];
    if message.is_null() {
        return Err(ModelError::InvalidResponse(
            "missing `choices[0].message` in response".to_string(),
        ));
    }

    if let Some(calls) = message["tool_calls"].as_array()
        && !calls.is_empty()
    {
        let calls = calls
            .iter()
            .map(|tc| {
                let name = tc["function"]["name"].as_str().unwrap_or_default();
                let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");
                let args: serde_json::Map<String, Value> = serde_json::from_str(args_str)
                    .map_err(|e| {
                        ModelError::InvalidResponse(format!(
                            "invalid JSON in tool call `{}` arguments: {}",
                            name, e
                        ))
                    })?;
                let mut call = ToolCall::new(tc["id"].as_str().unwrap_or_default(), name);
                call.arguments = args.into_iter().collect();
                Ok::<_, ModelError>(call)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        return Ok(ModelReply::ToolCalls(calls));
    }

    Ok(ModelReply::Draft(
        message["content"].as_str().unwrap_or_default().to_string(),
    ))
}
