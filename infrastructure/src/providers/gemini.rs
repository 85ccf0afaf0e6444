//! Google Gemini `generateContent` adapter.

use super::schema::parameters_schema;
use super::{HttpSettings, classify_send_error};
use async_trait::async_trait;
use haven_application::{ModelAdapter, ModelError};
use haven_domain::{ConversationContext, Message, ModelReply, Role, ToolCall, ToolDefinition};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAdapter {
    http: reqwest::Client,
    settings: HttpSettings,
    id: String,
    /// Gemini function calls carry no ids; we mint our own.
    call_seq: AtomicU64,
}

impl GeminiAdapter {
    pub fn new(settings: HttpSettings) -> Result<Self, ModelError> {
        if settings.api_key.is_empty() {
            return Err(ModelError::NotConfigured("Gemini API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ModelError::NotConfigured(format!("HTTP client: {}", e)))?;
        Ok(Self {
            id: format!("gemini:{}", settings.model),
            http,
            settings,
            call_seq: AtomicU64::new(0),
        })
    }

    fn request_body(&self, context: &ConversationContext, tools: &[ToolDefinition]) -> Value {
        let mut body = json!({
            "contents": messages_to_gemini(context.dialogue()),
            "generationConfig": {"maxOutputTokens": self.settings.max_tokens},
        });
        if let Some(system) = context.system_prompt() {
            body["system_instruction"] = json!({"parts": [{"text": system}]});
        }
        if !tools.is_empty() {
            body["tools"] = tools_to_gemini(tools);
        }
        body
    }
}

#[async_trait]
impl ModelAdapter for GeminiAdapter {
    fn provider_id(&self) -> &str {
        &self.id
    }

    async fn generate(
        &self,
        context: &ConversationContext,
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        let body = self.request_body(context, tools);
        debug!(provider = %self.id, messages = context.len(), "Sending generateContent request");

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
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
        parse_gemini_response(&v, || {
            format!("gemini-call-{}", self.call_seq.fetch_add(1, Ordering::Relaxed) + 1)
        })
    }
}

/// Dialogue messages as Gemini `contents`.
///
/// Assistant turns use role `model`. Consecutive tool results are merged
/// into one `user` turn of `functionResponse` parts, which is what the API
/// expects after a multi-call `model` turn.
pub fn messages_to_gemini(messages: &[Message]) -> Vec<Value> {
    let mut contents: Vec<Value> = Vec::new();
    let mut pending_responses: Vec<Value> = Vec::new();

    let flush = |contents: &mut Vec<Value>, pending: &mut Vec<Value>| {
        if !pending.is_empty() {
            contents.push(json!({"role": "user", "parts": std::mem::take(pending)}));
        }
    };

    for msg in messages {
        match msg.role {
            Role::Tool => {
                let response = serde_json::from_str::<Value>(&msg.content)
                    .ok()
                    .filter(Value::is_object)
                    .unwrap_or_else(|| json!({"result": msg.content}));
                pending_responses.push(json!({
                    "functionResponse": {
                        "name": msg.tool_name.as_deref().unwrap_or_default(),
                        "response": response,
                    }
                }));
            }
            Role::System => {}
            Role::User => {
                flush(&mut contents, &mut pending_responses);
                contents.push(json!({"role": "user", "parts": [{"text": msg.content}]}));
            }
            Role::Assistant => {
                flush(&mut contents, &mut pending_responses);
                let parts: Vec<Value> = if msg.tool_calls.is_empty() {
                    vec![json!({"text": msg.content})]
                } else {
                    msg.tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "functionCall": {
                                    "name": tc.tool_name,
                                    "args": Value::Object(tc.arguments.clone().into_iter().collect()),
                                }
                            })
                        })
                        .collect()
                };
                contents.push(json!({"role": "model", "parts": parts}));
            }
        }
    }
    flush(&mut contents, &mut pending_responses);
    contents
}

pub fn tools_to_gemini(tools: &[ToolDefinition]) -> Value {
    let declarations: Vec<Value> = tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "parameters": parameters_schema(t),
            })
        })
        .collect();
    json!([{"functionDeclarations": declarations}])
}

/// Parse `candidates[0].content.parts`. Any `functionCall` part makes the
/// reply a tool request; otherwise the text parts are joined.
pub fn parse_gemini_response(
    v: &Value,
    mut next_id: impl FnMut() -> String,
) -> Result<ModelReply, ModelError> {
    let Some(candidate) = v["candidates"].as_array().and_then(|c| c.first()) else {
        let reason = v["promptFeedback"]["blockReason"].as_str().unwrap_or("no candidates");
        return Err(ModelError::InvalidResponse(format!(
            "no candidates in response ({})",
            reason
        )));
    };
    let parts = candidate["content"]["parts"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut calls = Vec::new();
    let mut text = String::new();
    for part in parts {
        if let Some(fc) = part.get("functionCall") {
            let name = fc["name"].as_str().ok_or_else(|| {
                ModelError::InvalidResponse("functionCall without a name".to_string())
            })?;
            let mut call = ToolCall::new(next_id(), name);
            if let Some(args) = fc["args"].as_object() {
                call.arguments = args.clone().into_iter().collect();
            }
            calls.push(call);
        } else if let Some(t) = part["text"].as_str() {
            text.push_str(t);
        }
    }

    if calls.is_empty() {
        Ok(ModelReply::Draft(text))
    } else {
        Ok(ModelReply::ToolCalls(calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_domain::tool::catalog;
    use std::time::Duration;

    fn adapter() -> GeminiAdapter {
        GeminiAdapter::new(HttpSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_tokens: 1024,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_system_prompt_goes_to_system_instruction() {
        let mut ctx = ConversationContext::with_system("You are a preparedness assistant.");
        ctx.push(Message::user("Weather in Miami?"));

        let body = adapter().request_body(&ctx, &[catalog::geocode_definition()]);
        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "You are a preparedness assistant."
        );
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "geocode");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_tool_results_are_merged_into_one_turn() {
        let calls = vec![
            catalog::weather_call("a", haven_domain::Coordinates::new(25.76, -80.19).unwrap()),
            ToolCall::new("b", catalog::GEOCODE).with_arg("placeName", "Tampa, FL"),
        ];
        let messages = vec![
            Message::user("Miami and Tampa?"),
            Message::assistant_tool_calls(calls),
            Message::tool_result("a", catalog::WEATHER_LOOKUP, r#"{"temperature":84}"#),
            Message::tool_result("b", catalog::GEOCODE, "not json"),
            Message::assistant("Here is what I found."),
        ];

        let contents = messages_to_gemini(&messages);
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "weather_lookup");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["latitude"], 25.76);

        let responses = contents[2]["parts"].as_array().unwrap();
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["functionResponse"]["response"]["temperature"], 84);
        assert_eq!(responses[1]["functionResponse"]["response"]["result"], "not json");
        assert_eq!(contents[3]["parts"][0]["text"], "Here is what I found.");
    }

    #[test]
    fn test_parse_function_calls_get_fresh_ids() {
        let v = json!({"candidates": [{"content": {"role": "model", "parts": [
            {"functionCall": {"name": "geocode", "args": {"placeName": "Miami, FL"}}},
            {"functionCall": {"name": "geocode", "args": {"placeName": "Tampa, FL"}}}
        ]}}]});
        let mut n = 0;
        let reply = parse_gemini_response(&v, || {
            n += 1;
            format!("id-{}", n)
        })
        .unwrap();

        let ModelReply::ToolCalls(calls) = reply else {
            panic!("expected tool calls");
        };
        assert_eq!(calls[0].id, "id-1");
        assert_eq!(calls[1].id, "id-2");
        assert_eq!(calls[1].get_string("placeName"), Some("Tampa, FL"));
    }

    #[test]
    fn test_parse_text_parts_are_joined() {
        let v = json!({"candidates": [{"content": {"parts": [
            {"text": "Stay indoors. "}, {"text": "Keep water ready."}
        ]}}]});
        assert_eq!(
            parse_gemini_response(&v, String::new).unwrap(),
            ModelReply::Draft("Stay indoors. Keep water ready.".to_string())
        );
    }

    #[test]
    fn test_blocked_prompt_is_invalid_response() {
        let v = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_gemini_response(&v, String::new).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
