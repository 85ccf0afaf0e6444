//! Conversation history as seen by model providers.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in a conversation (Entity)
///
/// Assistant messages may carry tool calls instead of text; tool messages
/// carry the result of one call, correlated by `tool_call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(Role::Assistant, "")
        }
    }

    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            tool_name: Some(tool_name.into()),
            ..Self::plain(Role::Tool, content)
        }
    }
}

/// Ordered history passed to a model provider for one generation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    messages: Vec<Message>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.push(Message::system(system_prompt));
        ctx
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The system prompt, when the history starts with one.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Messages after the system prompt.
    pub fn dialogue(&self) -> &[Message] {
        match self.system_prompt() {
            Some(_) => &self.messages[1..],
            None => &self.messages,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_split() {
        let mut ctx = ConversationContext::with_system("be helpful");
        ctx.push(Message::user("hi"));
        assert_eq!(ctx.system_prompt(), Some("be helpful"));
        assert_eq!(ctx.dialogue().len(), 1);
        assert_eq!(ctx.dialogue()[0].role, Role::User);

        let bare = ConversationContext::new();
        assert_eq!(bare.system_prompt(), None);
        assert!(bare.dialogue().is_empty());
    }

    #[test]
    fn test_tool_messages() {
        let call = ToolCall::new("c1", "geocode").with_arg("placeName", "Miami");
        let asst = Message::assistant_tool_calls(vec![call]);
        assert_eq!(asst.role, Role::Assistant);
        assert_eq!(asst.tool_calls.len(), 1);

        let result = Message::tool_result("c1", "geocode", "{\"latitude\":25.76}");
        assert_eq!(result.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(result.tool_name.as_deref(), Some("geocode"));
    }
}
