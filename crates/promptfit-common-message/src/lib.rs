//! Conversation types for chat template rendering.
//!
//! This crate provides the uniform message schema (role, content, optional
//! tool calls) that conversations are expressed in before a chat template
//! renders them, plus the opaque tool declarations passed alongside.

#![warn(missing_docs)]

mod call;
mod spec;

pub use call::{decode_arguments, Arguments, FunctionCall, ToolCall, ToolCallError, FUNCTION_KIND};
pub use spec::ToolSpec;

// Re-export common types
pub use serde_json::Value as JsonValue;

use serde_json::Map;

/// Well-known role names.
pub mod role {
    /// System instructions.
    pub const SYSTEM: &str = "system";
    /// End-user turn.
    pub const USER: &str = "user";
    /// Model turn.
    pub const ASSISTANT: &str = "assistant";
    /// Tool response turn.
    pub const TOOL: &str = "tool";
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Message role.
    pub role: String,
    /// Message content, `None` only for tool-call-only assistant turns.
    pub content: Option<String>,
    /// Tool calls requested by an assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool name for tool results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool call ID for tool results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a message with the given role and text.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            name: None,
            tool_call_id: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(role::SYSTEM, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(role::USER, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(role::ASSISTANT, content)
    }

    /// Create an assistant message that only carries tool calls.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: role::ASSISTANT.to_string(),
            content: None,
            tool_calls,
            name: None,
            tool_call_id: None,
        }
    }

    /// Create a tool result message.
    pub fn tool_result(
        name: impl Into<String>,
        content: impl Into<String>,
        tool_call_id: Option<impl Into<String>>,
    ) -> Self {
        Self {
            role: role::TOOL.to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            name: Some(name.into()),
            tool_call_id: tool_call_id.map(Into::into),
        }
    }

    /// Attach tool calls to this message.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Convert to the JSON object a template sees.
    ///
    /// `content` is always present, as `null` when the message has none.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::from(self)
    }
}

impl From<&Message> for JsonValue {
    fn from(message: &Message) -> Self {
        let mut map = Map::new();
        map.insert("role".into(), message.role.clone().into());
        map.insert(
            "content".into(),
            message.content.clone().map_or(JsonValue::Null, JsonValue::String),
        );
        if !message.tool_calls.is_empty() {
            map.insert(
                "tool_calls".into(),
                message.tool_calls.iter().map(JsonValue::from).collect(),
            );
        }
        if let Some(name) = &message.name {
            map.insert("name".into(), name.clone().into());
        }
        if let Some(id) = &message.tool_call_id {
            map.insert("tool_call_id".into(), id.clone().into());
        }
        JsonValue::Object(map)
    }
}

/// Convert a typed conversation into the JSON form templates consume.
pub fn conversation_to_json(messages: &[Message]) -> Vec<JsonValue> {
    messages.iter().map(JsonValue::from).collect()
}
