//! Rewriting conversations into a shape a template can render.
//!
//! Templates without tool support get tool calls and tool responses inlined
//! as JSON text. Templates that ignore or reject system messages get system
//! text folded into the next user turn. Templates that iterate tool
//! arguments get them decoded from their string form. Nothing the caller
//! supplied is dropped.

use std::borrow::Cow;

use promptfit_common_message::{decode_arguments, role, FUNCTION_KIND};
use serde_json::{Map, Value as JsonValue};

use crate::capabilities::CapabilityFlags;
use crate::error::{Result, TemplateError};

/// Rewrite `messages` for a template with the given capabilities.
///
/// Returns the input untouched when the template needs no help. The
/// caller's messages are never modified; on error nothing is returned.
pub fn normalize<'a>(
    messages: &'a [JsonValue],
    flags: &CapabilityFlags,
) -> Result<Cow<'a, [JsonValue]>> {
    if !flags.needs_normalization() {
        return Ok(Cow::Borrowed(messages));
    }

    let mut normalized = Vec::with_capacity(messages.len());
    let mut pending_system = PendingSystem::default();

    for original in messages {
        let mut message = original
            .as_object()
            .cloned()
            .ok_or_else(|| TemplateError::validation("message must be an object", original))?;

        let message_role = match (message.get("role"), message.contains_key("content")) {
            (Some(JsonValue::String(name)), true) => name.clone(),
            _ => {
                return Err(TemplateError::validation(
                    "message must have 'role' and 'content' fields",
                    original,
                ))
            }
        };

        if has_tool_calls(&message) {
            if flags.requires_object_arguments || !flags.supports_tools {
                decode_tool_call_arguments(&mut message, original)?;
            }
            if !flags.supports_tools {
                inline_tool_calls(&mut message, original)?;
            }
        }
        if !flags.supports_tools && message_role == role::TOOL {
            inline_tool_response(&mut message, original)?;
        }

        if !flags.supports_system_role {
            match message.get("content") {
                Some(JsonValue::String(content)) => {
                    let content = content.clone();
                    if message_role == role::SYSTEM {
                        pending_system.push(&content);
                        continue;
                    } else if message_role == role::USER {
                        if let Some(system) = pending_system.take() {
                            let merged = if content.is_empty() {
                                system
                            } else {
                                format!("{system}\n{content}")
                            };
                            message.insert("content".into(), merged.into());
                        }
                    } else if let Some(system) = pending_system.take() {
                        normalized.push(user_message(system));
                    }
                }
                Some(JsonValue::Null) | None => {}
                Some(_) => {
                    return Err(TemplateError::validation(
                        "content must be a string to fold system messages",
                        original,
                    ))
                }
            }
        }

        normalized.push(JsonValue::Object(message));
    }

    if let Some(system) = pending_system.take() {
        normalized.push(user_message(system));
    }

    tracing::trace!(
        input = messages.len(),
        output = normalized.len(),
        "normalized conversation"
    );
    Ok(Cow::Owned(normalized))
}

/// System text waiting for the next user turn.
#[derive(Debug, Default)]
struct PendingSystem(String);

impl PendingSystem {
    fn push(&mut self, content: &str) {
        if !self.0.is_empty() {
            self.0.push('\n');
        }
        self.0.push_str(content);
    }

    fn take(&mut self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.0))
        }
    }
}

fn user_message(content: String) -> JsonValue {
    let mut message = Map::new();
    message.insert("role".into(), role::USER.into());
    message.insert("content".into(), content.into());
    JsonValue::Object(message)
}

fn has_tool_calls(message: &Map<String, JsonValue>) -> bool {
    !matches!(message.get("tool_calls"), None | Some(JsonValue::Null))
}

fn is_function_call(call: &JsonValue) -> bool {
    call.get("type").and_then(JsonValue::as_str) == Some(FUNCTION_KIND)
}

fn tool_calls_mut<'m>(
    message: &'m mut Map<String, JsonValue>,
    original: &JsonValue,
) -> Result<&'m mut Vec<JsonValue>> {
    message
        .get_mut("tool_calls")
        .and_then(JsonValue::as_array_mut)
        .ok_or_else(|| TemplateError::validation("'tool_calls' must be an array", original))
}

fn function_of<'c>(call: &'c JsonValue, original: &JsonValue) -> Result<&'c Map<String, JsonValue>> {
    call.get("function")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| TemplateError::validation("function tool call must have a 'function' object", original))
}

/// Decode string-encoded arguments of every function call in place.
fn decode_tool_call_arguments(message: &mut Map<String, JsonValue>, original: &JsonValue) -> Result<()> {
    for call in tool_calls_mut(message, original)? {
        if !is_function_call(call) {
            continue;
        }
        let function = call
            .get_mut("function")
            .and_then(JsonValue::as_object_mut)
            .ok_or_else(|| {
                TemplateError::validation("function tool call must have a 'function' object", original)
            })?;

        let decoded = match function.get("arguments") {
            Some(JsonValue::String(raw)) => {
                let tool = function.get("name").and_then(JsonValue::as_str).unwrap_or_default();
                decode_arguments(tool, raw)?
            }
            Some(_) => continue,
            None => {
                return Err(TemplateError::validation(
                    "function tool call must have 'arguments'",
                    original,
                ))
            }
        };
        function.insert("arguments".into(), decoded);
    }
    Ok(())
}

/// Replace `tool_calls` with a JSON text summary in `content`.
fn inline_tool_calls(message: &mut Map<String, JsonValue>, original: &JsonValue) -> Result<()> {
    let mut calls = Vec::new();
    let tool_calls = message
        .get("tool_calls")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| TemplateError::validation("'tool_calls' must be an array", original))?;
    for call in tool_calls {
        if !is_function_call(call) {
            continue;
        }
        let function = function_of(call, original)?;
        let name = function
            .get("name")
            .ok_or_else(|| TemplateError::validation("function tool call must have a 'name'", original))?;

        let mut entry = Map::new();
        entry.insert("name".into(), name.clone());
        entry.insert(
            "arguments".into(),
            function.get("arguments").cloned().unwrap_or(JsonValue::Null),
        );
        if let Some(id) = call.get("id") {
            entry.insert("id".into(), id.clone());
        }
        calls.push(JsonValue::Object(entry));
    }

    let mut summary = Map::new();
    summary.insert("tool_calls".into(), JsonValue::Array(calls));
    match message.get("content") {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::String(text)) if text.is_empty() => {}
        Some(content) => {
            summary.insert("content".into(), content.clone());
        }
    }

    message.insert("content".into(), to_pretty_json(&JsonValue::Object(summary))?.into());
    message.shift_remove("tool_calls");
    Ok(())
}

/// Turn a `tool` message into a `user` message carrying a `tool_response` object.
fn inline_tool_response(message: &mut Map<String, JsonValue>, original: &JsonValue) -> Result<()> {
    let name = message
        .get("name")
        .cloned()
        .ok_or_else(|| TemplateError::validation("tool message must have a 'name' field", original))?;

    let mut response = Map::new();
    response.insert("tool".into(), name);
    response.insert(
        "content".into(),
        message.get("content").cloned().unwrap_or(JsonValue::Null),
    );
    if let Some(id) = message.get("tool_call_id") {
        response.insert("tool_call_id".into(), id.clone());
    }

    let mut wrapper = Map::new();
    wrapper.insert("tool_response".into(), JsonValue::Object(response));

    message.insert("role".into(), role::USER.into());
    message.insert("content".into(), to_pretty_json(&JsonValue::Object(wrapper))?.into());
    message.shift_remove("name");
    Ok(())
}

fn to_pretty_json(value: &JsonValue) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(TemplateError::Encode)
}
