//! Render context handed to the template engine.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Named values exposed to a template during one render.
///
/// Keys keep insertion order. Setting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext(Map<String, JsonValue>);

impl RenderContext {
    /// Create the base context every render starts from.
    pub fn new(
        messages: Vec<JsonValue>,
        add_generation_prompt: bool,
        bos_token: &str,
        eos_token: &str,
    ) -> Self {
        let mut vars = Map::new();
        vars.insert("messages".into(), JsonValue::Array(messages));
        vars.insert("add_generation_prompt".into(), add_generation_prompt.into());
        vars.insert("bos_token".into(), bos_token.into());
        vars.insert("eos_token".into(), eos_token.into());
        Self(vars)
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: JsonValue) {
        self.0.insert(key.into(), value);
    }

    /// Merge variables in iteration order; later keys win.
    pub fn extend(&mut self, extra: &Map<String, JsonValue>) {
        for (key, value) in extra {
            self.set(key.clone(), value.clone());
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// The message list the template will iterate.
    pub fn messages(&self) -> &[JsonValue] {
        self.0
            .get("messages")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Variables in insertion order.
    pub fn vars(&self) -> &Map<String, JsonValue> {
        &self.0
    }
}
