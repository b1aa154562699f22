//! Tool call types for assistant function invocations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The only tool call kind chat templates understand.
pub const FUNCTION_KIND: &str = "function";

fn default_kind() -> String {
    FUNCTION_KIND.to_string()
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier pairing this call with its `tool` response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call kind, `"function"` for every call a template can render.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// The function being invoked.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function call with string-encoded arguments.
    pub fn function(
        id: Option<impl Into<String>>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.map(Into::into),
            kind: default_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: Arguments::Encoded(arguments.into()),
            },
        }
    }

    /// Create a function call whose arguments are already structured.
    pub fn function_structured(
        id: Option<impl Into<String>>,
        name: impl Into<String>,
        arguments: JsonValue,
    ) -> Self {
        Self {
            id: id.map(Into::into),
            kind: default_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: Arguments::Structured(arguments),
            },
        }
    }

    /// Whether this call is a function call.
    pub fn is_function(&self) -> bool {
        self.kind == FUNCTION_KIND
    }
}

impl From<&ToolCall> for JsonValue {
    fn from(call: &ToolCall) -> Self {
        let mut function = Map::new();
        function.insert("name".into(), call.function.name.clone().into());
        function.insert("arguments".into(), JsonValue::from(&call.function.arguments));

        let mut map = Map::new();
        if let Some(id) = &call.id {
            map.insert("id".into(), id.clone().into());
        }
        map.insert("type".into(), call.kind.clone().into());
        map.insert("function".into(), JsonValue::Object(function));
        JsonValue::Object(map)
    }
}

/// Name and arguments of an invoked function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Function arguments.
    pub arguments: Arguments,
}

impl FunctionCall {
    /// Decode the arguments into a structured value.
    pub fn parse_arguments(&self) -> Result<JsonValue, ToolCallError> {
        match &self.arguments {
            Arguments::Encoded(raw) => decode_arguments(&self.name, raw),
            Arguments::Structured(value) => Ok(value.clone()),
        }
    }

    /// Parse arguments into a specific type.
    pub fn parse_arguments_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, ToolCallError> {
        let value = self.parse_arguments()?;
        let arguments = value.to_string();
        serde_json::from_value(value).map_err(|source| ToolCallError::InvalidArguments {
            tool: self.name.clone(),
            arguments,
            source,
        })
    }
}

/// Decode the JSON-encoded arguments of the function `tool`.
pub fn decode_arguments(tool: &str, raw: &str) -> Result<JsonValue, ToolCallError> {
    serde_json::from_str(raw).map_err(|source| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        arguments: raw.to_string(),
        source,
    })
}

/// Function arguments, either as a JSON string or as a JSON value.
///
/// OpenAI-style APIs send the encoded form; some templates iterate the
/// arguments and need the structured one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arguments {
    /// JSON text, e.g. `{"x":1}` as a string.
    Encoded(String),
    /// Already decoded JSON.
    Structured(JsonValue),
}

impl From<&Arguments> for JsonValue {
    fn from(arguments: &Arguments) -> Self {
        match arguments {
            Arguments::Encoded(raw) => JsonValue::String(raw.clone()),
            Arguments::Structured(value) => value.clone(),
        }
    }
}

/// Tool call error.
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    /// Arguments are not valid JSON, or not the expected shape.
    #[error("invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        /// Name of the called function.
        tool: String,
        /// The arguments as received.
        arguments: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}
