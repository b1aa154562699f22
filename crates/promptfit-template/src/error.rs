//! Error types for chat template rendering.

use promptfit_common_message::ToolCallError;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while constructing or applying a chat template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A message is missing a required field or has the wrong shape.
    #[error("invalid message ({reason}): {message}")]
    Validation {
        /// What was wrong.
        reason: String,
        /// The offending message as supplied by the caller.
        message: JsonValue,
    },

    /// Tool call arguments could not be decoded into structured data.
    #[error("invalid arguments for tool '{tool}': {source}")]
    Parse {
        /// Name of the called function.
        tool: String,
        /// The raw arguments string.
        arguments: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The template engine failed while rendering.
    #[error("{0}")]
    Render(#[source] minijinja::Error),

    /// The template source failed to compile.
    #[error("template syntax error: {0}")]
    Syntax(#[source] minijinja::Error),

    /// Rewritten message content could not be encoded.
    #[error("failed to encode message content: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TemplateError {
    /// Create a validation error for the given message.
    pub fn validation(reason: impl Into<String>, message: &JsonValue) -> Self {
        Self::Validation {
            reason: reason.into(),
            message: message.clone(),
        }
    }

    /// Whether the error comes from the caller's input rather than the template.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Parse { .. })
    }
}

impl From<ToolCallError> for TemplateError {
    fn from(err: ToolCallError) -> Self {
        match err {
            ToolCallError::InvalidArguments { tool, arguments, source } => Self::Parse {
                tool,
                arguments,
                source,
            },
        }
    }
}

/// Result type alias using [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_carries_message() {
        let msg = json!({"role": "user"});
        let err = TemplateError::validation("message must have 'role' and 'content' fields", &msg);
        match &err {
            TemplateError::Validation { message, .. } => assert_eq!(message, &msg),
            _ => panic!("Expected Validation error"),
        }
        assert!(err.to_string().contains(r#"{"role":"user"}"#));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_tool_call_error_maps_to_parse() {
        let err: TemplateError = promptfit_common_message::decode_arguments("calc", "{oops")
            .unwrap_err()
            .into();
        match &err {
            TemplateError::Parse { tool, arguments, .. } => {
                assert_eq!(tool, "calc");
                assert_eq!(arguments, "{oops");
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
        assert!(err.is_input_error());
    }

    #[test]
    fn test_parse_error_display() {
        let source = serde_json::from_str::<JsonValue>("{oops").unwrap_err();
        let err = TemplateError::Parse {
            tool: "calc".into(),
            arguments: "{oops".into(),
            source,
        };
        assert!(err.to_string().starts_with("invalid arguments for tool 'calc'"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_render_error_is_verbatim() {
        let inner = minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "boom");
        let expected = inner.to_string();
        let err = TemplateError::Render(inner);
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_input_error());
    }
}
