//! Tool declarations handed to templates.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Declaration of a tool the model may call.
///
/// Templates receive these verbatim; nothing in the rendering path looks
/// inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSpec(pub JsonValue);

impl ToolSpec {
    /// Build an OpenAI-style function declaration.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonValue,
    ) -> Self {
        Self(json!({
            "type": "function",
            "function": {
                "name": name.into(),
                "description": description.into(),
                "parameters": parameters,
            }
        }))
    }

    /// Collect declarations into the list value a template iterates.
    pub fn to_list(specs: &[ToolSpec]) -> JsonValue {
        JsonValue::Array(specs.iter().map(|s| s.0.clone()).collect())
    }
}

impl From<ToolSpec> for JsonValue {
    fn from(spec: ToolSpec) -> Self {
        spec.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_spec_shape() {
        let spec = ToolSpec::function("calc", "Evaluate math", json!({"type": "object"}));
        assert_eq!(spec.0["type"], "function");
        assert_eq!(spec.0["function"]["name"], "calc");
        assert_eq!(spec.0["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_spec_serializes_transparently() {
        let spec = ToolSpec(json!({"anything": [1, 2]}));
        assert_eq!(serde_json::to_value(&spec).unwrap(), json!({"anything": [1, 2]}));
    }

    #[test]
    fn test_to_list() {
        let specs = vec![ToolSpec(json!({"a": 1})), ToolSpec(json!({"b": 2}))];
        assert_eq!(ToolSpec::to_list(&specs), json!([{"a": 1}, {"b": 2}]));
    }
}
