//! Test utilities for Promptfit crates.

use std::path::PathBuf;

use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;

/// Chat templates modelled on the families seen in the wild.
pub mod templates {
    /// ChatML. Renders system messages, knows nothing about tools.
    pub const CHATML: &str = r#"{% for message in messages %}{{ '<|im_start|>' ~ message['role'] ~ '\n' ~ message['content'] ~ '<|im_end|>\n' }}{% endfor %}{% if add_generation_prompt %}{{ '<|im_start|>assistant\n' }}{% endif %}"#;

    /// Tool-aware template taking string arguments and call ids.
    pub const TOOL_AWARE: &str = r#"{% if tools %}<tools>{{ tools | tojson }}</tools>{% endif %}{% for message in messages %}<|{{ message.role }}|>{% if message.content %}{{ message.content }}{% endif %}{% if message.tool_calls %}{% for tool_call in message.tool_calls %}<call id="{{ tool_call.id }}">{{ tool_call.function.name }} {{ tool_call.function.arguments }}</call>{% endfor %}{% endif %}{% if message.tool_call_id %} [{{ message.tool_call_id }}]{% endif %}{% endfor %}{% if add_generation_prompt %}<|assistant|>{% endif %}"#;

    /// Llama 3.1 style: serializes tool call arguments itself, so needs objects.
    pub const OBJECT_ARGUMENTS: &str = r#"{{ bos_token }}{% for message in messages %}{% if message.tool_calls %}{% for call in message.tool_calls %}{% set tool_call = call.function %}<|python_tag|>{"name": "{{ tool_call.name }}", "parameters": {{ tool_call.arguments | tojson }} }<|eom_id|>{% endfor %}{% else %}<|{{ message.role }}|>{{ message.content }}<|eot_id|>{% endif %}{% endfor %}{% if tools %}<|tools:{{ tools | length }}|>{% endif %}{% if add_generation_prompt %}<|assistant|>{% endif %}"#;

    /// Gemma style: raises on a leading system message, no tools.
    pub const RAISES_ON_SYSTEM: &str = r#"{{ bos_token }}{% if messages[0]['role'] == 'system' %}{{ raise_exception('System role not supported') }}{% endif %}{% for message in messages %}{% set role = 'model' if message['role'] == 'assistant' else message['role'] %}{{ '<start_of_turn>' ~ role ~ '\n' ~ message['content'] | trim ~ '<end_of_turn>\n' }}{% endfor %}{% if add_generation_prompt %}{{ '<start_of_turn>model\n' }}{% endif %}"#;

    /// Mistral style: silently drops anything but user and assistant turns.
    pub const DROPS_SYSTEM: &str = r#"{{ bos_token }}{% for message in messages %}{% if message['role'] == 'user' %}{{ '[INST] ' ~ message['content'] ~ ' [/INST]' }}{% elif message['role'] == 'assistant' %}{{ message['content'] ~ eos_token }}{% endif %}{% endfor %}"#;
}

/// A system prompt followed by one user turn.
pub fn system_then_user(system: &str, user: &str) -> Vec<JsonValue> {
    vec![
        json!({"role": "system", "content": system}),
        json!({"role": "user", "content": user}),
    ]
}

/// A full tool round trip: question, call, result, answer.
pub fn tool_round_trip() -> Vec<JsonValue> {
    vec![
        json!({"role": "user", "content": "What is 2+2?"}),
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "c1",
                "type": "function",
                "function": {"name": "calc", "arguments": "{\"x\":1}"}
            }]
        }),
        json!({"role": "tool", "name": "calc", "content": "4", "tool_call_id": "c1"}),
        json!({"role": "assistant", "content": "It is 4."}),
    ]
}

/// A single calculator tool declaration.
pub fn calc_tools() -> JsonValue {
    json!([{
        "type": "function",
        "function": {
            "name": "calc",
            "description": "Evaluate arithmetic",
            "parameters": {"type": "object", "properties": {"x": {"type": "integer"}}}
        }
    }])
}

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given name and content.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
