//! End-to-end rendering against representative chat templates.

use std::sync::Arc;

use promptfit_common_message::{Message, ToolCall, ToolSpec};
use promptfit_template::{ChatTemplate, TemplateError};
use promptfit_test_utils::{assert_err, assert_ok, calc_tools, system_then_user, templates, tool_round_trip};
use serde_json::{json, Map, Value as JsonValue};

fn chat_template(source: &str, bos: &str, eos: &str) -> ChatTemplate {
    assert_ok!(ChatTemplate::new(source, bos, eos))
}

#[test]
fn test_chatml_capabilities() {
    let template = chat_template(templates::CHATML, "", "");
    assert!(!template.supports_tools());
    assert!(!template.requires_object_arguments());
    assert!(!template.supports_parallel_tool_calls());
    assert!(template.supports_system_role());
}

#[test]
fn test_chatml_renders_system_turn() {
    let template = chat_template(templates::CHATML, "", "");
    let prompt = assert_ok!(template.apply(&system_then_user("Be brief.", "Hey"), None, true, None));
    assert_eq!(
        prompt,
        "<|im_start|>system\nBe brief.<|im_end|>\n<|im_start|>user\nHey<|im_end|>\n<|im_start|>assistant\n"
    );
}

#[test]
fn test_chatml_inlines_tool_round_trip() {
    let template = chat_template(templates::CHATML, "", "");
    let prompt = assert_ok!(template.apply(&tool_round_trip(), None, false, None));

    assert!(prompt.contains("<|im_start|>assistant\n{\n  \"tool_calls\": ["));
    assert!(prompt.contains("\"name\": \"calc\""));
    assert!(prompt.contains("\"id\": \"c1\""));
    assert!(prompt.contains("<|im_start|>user\n{\n  \"tool_response\": {"));
    assert!(prompt.contains("\"tool_call_id\": \"c1\""));
    assert!(!prompt.contains("<|im_start|>tool"));
}

#[test]
fn test_tool_aware_template_is_native() {
    let template = chat_template(templates::TOOL_AWARE, "", "");
    let caps = template.capabilities();
    assert!(caps.supports_tools);
    assert!(caps.supports_parallel_tool_calls);
    assert!(!caps.requires_object_arguments);
    assert!(caps.supports_system_role);
    assert!(!caps.needs_normalization());
}

#[test]
fn test_tool_aware_renders_string_arguments() {
    let template = chat_template(templates::TOOL_AWARE, "", "");
    let prompt = assert_ok!(template.apply(&tool_round_trip(), Some(&calc_tools()), true, None));

    assert!(prompt.starts_with("<tools>["));
    assert!(prompt.ends_with(
        "<|user|>What is 2+2?<|assistant|><call id=\"c1\">calc {\"x\":1}</call><|tool|>4 [c1]<|assistant|>It is 4.<|assistant|>"
    ));
}

#[test]
fn test_object_arguments_reach_template_as_objects() {
    let template = chat_template(templates::OBJECT_ARGUMENTS, "<|begin_of_text|>", "<|eot_id|>");
    assert!(template.requires_object_arguments());
    assert!(template.supports_tools());
    assert!(template.supports_system_role());

    let prompt = assert_ok!(template.apply(&tool_round_trip(), Some(&calc_tools()), false, None));
    assert!(prompt.starts_with("<|begin_of_text|><|user|>What is 2+2?<|eot_id|>"));
    assert!(prompt.contains(r#"<|python_tag|>{"name": "calc", "parameters": {"x":1} }<|eom_id|>"#));
    assert!(prompt.contains("<|tool|>4<|eot_id|>"));
    assert!(prompt.ends_with("<|tools:1|>"));
}

#[test]
fn test_object_arguments_context_holds_structured_value() {
    let template = chat_template(templates::OBJECT_ARGUMENTS, "", "");
    let ctx = assert_ok!(template.render_context(&tool_round_trip(), None, false, None));
    assert_eq!(ctx.messages()[1]["tool_calls"][0]["function"]["arguments"], json!({"x": 1}));
}

#[test]
fn test_object_arguments_with_typed_messages() {
    let template = chat_template(templates::OBJECT_ARGUMENTS, "", "");
    let conversation = vec![
        Message::user("What is 2+2?"),
        Message::assistant_tool_calls(vec![ToolCall::function(Some("c1"), "calc", r#"{"x":1}"#)]),
        Message::tool_result("calc", "4", Some("c1")),
    ];
    let tools = vec![ToolSpec::function("calc", "Evaluate arithmetic", json!({"type": "object"}))];
    let prompt = assert_ok!(template.apply_messages(&conversation, Some(&tools), true, None));
    assert!(prompt.contains(r#""parameters": {"x":1} }"#));
    assert!(prompt.ends_with("<|tools:1|><|assistant|>"));
}

#[test]
fn test_malformed_arguments_fail_apply() {
    let template = chat_template(templates::OBJECT_ARGUMENTS, "", "");
    let conversation = vec![json!({
        "role": "assistant",
        "content": null,
        "tool_calls": [{"id": "c1", "type": "function", "function": {"name": "calc", "arguments": "x=1"}}]
    })];
    let err = assert_err!(template.apply(&conversation, None, false, None));
    assert!(matches!(err, TemplateError::Parse { ref tool, .. } if tool == "calc"));
}

#[test]
fn test_raising_template_probes_without_system_role() {
    let template = chat_template(templates::RAISES_ON_SYSTEM, "<bos>", "<eos>");
    assert!(!template.supports_system_role());
    assert!(!template.supports_tools());
}

#[test]
fn test_raising_template_folds_system_into_user() {
    let template = chat_template(templates::RAISES_ON_SYSTEM, "<bos>", "<eos>");
    let mut conversation = system_then_user("Be brief.", "Hey");
    conversation.push(json!({"role": "assistant", "content": "Hi"}));

    let prompt = assert_ok!(template.apply(&conversation, None, true, None));
    assert_eq!(
        prompt,
        "<bos><start_of_turn>user\nBe brief.\nHey<end_of_turn>\n<start_of_turn>model\nHi<end_of_turn>\n<start_of_turn>model\n"
    );
}

#[test]
fn test_dropping_template_keeps_system_text() {
    let template = chat_template(templates::DROPS_SYSTEM, "<s>", "</s>");
    assert!(!template.supports_system_role());

    let conversation = vec![
        json!({"role": "system", "content": "A"}),
        json!({"role": "system", "content": "B"}),
        json!({"role": "user", "content": "Hey"}),
    ];
    let prompt = assert_ok!(template.apply(&conversation, None, false, None));
    assert_eq!(prompt, "<s>[INST] A\nB\nHey [/INST]");
}

#[test]
fn test_dropping_template_trailing_system() {
    let template = chat_template(templates::DROPS_SYSTEM, "<s>", "</s>");
    let conversation = vec![
        json!({"role": "user", "content": "Hey"}),
        json!({"role": "assistant", "content": "Hi"}),
        json!({"role": "system", "content": "Answer in French."}),
    ];
    let prompt = assert_ok!(template.apply(&conversation, None, false, None));
    assert_eq!(prompt, "<s>[INST] Hey [/INST]Hi</s>[INST] Answer in French. [/INST]");
}

#[test]
fn test_probe_failure_is_swallowed_but_apply_failure_is_not() {
    let source = "{% if not add_generation_prompt %}{{ raise_exception('generation prompt required') }}{% endif %}{% for m in messages %}{{ m.content }}{% endfor %}";
    let template = chat_template(source, "", "");
    assert!(!template.supports_system_role());

    let err = assert_err!(template.apply(&system_then_user("S", "Hey"), None, false, None));
    assert!(matches!(err, TemplateError::Render(_)));
    assert!(err.to_string().contains("generation prompt required"));

    let prompt = assert_ok!(template.apply(&system_then_user("S", "Hey"), None, true, None));
    assert_eq!(prompt, "S\nHey");
}

#[test]
fn test_syntax_error_at_construction() {
    let err = assert_err!(ChatTemplate::new("{% for message in messages %}", "", ""));
    assert!(matches!(err, TemplateError::Syntax(_)));
}

#[test]
fn test_extra_context_reaches_template() {
    let template = chat_template("{{ date_string }}|{{ tools }}|{% for m in messages %}{{ m.content }}{% endfor %}", "", "");
    let mut extra = Map::new();
    extra.insert("date_string".into(), json!("26 Jul 2024"));
    extra.insert("tools".into(), json!("none"));
    let prompt = assert_ok!(template.apply(
        &[json!({"role": "user", "content": "Hey"})],
        Some(&calc_tools()),
        false,
        Some(&extra),
    ));
    assert_eq!(prompt, "26 Jul 2024|none|Hey");
}

#[test]
fn test_apply_is_idempotent() {
    let template = chat_template(templates::RAISES_ON_SYSTEM, "<bos>", "<eos>");
    let conversation = tool_round_trip();
    let first = assert_ok!(template.apply(&conversation, None, true, None));
    let second = assert_ok!(template.apply(&conversation, None, true, None));
    assert_eq!(first, second);
}

#[test]
fn test_caller_messages_untouched() {
    let template = chat_template(templates::RAISES_ON_SYSTEM, "", "");
    let conversation = tool_round_trip();
    let snapshot: Vec<JsonValue> = conversation.clone();
    assert_ok!(template.apply(&conversation, None, false, None));
    assert_eq!(conversation, snapshot);
}

#[test]
fn test_concurrent_apply() {
    let template = Arc::new(chat_template(templates::DROPS_SYSTEM, "<s>", "</s>"));
    let expected = assert_ok!(template.apply(&system_then_user("A", "Hey"), None, false, None));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let template = Arc::clone(&template);
            let expected = expected.clone();
            scope.spawn(move || {
                let prompt = template.apply(&system_then_user("A", "Hey"), None, false, None).unwrap();
                assert_eq!(prompt, expected);
            });
        }
    });
}
