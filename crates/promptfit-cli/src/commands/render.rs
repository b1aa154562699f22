//! Render command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueHint};
use promptfit_common_log::spans::{record_error, template_span};
use promptfit_template::CapabilityFlags;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::cli::{CommandContext, OutputFormat};
use crate::commands::{read_input, TemplateArgs};
use crate::error::CliError;
use crate::output;

/// Render a conversation through a chat template
#[derive(Debug, Parser)]
pub struct RenderCommand {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// JSON array of messages (`-` reads stdin)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub messages: PathBuf,

    /// JSON tool declarations passed to the template as `tools`
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tools: Option<PathBuf>,

    /// Append the assistant turn header
    #[arg(short = 'g', long)]
    pub add_generation_prompt: bool,

    /// Extra template variable as KEY=JSON (repeatable)
    #[arg(long = "extra", value_name = "KEY=JSON", value_parser = parse_extra)]
    pub extra: Vec<(String, JsonValue)>,
}

impl RenderCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let span = template_span("render", &self.template.label(ctx));
        let _guard = span.enter();

        self.run(ctx).map_err(|e| {
            record_error(&e);
            e
        })
    }

    fn run(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let template = self.template.load(ctx)?;

        let messages = match serde_json::from_str::<JsonValue>(&read_input(&self.messages)?)? {
            JsonValue::Array(messages) => messages,
            other => {
                return Err(CliError::validation(format!(
                    "messages must be a JSON array, got {}",
                    kind(&other)
                )))
            }
        };
        let tools: Option<JsonValue> = match &self.tools {
            Some(path) => Some(serde_json::from_str(&read_input(path)?)?),
            None => None,
        };
        let extra: Map<String, JsonValue> = self.extra.iter().cloned().collect();

        let prompt = promptfit_common_log::timed!(
            "apply",
            template.apply(
                &messages,
                tools.as_ref(),
                self.add_generation_prompt,
                (!extra.is_empty()).then_some(&extra),
            )?
        );

        match ctx.format {
            OutputFormat::Text => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(prompt.as_bytes())?;
                stdout.flush()?;
                Ok(())
            }
            OutputFormat::Json => output::emit(
                &Rendered {
                    prompt,
                    capabilities: template.capabilities(),
                },
                ctx.format,
            ),
        }
    }
}

#[derive(Serialize)]
struct Rendered {
    prompt: String,
    capabilities: CapabilityFlags,
}

impl std::fmt::Display for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prompt)
    }
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Parse `KEY=JSON`; a value that is not valid JSON is taken as a plain string.
fn parse_extra(raw: &str) -> anyhow::Result<(String, JsonValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=JSON, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("empty variable name in `{raw}`"));
    }

    let value = match serde_json::from_str(value) {
        Ok(value) => value,
        Err(_) => serde_json::to_value(value).with_context(|| format!("encoding `{key}`"))?,
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_extra_json_value() {
        assert_eq!(parse_extra("n=3").unwrap(), ("n".to_string(), json!(3)));
        assert_eq!(
            parse_extra(r#"tools_in_user_message={"a":[1,2]}"#).unwrap(),
            ("tools_in_user_message".to_string(), json!({"a": [1, 2]}))
        );
        assert_eq!(parse_extra("flag=false").unwrap().1, json!(false));
    }

    #[test]
    fn test_parse_extra_plain_string() {
        assert_eq!(parse_extra("date_string=26 Jul 2024").unwrap().1, json!("26 Jul 2024"));
        assert_eq!(parse_extra("eq=a=b").unwrap().1, json!("a=b"));
    }

    #[test]
    fn test_parse_extra_rejects_malformed() {
        assert!(parse_extra("no_equals").is_err());
        assert!(parse_extra("=1").is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(kind(&json!({})), "an object");
        assert_eq!(kind(&JsonValue::Null), "null");
    }
}
