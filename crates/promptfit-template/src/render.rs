//! Normalize-then-render pipeline shared by probing and `apply`.

use serde_json::{Map, Value as JsonValue};

use crate::capabilities::CapabilityFlags;
use crate::context::RenderContext;
use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::normalize::normalize;

/// Everything needed to turn a conversation into a prompt.
pub struct Renderer<'a, E: TemplateEngine + ?Sized> {
    /// Compiled template.
    pub engine: &'a E,
    /// Capabilities used to normalize the conversation.
    pub flags: CapabilityFlags,
    /// Begin-of-sequence token exposed as `bos_token`.
    pub bos_token: &'a str,
    /// End-of-sequence token exposed as `eos_token`.
    pub eos_token: &'a str,
}

impl<E: TemplateEngine + ?Sized> Renderer<'_, E> {
    /// Build the render context for a conversation.
    pub fn context(
        &self,
        messages: &[JsonValue],
        tools: Option<&JsonValue>,
        add_generation_prompt: bool,
        extra_context: Option<&Map<String, JsonValue>>,
    ) -> Result<RenderContext> {
        let messages = normalize(messages, &self.flags)?.into_owned();
        let mut context =
            RenderContext::new(messages, add_generation_prompt, self.bos_token, self.eos_token);

        if let Some(tools) = tools.filter(|t| !t.is_null()) {
            context.set("tools", tools.clone());
        }
        if let Some(extra) = extra_context {
            context.extend(extra);
        }
        Ok(context)
    }

    /// Normalize the conversation and render it.
    pub fn render(
        &self,
        messages: &[JsonValue],
        tools: Option<&JsonValue>,
        add_generation_prompt: bool,
        extra_context: Option<&Map<String, JsonValue>>,
    ) -> Result<String> {
        let context = self.context(messages, tools, add_generation_prompt, extra_context)?;
        self.engine.render(&context)
    }
}
