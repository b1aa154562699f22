//! The chat template facade.

use promptfit_common_message::{conversation_to_json, Message, ToolSpec};
use serde_json::{Map, Value as JsonValue};

use crate::capabilities::{probe, CapabilityFlags};
use crate::context::RenderContext;
use crate::engine::{JinjaEngine, ParseOptions, TemplateEngine};
use crate::error::Result;
use crate::render::Renderer;

/// A chat template together with the capabilities it was found to have.
///
/// Capabilities are probed once, at construction, and never change. `apply`
/// only reads shared state, so one instance can serve many threads.
///
/// ```
/// use promptfit_template::ChatTemplate;
/// use serde_json::json;
///
/// let template = ChatTemplate::new(
///     "{% for m in messages %}[{{ m.role }}] {{ m.content }}\n{% endfor %}",
///     "<s>",
///     "</s>",
/// )
/// .unwrap();
///
/// let prompt = template
///     .apply(&[json!({"role": "user", "content": "Hey"})], None, false, None)
///     .unwrap();
/// assert_eq!(prompt, "[user] Hey\n");
/// ```
#[derive(Debug)]
pub struct ChatTemplate<E: TemplateEngine = JinjaEngine> {
    source: String,
    bos_token: String,
    eos_token: String,
    capabilities: CapabilityFlags,
    engine: E,
}

impl ChatTemplate<JinjaEngine> {
    /// Compile a Jinja chat template with default whitespace handling and probe it.
    pub fn new(
        source: impl Into<String>,
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_options(source, bos_token, eos_token, ParseOptions::default())
    }

    /// Compile a Jinja chat template with explicit whitespace handling and probe it.
    pub fn with_options(
        source: impl Into<String>,
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
        options: ParseOptions,
    ) -> Result<Self> {
        let source = source.into();
        let engine = JinjaEngine::parse(&source, options)?;
        Ok(Self::with_engine(source, bos_token, eos_token, engine))
    }
}

impl<E: TemplateEngine> ChatTemplate<E> {
    /// Wrap an already compiled template and probe it.
    pub fn with_engine(
        source: impl Into<String>,
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
        engine: E,
    ) -> Self {
        let source = source.into();
        let bos_token = bos_token.into();
        let eos_token = eos_token.into();
        let capabilities = probe(&source, &engine, &bos_token, &eos_token);

        Self {
            source,
            bos_token,
            eos_token,
            capabilities,
            engine,
        }
    }

    /// Render a conversation into a prompt.
    ///
    /// `tools` is exposed to the template unchanged when present and not
    /// null. `extra_context` entries are set afterwards in iteration order
    /// and may override any other variable, `tools` included. Render errors
    /// are returned as the engine reported them.
    #[tracing::instrument(level = "debug", skip_all, fields(messages = messages.len()))]
    pub fn apply(
        &self,
        messages: &[JsonValue],
        tools: Option<&JsonValue>,
        add_generation_prompt: bool,
        extra_context: Option<&Map<String, JsonValue>>,
    ) -> Result<String> {
        self.renderer()
            .render(messages, tools, add_generation_prompt, extra_context)
    }

    /// Render typed messages and tool declarations.
    pub fn apply_messages(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
        add_generation_prompt: bool,
        extra_context: Option<&Map<String, JsonValue>>,
    ) -> Result<String> {
        let messages = conversation_to_json(messages);
        let tools = tools.map(ToolSpec::to_list);
        self.apply(&messages, tools.as_ref(), add_generation_prompt, extra_context)
    }

    /// Build the context `apply` would render, without rendering it.
    pub fn render_context(
        &self,
        messages: &[JsonValue],
        tools: Option<&JsonValue>,
        add_generation_prompt: bool,
        extra_context: Option<&Map<String, JsonValue>>,
    ) -> Result<RenderContext> {
        self.renderer()
            .context(messages, tools, add_generation_prompt, extra_context)
    }

    fn renderer(&self) -> Renderer<'_, E> {
        Renderer {
            engine: &self.engine,
            flags: self.capabilities,
            bos_token: &self.bos_token,
            eos_token: &self.eos_token,
        }
    }

    /// Template source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Begin-of-sequence token.
    pub fn bos_token(&self) -> &str {
        &self.bos_token
    }

    /// End-of-sequence token.
    pub fn eos_token(&self) -> &str {
        &self.eos_token
    }

    /// All probed capabilities.
    pub fn capabilities(&self) -> CapabilityFlags {
        self.capabilities
    }

    /// Whether the template renders tools natively.
    pub fn supports_tools(&self) -> bool {
        self.capabilities.supports_tools
    }

    /// Whether the template expects structured tool call arguments.
    pub fn requires_object_arguments(&self) -> bool {
        self.capabilities.requires_object_arguments
    }

    /// Whether the template tracks tool call identifiers.
    pub fn supports_parallel_tool_calls(&self) -> bool {
        self.capabilities.supports_parallel_tool_calls
    }

    /// Whether system messages reach the output.
    pub fn supports_system_role(&self) -> bool {
        self.capabilities.supports_system_role
    }
}
