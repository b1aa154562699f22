//! Detection of the conversational features a template honors.
//!
//! Three flags come from substring checks on the template source. Whether
//! system messages survive rendering is found out by rendering a synthetic
//! conversation once.

use serde_json::{json, Map, Value as JsonValue};

use crate::engine::TemplateEngine;
use crate::render::Renderer;

/// Marker whose presence in probe output proves system content was rendered.
pub const SYSTEM_NEEDLE: &str = "<System Needle>";

const TOOLS_MARKER: &str = "tools";
const OBJECT_ARGUMENT_MARKERS: [&str; 2] = [
    "tool_call.arguments | items",
    "tool_call.arguments | tojson",
];
const PARALLEL_TOOL_CALLS_MARKER: &str = "tool_call_id";

/// Features a chat template supports. Fixed once a template is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CapabilityFlags {
    /// The template renders tool declarations, calls and responses.
    pub supports_tools: bool,
    /// Tool call arguments must be structured values, not JSON strings.
    pub requires_object_arguments: bool,
    /// The template distinguishes tool calls by identifier.
    pub supports_parallel_tool_calls: bool,
    /// System messages reach the rendered output.
    pub supports_system_role: bool,
}

impl CapabilityFlags {
    /// Flags derivable from the source text alone.
    ///
    /// System role support cannot be seen statically and starts out `true`.
    pub fn from_source(source: &str) -> Self {
        Self {
            supports_tools: source.contains(TOOLS_MARKER),
            requires_object_arguments: OBJECT_ARGUMENT_MARKERS
                .iter()
                .any(|marker| source.contains(marker)),
            supports_parallel_tool_calls: source.contains(PARALLEL_TOOL_CALLS_MARKER),
            supports_system_role: true,
        }
    }

    /// Whether conversations must be rewritten before this template sees them.
    pub fn needs_normalization(&self) -> bool {
        self.requires_object_arguments || !self.supports_tools || !self.supports_system_role
    }
}

impl Default for CapabilityFlags {
    fn default() -> Self {
        Self {
            supports_tools: true,
            requires_object_arguments: false,
            supports_parallel_tool_calls: false,
            supports_system_role: true,
        }
    }
}

/// Probe a compiled template for its capabilities.
///
/// Never fails: a render error during the probe means the feature is absent.
pub fn probe<E: TemplateEngine + ?Sized>(
    source: &str,
    engine: &E,
    bos_token: &str,
    eos_token: &str,
) -> CapabilityFlags {
    let mut flags = CapabilityFlags::from_source(source);
    let renderer = Renderer {
        engine,
        flags,
        bos_token,
        eos_token,
    };
    flags.supports_system_role = renders_needles(
        &renderer,
        &[SYSTEM_NEEDLE],
        &[
            json!({"role": "system", "content": SYSTEM_NEEDLE}),
            json!({"role": "user", "content": "Hey"}),
        ],
        None,
        false,
        None,
    );

    tracing::debug!(
        supports_tools = flags.supports_tools,
        requires_object_arguments = flags.requires_object_arguments,
        supports_parallel_tool_calls = flags.supports_parallel_tool_calls,
        supports_system_role = flags.supports_system_role,
        "probed chat template capabilities"
    );
    flags
}

/// Whether rendering the conversation yields output containing every needle.
///
/// Any failure along the way counts as the needles being absent.
pub fn renders_needles<E: TemplateEngine + ?Sized>(
    renderer: &Renderer<'_, E>,
    needles: &[&str],
    messages: &[JsonValue],
    tools: Option<&JsonValue>,
    add_generation_prompt: bool,
    extra_context: Option<&Map<String, JsonValue>>,
) -> bool {
    match renderer.render(messages, tools, add_generation_prompt, extra_context) {
        Ok(prompt) => needles.iter().all(|needle| prompt.contains(needle)),
        Err(e) => {
            tracing::debug!(error = %e, "probe render failed");
            false
        }
    }
}
