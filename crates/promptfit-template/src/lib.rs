//! Chat template adaptation.
//!
//! Chat templates are written by model authors who assume different things
//! about the conversations they render: some have no system role, some do
//! not know about tools, some expect tool call arguments as objects rather
//! than JSON strings. [`ChatTemplate`] probes a template once for these
//! features and rewrites every conversation so it renders correctly without
//! losing information.

#![warn(missing_docs)]

mod capabilities;
mod chat_template;
mod context;
mod engine;
mod error;
mod normalize;
mod render;

pub use capabilities::{probe, renders_needles, CapabilityFlags, SYSTEM_NEEDLE};
pub use chat_template::ChatTemplate;
pub use context::RenderContext;
pub use engine::{JinjaEngine, ParseOptions, TemplateEngine};
pub use error::{Result, TemplateError};
pub use normalize::normalize;
pub use render::Renderer;

// Re-export common types
pub use promptfit_common_message::{JsonValue, Message, ToolCall, ToolSpec};
