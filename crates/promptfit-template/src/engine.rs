//! Template engine seam and its minijinja implementation.

use minijinja::{AutoEscape, Environment, Error as JinjaError, ErrorKind, Value};

use crate::context::RenderContext;
use crate::error::{Result, TemplateError};

const TEMPLATE_NAME: &str = "chat_template";

/// Renders a compiled template against a context.
///
/// Implementations must be deterministic: the same context always yields
/// the same output.
pub trait TemplateEngine: Send + Sync {
    /// Render the template.
    fn render(&self, context: &RenderContext) -> Result<String>;
}

/// Whitespace handling applied when compiling a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Remove the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip whitespace from the start of a line up to a block tag.
    pub lstrip_blocks: bool,
    /// Keep a single trailing newline at the end of the source.
    pub keep_trailing_newline: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trim_blocks: true,
            lstrip_blocks: true,
            keep_trailing_newline: false,
        }
    }
}

/// A Jinja chat template compiled with minijinja.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    /// Compile template source.
    pub fn parse(source: &str, options: ParseOptions) -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(options.trim_blocks);
        env.set_lstrip_blocks(options.lstrip_blocks);
        env.set_keep_trailing_newline(options.keep_trailing_newline);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        // Chat templates are written against Python Jinja (`.strip()`, `.items()`, ...).
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.add_function("raise_exception", raise_exception);

        env.add_template_owned(TEMPLATE_NAME, source.to_owned())
            .map_err(TemplateError::Syntax)?;

        Ok(Self { env })
    }
}

impl TemplateEngine for JinjaEngine {
    fn render(&self, context: &RenderContext) -> Result<String> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(TemplateError::Render)?;
        template.render(context).map_err(TemplateError::Render)
    }
}

impl std::fmt::Debug for JinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaEngine").finish_non_exhaustive()
    }
}

fn raise_exception(message: String) -> std::result::Result<Value, JinjaError> {
    Err(JinjaError::new(ErrorKind::InvalidOperation, message))
}
