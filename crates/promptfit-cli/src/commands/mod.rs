//! Command implementations.

mod probe;
mod render;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueHint};
use promptfit_template::ChatTemplate;

use crate::cli::CommandContext;
use crate::error::CliError;

pub use probe::ProbeCommand;
pub use render::RenderCommand;

/// Template selection shared by every command.
#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Chat template file; overrides `template` from the configuration
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub template: Option<PathBuf>,

    /// Begin-of-sequence token
    #[arg(long)]
    pub bos: Option<String>,

    /// End-of-sequence token
    #[arg(long)]
    pub eos: Option<String>,
}

impl TemplateArgs {
    /// Human-readable name of the selected template, for logs.
    pub fn label(&self, ctx: &CommandContext) -> String {
        match (&self.template, &ctx.config.config.template.path) {
            (Some(path), _) | (None, Some(path)) => path.display().to_string(),
            (None, None) => "inline".to_string(),
        }
    }

    /// Compile and probe the selected template.
    pub fn load(&self, ctx: &CommandContext) -> Result<ChatTemplate, CliError> {
        let configured = &ctx.config.config.template;

        let source = match &self.template {
            Some(path) => read_input(path)?,
            None if configured.is_configured() => {
                configured.resolve_source(&ctx.config.base_dir)?
            }
            None => {
                return Err(CliError::config_with_hint(
                    "no chat template given",
                    "pass --template or set template.path in .promptfit/config.yaml",
                ))
            }
        };

        let bos = self.bos.as_deref().unwrap_or(&configured.bos_token);
        let eos = self.eos.as_deref().unwrap_or(&configured.eos_token);

        let template = promptfit_common_log::timed!(
            "compile_template",
            ChatTemplate::with_options(source, bos, eos, configured.options)?
        );
        tracing::info!(capabilities = ?template.capabilities(), "chat template ready");
        Ok(template)
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    std::fs::read_to_string(path)
        .map_err(|e| CliError::io_with_path(format!("failed to read {}: {e}", path.display()), e, path))
}
