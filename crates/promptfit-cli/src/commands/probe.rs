//! Probe command implementation.

use clap::Parser;
use promptfit_common_log::spans::{record_error, template_span};
use promptfit_template::CapabilityFlags;

use crate::cli::CommandContext;
use crate::commands::TemplateArgs;
use crate::error::CliError;
use crate::output;

/// Report which features a chat template supports
#[derive(Debug, Parser)]
pub struct ProbeCommand {
    #[command(flatten)]
    pub template: TemplateArgs,
}

impl ProbeCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let span = template_span("probe", &self.template.label(ctx));
        let _guard = span.enter();

        self.run(ctx).map_err(|e| {
            record_error(&e);
            e
        })
    }

    fn run(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let template = self.template.load(ctx)?;
        output::emit(&Report(template.capabilities()), ctx.format)
    }
}

#[derive(serde::Serialize)]
#[serde(transparent)]
struct Report(CapabilityFlags);

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = &self.0;
        writeln!(f, "supports_tools: {}", flags.supports_tools)?;
        writeln!(f, "requires_object_arguments: {}", flags.requires_object_arguments)?;
        writeln!(f, "supports_parallel_tool_calls: {}", flags.supports_parallel_tool_calls)?;
        write!(f, "supports_system_role: {}", flags.supports_system_role)
    }
}
