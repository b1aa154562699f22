//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use promptfit_common_config::{ConfigLoader, PromptfitConfig};
use promptfit_common_log::{LogConfig, LogLevel};

use crate::commands::{ProbeCommand, RenderCommand};
use crate::error::CliError;

/// Promptfit - make any chat template render any conversation
///
/// Probes a Jinja chat template for the features it supports and rewrites
/// conversations so that system prompts and tool calls survive rendering.
#[derive(Debug, Parser)]
#[command(
    name = "promptfit",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress everything but errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "PROMPTFIT_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report which features a chat template supports
    Probe(ProbeCommand),

    /// Render a conversation through a chat template
    Render(RenderCommand),
}

/// Configuration together with the directory relative template paths resolve against.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: PromptfitConfig,
    pub base_dir: PathBuf,
}

impl Cli {
    /// Logging configuration from the environment, adjusted by `-v` and `-q`.
    pub fn log_config(&self) -> LogConfig {
        self.adjust_log_config(LogConfig::from_env())
    }

    fn adjust_log_config(&self, config: LogConfig) -> LogConfig {
        if self.quiet {
            config.with_level(LogLevel::Error)
        } else if self.verbose > 0 {
            let level = config.level.shifted(self.verbose.min(i8::MAX as u8) as i8);
            config.with_level(level)
        } else {
            config
        }
    }

    /// Load configuration from `--config` or the current project.
    pub fn load_config(&self) -> Result<LoadedConfig, CliError> {
        match &self.config {
            Some(path) => {
                let config = ConfigLoader::load_file(path)?;
                let base_dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok(LoadedConfig { config, base_dir })
            }
            None => {
                let loader = ConfigLoader::default();
                let config = loader.load()?;
                Ok(LoadedConfig {
                    config,
                    base_dir: loader.base_path().to_path_buf(),
                })
            }
        }
    }

    /// Execute the selected command
    pub fn execute(self, config: LoadedConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            config,
            format: self.format,
        };

        match self.command {
            Command::Probe(cmd) => cmd.execute(&ctx),
            Command::Render(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: LoadedConfig,
    pub format: OutputFormat,
}
