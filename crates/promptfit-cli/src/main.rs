//! Promptfit CLI
//!
//! Main entry point for the `promptfit` binary.

use std::process::ExitCode;

use clap::Parser;
use promptfit_cli::cli::Cli;
use promptfit_cli::{CliError, Exit};
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = promptfit_common_log::init(cli.log_config()) {
        eprintln!("warning: {e}");
    }

    match run(cli) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            e.exit_code().into()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config)
}
