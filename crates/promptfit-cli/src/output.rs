//! Command output in the selected format.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Types that can be printed as text or JSON.
pub trait Displayable: Serialize + std::fmt::Display {
    /// Format as human-readable text (default: use Display impl)
    fn format_text(&self) -> String {
        self.to_string()
    }

    /// Format as JSON
    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<T> Displayable for T where T: Serialize + std::fmt::Display {}

/// Render `value` in `format`.
pub fn format(value: &impl Displayable, format: OutputFormat) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json()?,
    })
}

/// Write `value` to stdout in `format`, followed by a newline.
pub fn emit(value: &impl Displayable, format: OutputFormat) -> Result<(), CliError> {
    let text = self::format(value, format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}
