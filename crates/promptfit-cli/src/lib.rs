//! Promptfit CLI Library
//!
//! Core library components for the `promptfit` binary.

use std::process::ExitCode;

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;

/// Application exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    ValidationError = 5,
    RenderError = 6,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}
