//! Configuration types for Promptfit.
//!
//! This crate provides the configuration read from `.promptfit/config.yaml`
//! files: which chat template to load and the tokens to render it with.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
