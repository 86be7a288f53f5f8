//! Subcommand implementations.

pub mod citation;
pub mod input;
