//! # aim-cli
//!
//! The `aim` command-line tool:
//! - validate and render `CITATION.cff` files
//! - inspect model input fields and derive missing parameters
//! - manage the `aim` configuration file

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;

pub use cli::Cli;
pub use config::AimConfig;
