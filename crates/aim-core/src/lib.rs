//! Shared errors, configuration trait, and path utilities for the aim crates.
//!
//! This crate has no internal aim dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`traits`]: [`ConfigManager`] for TOML configuration files
//! - [`util`]: Path utilities

#![doc = include_str!("../README.md")]

pub mod error;
pub mod traits;
pub mod util;

pub use error::{Error, Result};
pub use traits::ConfigManager;
pub use util::paths::{expand_tilde, find_file_upwards};
