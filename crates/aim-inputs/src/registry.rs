//! Named input sources.
//!
//! Inputs are looked up by name (`--input file`). The registry maps names
//! to factory functions; [`InputRegistry::with_builtins`] knows about the
//! inputs shipped with this crate and applications can register more.

use std::collections::BTreeMap;
use std::path::PathBuf;

use aim_core::{Error, Result};

use crate::input::{FileInput, Input};

/// Arguments passed to input factories.
#[derive(Debug, Clone)]
pub struct InputArgs {
    /// Field file for file-based inputs.
    pub file: Option<PathBuf>,
    /// Compute `tcwv` and `r` when missing.
    pub derive_missing: bool,
}

impl Default for InputArgs {
    fn default() -> Self {
        Self {
            file: None,
            derive_missing: true,
        }
    }
}

impl InputArgs {
    /// Set the field file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Builds an input from its arguments.
pub type InputFactory = fn(&InputArgs) -> Result<Box<dyn Input>>;

/// Name → factory table.
#[derive(Debug, Clone, Default)]
pub struct InputRegistry {
    factories: BTreeMap<String, InputFactory>,
}

impl InputRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in inputs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("file", file_input);
        registry
    }

    /// Register (or replace) an input under `name`.
    pub fn register(&mut self, name: &str, factory: InputFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            log::debug!("Replaced input factory '{name}'");
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the input called `name`.
    pub fn get(&self, name: &str, args: &InputArgs) -> Result<Box<dyn Input>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::not_found("input", name))?;
        factory(args)
    }
}

fn file_input(args: &InputArgs) -> Result<Box<dyn Input>> {
    let file = args
        .file
        .as_ref()
        .ok_or_else(|| Error::config("The 'file' input requires a field file (--file)"))?;
    Ok(Box::new(
        FileInput::new(file).with_derive_missing(args.derive_missing),
    ))
}

/// Names of the built-in inputs.
pub fn available_inputs() -> Vec<String> {
    InputRegistry::with_builtins().names()
}

/// Build a built-in input by name.
pub fn get_input(name: &str, args: &InputArgs) -> Result<Box<dyn Input>> {
    InputRegistry::with_builtins().get(name, args)
}
