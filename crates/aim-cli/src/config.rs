//! `aim` configuration file.
//!
//! ```toml
//! [citation]
//! path = "CITATION.cff"
//! require_type = true
//! require_license = true
//!
//! [inputs]
//! default_input = "file"
//! derive_missing = true
//! default_output = "file"
//!
//! [logging]
//! filter = "info,aim=debug"
//! ```

use aim_citation::ValidationPolicy;
use aim_core::ConfigManager;
use serde::{Deserialize, Serialize};

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,aim=debug";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    pub citation: CitationConfig,
    pub inputs: InputsConfig,
    pub logging: LoggingConfig,
}

impl ConfigManager for AimConfig {
    fn project_name() -> &'static str {
        "aim"
    }
}

/// `[citation]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Citation file used when a command is given none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub require_type: bool,
    pub require_license: bool,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            path: None,
            require_type: true,
            require_license: true,
        }
    }
}

impl CitationConfig {
    /// Validation policy described by this section.
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            require_type: self.require_type,
            require_license: self.require_license,
            ..ValidationPolicy::default()
        }
    }
}

/// `[inputs]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub default_input: String,
    pub derive_missing: bool,
    pub default_output: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            default_input: "file".to_string(),
            derive_missing: true,
            default_output: "file".to_string(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Pick the log filter: `-v` flags, then the config, then the default.
pub fn log_filter(verbose: u8, config: &LoggingConfig) -> String {
    match verbose {
        0 => config
            .filter
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
