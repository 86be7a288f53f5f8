//! Configuration management trait.
//!
//! [`ConfigManager`] is implemented by each application's config struct and
//! drives file resolution, loading, and serialization. The `aim config`
//! subcommands are written against this trait.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::util::paths::expand_tilde;
use crate::{Error, Result};

/// Loads and saves a TOML configuration file.
pub trait ConfigManager: Default + Serialize + DeserializeOwned {
    /// Project name, used for the config directory and env variable prefix.
    fn project_name() -> &'static str;

    /// Environment variable that can point at a config file.
    ///
    /// `"aim"` → `AIM_CONFIG`.
    fn config_env_var() -> String {
        format!(
            "{}_CONFIG",
            Self::project_name().to_uppercase().replace(['-', ' '], "_")
        )
    }

    /// Platform default location: `<config dir>/<project>/config.toml`.
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::project_name()).join("config.toml"))
    }

    /// Resolve the config file path.
    ///
    /// Checks in order:
    /// 1. explicit path (e.g. `--config`)
    /// 2. the [`config_env_var`](Self::config_env_var) environment variable
    /// 3. [`default_config_path`](Self::default_config_path)
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(expand_tilde(path));
        }
        if let Ok(path) = std::env::var(Self::config_env_var()) {
            if !path.trim().is_empty() {
                return Some(expand_tilde(&path));
            }
        }
        Self::default_config_path()
    }

    /// Load the configuration, falling back to defaults when no file exists.
    fn load(explicit: Option<&str>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit) else {
            log::debug!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Serialize the configuration as pretty TOML.
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
