//! Handlers for `aim config` subcommands.
//!
//! The `cmd_config_*` functions are generic over [`ConfigManager`]; the
//! dotted-key helpers operate on plain `toml::Value` trees.

use std::path::PathBuf;

use aim_core::{ConfigManager, Error, Result};

use crate::cli::ConfigAction;
use crate::config::AimConfig;

// ============================================================================
// Command dispatch
// ============================================================================

/// Run a config subcommand against [`AimConfig`].
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path::<AimConfig>(config_path),
        ConfigAction::Get { key } => cmd_config_get::<AimConfig>(config_path, &key),
        ConfigAction::Set { key, value } => cmd_config_set::<AimConfig>(config_path, &key, &value),
        ConfigAction::Init { file, force } => {
            let file = file.as_deref().or(config_path);
            cmd_config_init::<AimConfig>(file, force)
        }
    }
}

// ============================================================================
// Generic command handlers
// ============================================================================

/// Show the resolved config file path.
pub fn cmd_config_path<C: ConfigManager>(config_path: Option<&str>) -> Result<()> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!(
            "(file does not exist, run `{} config init` to create it)",
            C::project_name()
        );
    }
    Ok(())
}

/// Print the value at a dotted key of the effective configuration.
pub fn cmd_config_get<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<()> {
    let value = config_value::<C>(config_path, key)?;
    println!("{}", format_toml_value(&value));
    Ok(())
}

/// Look up a dotted key in the effective configuration (file merged over defaults).
pub fn config_value<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<toml::Value> {
    let config = C::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .cloned()
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a dotted key in the config file.
///
/// The edited document must still deserialize as `C`, so a typo'd value
/// type is rejected before anything is written.
pub fn cmd_config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
) -> Result<()> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            C::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;
    doc.clone()
        .try_into::<C>()
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

/// Write a default configuration file.
pub fn cmd_config_init<C: ConfigManager>(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => aim_core::expand_tilde(p),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = C::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Config file created at {}", path.display());
    Ok(())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    if key.is_empty() {
        return Err(Error::config("Empty key path"));
    }

    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts.pop().unwrap_or(key);

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string into a TOML value: bool, then integer, then float, then string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_default(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, AimConfig::default().to_toml_string().unwrap()).unwrap();
        path
    }

    // ------------------------------------------------------------------------
    // cmd_config_path / get
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        assert!(cmd_config_path::<AimConfig>(Some("/explicit/config.toml")).is_ok());
    }

    #[test]
    fn test_config_value_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        let value = config_value::<AimConfig>(path.to_str(), "inputs.default_output").unwrap();
        assert_eq!(value, toml::Value::String("file".into()));
        assert!(cmd_config_get::<AimConfig>(path.to_str(), "citation.require_type").is_ok());
    }

    #[test]
    fn test_config_value_defaults_without_file() {
        let value =
            config_value::<AimConfig>(Some("/nonexistent/aim.toml"), "inputs.derive_missing")
                .unwrap();
        assert_eq!(value, toml::Value::Boolean(true));
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        let err = cmd_config_get::<AimConfig>(path.to_str(), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_set
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_set_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        cmd_config_set::<AimConfig>(path.to_str(), "citation.require_license", "false").unwrap();

        let config = AimConfig::load(path.to_str()).unwrap();
        assert!(!config.citation.require_license);
    }

    #[test]
    fn test_cmd_config_set_creates_optional_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        cmd_config_set::<AimConfig>(path.to_str(), "logging.filter", "warn").unwrap();
        let config = AimConfig::load(path.to_str()).unwrap();
        assert_eq!(config.logging.filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_cmd_config_set_rejects_wrong_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let err =
            cmd_config_set::<AimConfig>(path.to_str(), "inputs.derive_missing", "sometimes")
                .unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cmd_config_set_missing_file() {
        let err = cmd_config_set::<AimConfig>(Some("/nonexistent/config.toml"), "key", "value")
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_init
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("aim").join("config.toml");

        cmd_config_init::<AimConfig>(path.to_str(), false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[citation]"));
        assert!(content.contains("default_input"));
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = cmd_config_init::<AimConfig>(path.to_str(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        cmd_config_init::<AimConfig>(path.to_str(), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[inputs]"));
    }

    // ------------------------------------------------------------------------
    // Dotted-key helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("[inputs]\ndefault_input = \"file\"").unwrap();
        assert_eq!(
            get_nested_value(&val, "inputs.default_input"),
            Some(&toml::Value::String("file".into()))
        );
        assert!(get_nested_value(&val, "inputs.missing").is_none());
        assert!(get_nested_value(&val, "inputs.default_input.deeper").is_none());
    }

    #[test]
    fn test_set_nested_value_creates_section() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut val, "logging.filter", toml::Value::String("warn".into())).unwrap();
        assert_eq!(
            get_nested_value(&val, "logging.filter"),
            Some(&toml::Value::String("warn".into()))
        );
    }

    #[test]
    fn test_set_nested_value_through_scalar_fails() {
        let mut val: toml::Value = toml::from_str("inputs = 3").unwrap();
        assert!(set_nested_value(&mut val, "inputs.default_input", toml::Value::Integer(1)).is_err());
        assert!(set_nested_value(&mut val, "", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("-7"), toml::Value::Integer(-7));
        assert_eq!(parse_value("2.5"), toml::Value::Float(2.5));
        assert_eq!(parse_value("none"), toml::Value::String("none".into()));
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::String("file".into())), "file");
        assert_eq!(format_toml_value(&toml::Value::Boolean(false)), "false");
    }
}
