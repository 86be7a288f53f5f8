//! Generic path utilities.

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
///
/// # Examples
///
/// ```
/// use aim_core::util::paths::expand_tilde;
///
/// let plain = expand_tilde("/data/fields.json");
/// assert_eq!(plain, std::path::PathBuf::from("/data/fields.json"));
/// ```
pub fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Walk up from `start` looking for a file called `name`.
///
/// Returns the first match, starting with `start` itself.
pub fn find_file_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Lower-cased file extension, if any.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_expand_tilde_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/config.toml"), home.join("config.toml"));
        }
    }

    #[test]
    fn test_find_file_upwards() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("CITATION.cff"), "cff-version: 1.2.0\n").unwrap();

        let found = find_file_upwards(&nested, "CITATION.cff").unwrap();
        assert_eq!(found, dir.path().join("CITATION.cff"));
    }

    #[test]
    fn test_find_file_upwards_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(find_file_upwards(dir.path(), "does-not-exist.cff").is_none());
    }

    #[test]
    fn test_extension_lowercase() {
        assert_eq!(
            extension_lowercase(Path::new("fields.JSONL")),
            Some("jsonl".to_string())
        );
        assert_eq!(extension_lowercase(Path::new("README")), None);
    }
}
