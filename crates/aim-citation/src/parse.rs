//! Loading CFF documents.
//!
//! Parsing is split in two steps: the YAML is first read into a generic
//! [`serde_yaml::Value`] (which is what [`crate::validate`] inspects), and
//! only then deserialized into a typed [`Citation`]. A document with schema
//! problems can therefore still be parsed and reported on.
//!
//! ```rust
//! use aim_citation::parse_str;
//!
//! let doc = parse_str("cff-version: 1.2.0\ntitle: ai-models\n").unwrap();
//! assert_eq!(doc.get_str("title"), Some("ai-models"));
//! ```

use std::path::{Path, PathBuf};

use aim_core::{Error, Result};
use serde_yaml::Value;

use crate::model::Citation;
use crate::validate::{ValidationPolicy, ValidationReport, validate};

/// Conventional file name of a citation document.
pub const CITATION_FILE_NAME: &str = "CITATION.cff";

/// A parsed but not yet validated CFF document.
#[derive(Debug, Clone)]
pub struct CitationDocument {
    value: Value,
    source: Option<PathBuf>,
}

impl CitationDocument {
    /// Raw YAML value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Path the document was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Get a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.value.get(key)?.as_str()
    }

    /// Check the document against the CFF schema rules.
    pub fn validate(&self, policy: &ValidationPolicy) -> ValidationReport {
        validate(&self.value, policy)
    }

    /// Deserialize into the typed model.
    ///
    /// This does not enforce the schema; call [`validate`](Self::validate)
    /// first when the document is untrusted.
    pub fn deserialize(&self) -> Result<Citation> {
        serde_yaml::from_value(self.value.clone())
            .map_err(|e| Error::parse(format!("Failed to deserialize citation: {e}")))
    }
}

/// Parse CFF text.
///
/// Fails on YAML syntax errors and when the root is not a mapping.
pub fn parse_str(content: &str) -> Result<CitationDocument> {
    let value: Value = serde_yaml::from_str(content)
        .map_err(|e| Error::parse(format!("Invalid CFF YAML: {e}")))?;

    if !value.is_mapping() {
        return Err(Error::parse(
            "CFF document root must be a mapping of keys to values",
        ));
    }

    Ok(CitationDocument {
        value,
        source: None,
    })
}

/// Read and parse a CFF file.
pub fn load(path: impl AsRef<Path>) -> Result<CitationDocument> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    log::debug!("Loaded citation file {} ({} bytes)", path.display(), content.len());

    let mut doc = parse_str(&content)
        .map_err(|e| Error::parse(format!("{}: {e}", path.display())))?;
    doc.source = Some(path.to_path_buf());
    Ok(doc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
cff-version: 1.2.0
message: If you use this software, please cite it as below.
title: ai-models
authors:
  - family-names: Raoult
    given-names: Baudouin
type: software
license: Apache-2.0
";

    #[test]
    fn test_parse_minimal() {
        let doc = parse_str(MINIMAL).unwrap();
        assert_eq!(doc.get_str("cff-version"), Some("1.2.0"));
        assert!(doc.source().is_none());

        let citation = doc.deserialize().unwrap();
        assert_eq!(citation.title, "ai-models");
        assert_eq!(citation.authors.len(), 1);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse_str("title: [unclosed").unwrap_err();
        assert!(err.to_string().contains("Invalid CFF YAML"));
    }

    #[test]
    fn test_parse_non_mapping_root() {
        let err = parse_str("- just\n- a list\n").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_deserialize_missing_title_fails() {
        let doc = parse_str("cff-version: 1.2.0\nmessage: hi\nauthors: []\n").unwrap();
        assert!(doc.deserialize().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CITATION_FILE_NAME);
        std::fs::write(&path, MINIMAL).unwrap();

        let doc = load(&path).unwrap();
        assert_eq!(doc.source(), Some(path.as_path()));
        assert!(doc.validate(&ValidationPolicy::default()).is_valid());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/CITATION.cff").unwrap_err();
        assert!(err.is_io());
    }
}
