//! CFF 1.2.0 schema validation.
//!
//! Validation runs on the raw YAML value rather than on the typed model so
//! that every problem in a document is reported at once, with a dotted path
//! pointing at the offending key (`authors[1].orcid`).
//!
//! ```rust
//! use aim_citation::{parse_str, ValidationPolicy};
//!
//! let doc = parse_str("cff-version: 1.2.0\ntitle: ai-models\n").unwrap();
//! let report = doc.validate(&ValidationPolicy::default());
//! assert!(!report.is_valid());
//! assert!(report.errors().any(|issue| issue.path == "authors"));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use aim_core::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::model::{CitationType, IdentifierType};
use crate::spdx;

/// The only CFF version this validator understands.
pub const SUPPORTED_CFF_VERSION: &str = "1.2.0";

const TOP_LEVEL_KEYS: &[&str] = &[
    "abstract",
    "authors",
    "cff-version",
    "commit",
    "contact",
    "date-released",
    "doi",
    "identifiers",
    "keywords",
    "license",
    "license-url",
    "message",
    "preferred-citation",
    "references",
    "repository",
    "repository-artifact",
    "repository-code",
    "title",
    "type",
    "url",
    "version",
];

const PERSON_KEYS: &[&str] = &[
    "address",
    "affiliation",
    "alias",
    "city",
    "country",
    "email",
    "family-names",
    "fax",
    "given-names",
    "name-particle",
    "name-suffix",
    "orcid",
    "post-code",
    "region",
    "tel",
    "website",
];

const ENTITY_KEYS: &[&str] = &[
    "address",
    "alias",
    "city",
    "country",
    "date-end",
    "date-start",
    "email",
    "fax",
    "location",
    "name",
    "orcid",
    "post-code",
    "region",
    "tel",
    "website",
];

const REFERENCE_TYPES: &[&str] = &[
    "art",
    "article",
    "audiovisual",
    "bill",
    "blog",
    "book",
    "catalogue",
    "conference",
    "conference-paper",
    "data",
    "database",
    "dictionary",
    "edited-work",
    "encyclopedia",
    "film-broadcast",
    "generic",
    "government-document",
    "grant",
    "hearing",
    "historical-work",
    "legal-case",
    "legal-rule",
    "magazine-article",
    "manual",
    "map",
    "multimedia",
    "music",
    "newspaper-article",
    "pamphlet",
    "patent",
    "personal-communication",
    "proceedings",
    "report",
    "serial",
    "slides",
    "software",
    "software-code",
    "software-container",
    "software-executable",
    "software-virtual-machine",
    "sound-recording",
    "standard",
    "statute",
    "thesis",
    "unpublished",
    "video",
    "website",
];

const URL_KEYS: &[&str] = &[
    "repository-code",
    "repository",
    "repository-artifact",
    "url",
    "license-url",
];

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("Invalid semver regex"));

static ORCID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://orcid\.org/[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{3}[0-9X]$")
        .expect("Invalid ORCID regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S{2,}$").expect("Invalid email regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https|http|ftp|sftp)://.+").expect("Invalid URL regex"));

static DOI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^10\.\d{4,9}(\.\d+)?/[A-Za-z0-9:/_;\-.()\[\]\\]+$").expect("Invalid DOI regex")
});

static SWH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^swh:1:(snp|rel|rev|dir|cnt):[0-9a-fA-F]{40}$").expect("Invalid SWHID regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Invalid date regex"));

// ============================================================================
// Policy and report
// ============================================================================

/// Which optional-in-CFF fields a repository insists on.
///
/// CFF itself only requires `cff-version`, `message`, `title` and `authors`;
/// `type` defaults to `software` and `license` is optional. Repositories that
/// publish a citation file are expected to state both, so both are required
/// by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Require an explicit `type`.
    pub require_type: bool,
    /// Require a `license`.
    pub require_license: bool,
    /// Treat keys that are not part of the schema as errors.
    pub reject_unknown_keys: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            require_type: true,
            require_license: true,
            reject_unknown_keys: true,
        }
    }
}

impl ValidationPolicy {
    /// Only what the CFF schema itself requires.
    pub fn schema_only() -> Self {
        Self {
            require_type: false,
            require_license: false,
            reject_unknown_keys: true,
        }
    }
}

/// How serious an [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending key; empty for the document root.
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        write!(f, "{}: {path}: {}", self.severity, self.message)
    }
}

/// Every issue found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when no error-level issue was found. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Does any issue point at `path` (exactly)?
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }

    /// Convert into a `Result`, summarising the errors.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let summary = self
            .errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::validation_field(
            "CITATION.cff",
            format!("{} error(s): {summary}", self.error_count()),
        ))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Validate a CFF document held as a YAML value.
pub fn validate(value: &Value, policy: &ValidationPolicy) -> ValidationReport {
    let mut validator = Validator {
        policy,
        issues: Vec::new(),
    };
    validator.check_document(value);
    ValidationReport {
        issues: validator.issues,
    }
}

struct Validator<'p> {
    policy: &'p ValidationPolicy,
    issues: Vec<Issue>,
}

impl Validator<'_> {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            path: path.into(),
            severity: Severity::Error,
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            path: path.into(),
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    fn check_document(&mut self, doc: &Value) {
        if !doc.is_mapping() {
            self.error("", format!("expected a mapping, found {}", kind_name(doc)));
            return;
        }

        self.check_keys("", doc, TOP_LEVEL_KEYS);

        self.check_cff_version(doc.get("cff-version"));
        self.check_required_string("message", doc.get("message"));
        self.check_required_string("title", doc.get("title"));
        self.check_authors("authors", doc.get("authors"), true);
        self.check_type(doc.get("type"));
        self.check_license(doc.get("license"));

        if let Some(text) = doc.get("abstract") {
            self.check_string("abstract", text);
        }
        if let Some(keywords) = doc.get("keywords") {
            self.check_keywords(keywords);
        }
        for key in URL_KEYS {
            if let Some(url) = doc.get(*key) {
                self.check_url(key, url);
            }
        }
        if let Some(date) = doc.get("date-released") {
            self.check_date("date-released", date);
        }
        if let Some(doi) = doc.get("doi") {
            self.check_doi("doi", doi);
        }
        if let Some(identifiers) = doc.get("identifiers") {
            self.check_identifiers(identifiers);
        }
        if let Some(version) = doc.get("version") {
            self.check_version("version", version);
        }
        if let Some(commit) = doc.get("commit") {
            self.check_string("commit", commit);
        }
        if doc.get("contact").is_some() {
            self.check_authors("contact", doc.get("contact"), false);
        }
        if let Some(preferred) = doc.get("preferred-citation") {
            self.check_reference("preferred-citation", preferred);
        }
        if let Some(references) = doc.get("references") {
            match references.as_sequence() {
                Some(refs) => {
                    for (i, reference) in refs.iter().enumerate() {
                        self.check_reference(&format!("references[{i}]"), reference);
                    }
                }
                None => self.error(
                    "references",
                    format!("expected a list, found {}", kind_name(references)),
                ),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Generic checks
    // ------------------------------------------------------------------------

    fn check_keys(&mut self, path: &str, map: &Value, allowed: &[&str]) {
        if !self.policy.reject_unknown_keys {
            return;
        }
        let Some(mapping) = map.as_mapping() else {
            return;
        };
        for (key, _) in mapping {
            let Some(key) = key.as_str() else {
                self.error(path, "keys must be strings");
                continue;
            };
            if allowed.contains(&key) {
                continue;
            }
            let message = match suggest(key, allowed) {
                Some(candidate) => format!("unknown key '{key}' (did you mean '{candidate}'?)"),
                None => format!("unknown key '{key}'"),
            };
            self.error(join_path(path, key), message);
        }
    }

    fn check_required_string(&mut self, path: &str, value: Option<&Value>) {
        match value {
            Some(value) => {
                self.check_string(path, value);
            }
            None => self.error(path, "is required"),
        }
    }

    /// Non-empty string. Returns the string when it is one.
    fn check_string<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v str> {
        match value.as_str() {
            Some(s) if s.trim().is_empty() => {
                self.error(path, "must not be empty");
                None
            }
            Some(s) => Some(s),
            None => {
                self.error(
                    path,
                    format!("expected a string, found {}", kind_name(value)),
                );
                None
            }
        }
    }

    fn check_pattern(&mut self, path: &str, value: &Value, re: &Regex, what: &str) {
        if let Some(s) = self.check_string(path, value) {
            if !re.is_match(s) {
                self.error(path, format!("'{s}' is not a valid {what}"));
            }
        }
    }

    fn check_url(&mut self, path: &str, value: &Value) {
        self.check_pattern(path, value, &URL_RE, "URL (http, https, ftp or sftp)");
    }

    fn check_doi(&mut self, path: &str, value: &Value) {
        self.check_pattern(path, value, &DOI_RE, "DOI");
    }

    fn check_date(&mut self, path: &str, value: &Value) {
        let Some(s) = self.check_string(path, value) else {
            return;
        };
        if !DATE_RE.is_match(s) || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
            self.error(path, format!("'{s}' is not a calendar date (YYYY-MM-DD)"));
        }
    }

    fn check_version(&mut self, path: &str, value: &Value) {
        if value.is_number() {
            return;
        }
        self.check_string(path, value);
    }

    // ------------------------------------------------------------------------
    // Top-level fields
    // ------------------------------------------------------------------------

    fn check_cff_version(&mut self, value: Option<&Value>) {
        let Some(value) = value else {
            self.error("cff-version", "is required");
            return;
        };
        if value.is_number() {
            self.error(
                "cff-version",
                format!("must be a quoted string such as \"{SUPPORTED_CFF_VERSION}\""),
            );
            return;
        }
        let Some(version) = self.check_string("cff-version", value) else {
            return;
        };
        if !SEMVER_RE.is_match(version) {
            self.error(
                "cff-version",
                format!("'{version}' is not a semantic version"),
            );
        } else if version != SUPPORTED_CFF_VERSION {
            self.error(
                "cff-version",
                format!("unsupported CFF version {version}, expected {SUPPORTED_CFF_VERSION}"),
            );
        }
    }

    fn check_type(&mut self, value: Option<&Value>) {
        let Some(value) = value else {
            if self.policy.require_type {
                self.error("type", "is required (software or dataset)");
            }
            return;
        };
        if let Some(kind) = self.check_string("type", value) {
            if !CitationType::ALL.contains(&kind) {
                self.error(
                    "type",
                    format!("'{kind}' is not one of {}", CitationType::ALL.join(", ")),
                );
            }
        }
    }

    fn check_license(&mut self, value: Option<&Value>) {
        let Some(value) = value else {
            if self.policy.require_license {
                self.error("license", "is required (an SPDX license identifier)");
            }
            return;
        };

        if let Some(ids) = value.as_sequence() {
            if ids.is_empty() {
                self.error("license", "must list at least one license");
            }
            for (i, id) in ids.iter().enumerate() {
                self.check_license_id(&format!("license[{i}]"), id);
            }
        } else {
            self.check_license_id("license", value);
        }
    }

    fn check_license_id(&mut self, path: &str, value: &Value) {
        let Some(id) = self.check_string(path, value) else {
            return;
        };
        if !spdx::is_well_formed(id) {
            self.error(path, format!("'{id}' is not an SPDX license identifier"));
        } else if !spdx::is_known(id) {
            match spdx::case_insensitive_match(id) {
                Some(known) => self.warn(path, format!("'{id}' should be spelled '{known}'")),
                None => self.warn(path, format!("'{id}' is not a commonly used SPDX identifier")),
            }
        }
    }

    fn check_keywords(&mut self, value: &Value) {
        let Some(keywords) = value.as_sequence() else {
            self.error(
                "keywords",
                format!("expected a list, found {}", kind_name(value)),
            );
            return;
        };
        if keywords.is_empty() {
            self.error("keywords", "must contain at least one keyword");
        }

        let mut seen = HashSet::new();
        for (i, keyword) in keywords.iter().enumerate() {
            let path = format!("keywords[{i}]");
            if let Some(word) = self.check_string(&path, keyword) {
                if !seen.insert(word.to_lowercase()) {
                    self.warn(path, format!("duplicate keyword '{word}'"));
                }
            }
        }
    }

    fn check_identifiers(&mut self, value: &Value) {
        let Some(identifiers) = value.as_sequence() else {
            self.error(
                "identifiers",
                format!("expected a list, found {}", kind_name(value)),
            );
            return;
        };

        for (i, identifier) in identifiers.iter().enumerate() {
            let path = format!("identifiers[{i}]");
            if !identifier.is_mapping() {
                self.error(&path, format!("expected a mapping, found {}", kind_name(identifier)));
                continue;
            }
            self.check_keys(&path, identifier, &["type", "value", "description"]);

            let value_path = join_path(&path, "value");
            let Some(id_value) = identifier.get("value") else {
                self.error(value_path, "is required");
                continue;
            };

            let type_path = join_path(&path, "type");
            let Some(kind) = identifier.get("type") else {
                self.error(type_path, "is required");
                continue;
            };
            let Some(kind) = self.check_string(&type_path, kind) else {
                continue;
            };
            match kind {
                "doi" => self.check_doi(&value_path, id_value),
                "url" => self.check_url(&value_path, id_value),
                "swh" => self.check_pattern(
                    &value_path,
                    id_value,
                    &SWH_RE,
                    "Software Heritage identifier",
                ),
                "other" => {
                    self.check_string(&value_path, id_value);
                }
                other => self.error(
                    type_path,
                    format!("'{other}' is not one of {}", IdentifierType::ALL.join(", ")),
                ),
            }

            if let Some(description) = identifier.get("description") {
                self.check_string(&join_path(&path, "description"), description);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Authors and references
    // ------------------------------------------------------------------------

    fn check_authors(&mut self, path: &str, value: Option<&Value>, required: bool) {
        let Some(value) = value else {
            if required {
                self.error(path, "is required");
            }
            return;
        };
        let Some(authors) = value.as_sequence() else {
            self.error(
                path,
                format!("expected a list of authors, found {}", kind_name(value)),
            );
            return;
        };
        if authors.is_empty() {
            self.error(path, "must list at least one author");
        }
        for (i, author) in authors.iter().enumerate() {
            self.check_author(&format!("{path}[{i}]"), author);
        }
    }

    fn check_author(&mut self, path: &str, author: &Value) {
        let Some(mapping) = author.as_mapping() else {
            self.error(path, format!("expected a mapping, found {}", kind_name(author)));
            return;
        };
        if mapping.is_empty() {
            self.error(path, "must have at least one property");
            return;
        }

        let is_entity = author.get("name").is_some();
        let allowed = if is_entity { ENTITY_KEYS } else { PERSON_KEYS };
        self.check_keys(path, author, allowed);

        if is_entity {
            if let Some(name) = author.get("name") {
                self.check_string(&join_path(path, "name"), name);
            }
        } else if ["family-names", "given-names", "alias"]
            .iter()
            .all(|key| author.get(*key).is_none())
        {
            self.warn(path, "person has no family-names, given-names or alias");
        }

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            if !allowed.contains(&key) {
                continue;
            }
            let field = join_path(path, key);
            match key {
                "orcid" => self.check_pattern(&field, value, &ORCID_RE, "ORCID URL"),
                "email" => self.check_pattern(&field, value, &EMAIL_RE, "email address"),
                "website" => self.check_url(&field, value),
                "date-start" | "date-end" => self.check_date(&field, value),
                "name" => {}
                _ => {
                    self.check_string(&field, value);
                }
            }
        }
    }

    fn check_reference(&mut self, path: &str, reference: &Value) {
        if !reference.is_mapping() {
            self.error(path, format!("expected a mapping, found {}", kind_name(reference)));
            return;
        }

        let type_path = join_path(path, "type");
        match reference.get("type") {
            Some(kind) => {
                if let Some(kind) = self.check_string(&type_path, kind) {
                    if !REFERENCE_TYPES.contains(&kind) {
                        let message = match suggest(kind, REFERENCE_TYPES) {
                            Some(candidate) => format!(
                                "'{kind}' is not a reference type (did you mean '{candidate}'?)"
                            ),
                            None => format!("'{kind}' is not a reference type"),
                        };
                        self.error(type_path, message);
                    }
                }
            }
            None => self.error(type_path, "is required"),
        }

        self.check_required_string(&join_path(path, "title"), reference.get("title"));
        self.check_authors(&join_path(path, "authors"), reference.get("authors"), true);

        if let Some(doi) = reference.get("doi") {
            self.check_doi(&join_path(path, "doi"), doi);
        }
        if let Some(url) = reference.get("url") {
            self.check_url(&join_path(path, "url"), url);
        }
        if let Some(year) = reference.get("year") {
            if year.as_i64().is_none() {
                self.error(
                    join_path(path, "year"),
                    format!("expected an integer, found {}", kind_name(year)),
                );
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        _ => "a tagged value",
    }
}

/// Closest allowed key within a small edit distance.
fn suggest<'a>(key: &str, allowed: &[&'a str]) -> Option<&'a str> {
    allowed
        .iter()
        .map(|candidate| (strsim::levenshtein(key, candidate), *candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

// ============================================================================
// Tests
// ============================================================================
