//! Typed view of a CFF 1.2.0 document.
//!
//! These types are deliberately lenient: anything that deserializes is
//! accepted here, and strictness lives in [`crate::validate`]. Keys use the
//! CFF kebab-case spelling (`cff-version`, `date-released`, ...).

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A complete citation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Citation {
    /// Schema version, `1.2.0` for documents this crate understands.
    pub cff_version: String,
    /// Instruction to users on how to cite the work.
    pub message: String,
    /// Name of the software or dataset.
    pub title: String,
    /// Authors, in citation order.
    pub authors: Vec<Author>,
    /// Kind of work being cited.
    #[serde(rename = "type", default)]
    pub kind: CitationType,
    /// SPDX license expression(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// Free-text description.
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_artifact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_released: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<Author>,
    /// Work that should be cited instead of the software itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_citation: Option<Box<Reference>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

impl Citation {
    /// The best DOI for this work: top-level `doi`, then the first DOI
    /// identifier.
    pub fn primary_doi(&self) -> Option<&str> {
        self.doi.as_deref().or_else(|| {
            self.identifiers
                .iter()
                .find(|id| id.kind == IdentifierType::Doi)
                .map(|id| id.value.as_str())
        })
    }

    /// The best URL for this work: `url`, then `repository-code`, then
    /// `repository`.
    pub fn primary_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.repository_code.as_deref())
            .or(self.repository.as_deref())
    }
}

/// `type` of the cited work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationType {
    #[default]
    Software,
    Dataset,
}

impl CitationType {
    /// Accepted spellings.
    pub const ALL: [&'static str; 2] = ["software", "dataset"];
}

impl fmt::Display for CitationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Software => write!(f, "software"),
            Self::Dataset => write!(f, "dataset"),
        }
    }
}

/// An author or contact: a person or an entity (organisation, team, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    /// Entities are recognised by their mandatory `name`.
    Entity(Entity),
    Person(Person),
}

impl Author {
    /// Name as it would appear in running text.
    pub fn display_name(&self) -> String {
        match self {
            Self::Entity(entity) => entity.name.clone(),
            Self::Person(person) => person.full_name(),
        }
    }

    /// ORCID, for either kind of author.
    pub fn orcid(&self) -> Option<&str> {
        match self {
            Self::Entity(entity) => entity.orcid.as_deref(),
            Self::Person(person) => person.orcid.as_deref(),
        }
    }
}

/// A person author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,
    /// Nobiliary particle, e.g. "van" in "van Rossum".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_particle: Option<String>,
    /// Suffix, e.g. "Jr.".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Person {
    /// "Given particle Family suffix", falling back to the alias.
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [
            self.given_names.as_deref(),
            self.name_particle.as_deref(),
            self.family_names.as_deref(),
            self.name_suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();

        if parts.is_empty() {
            self.alias.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }

    /// Initials of the given names: "Jean-Baptiste Marie" → "J.-B. M.".
    pub fn initials(&self) -> String {
        self.given_names
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(|word| {
                word.split('-')
                    .filter_map(|part| part.chars().next())
                    .map(|c| format!("{c}."))
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Family name including any particle: "van Rossum".
    pub fn family_with_particle(&self) -> Option<String> {
        let family = self.family_names.as_deref()?;
        Some(match self.name_particle.as_deref() {
            Some(particle) => format!("{particle} {family}"),
            None => family.to_string(),
        })
    }
}

/// An entity author (organisation, institute, team).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// `license`: one SPDX identifier or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Single(String),
    Multiple(Vec<String>),
}

impl License {
    /// All identifiers, in document order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Single(id) => vec![id.as_str()],
            Self::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ids().join(" OR "))
    }
}

/// `version` may be written as a string or a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Entry of `identifiers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: IdentifierType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Kinds of identifier CFF knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    Doi,
    Url,
    /// Software Heritage persistent identifier.
    Swh,
    Other,
}

impl IdentifierType {
    /// Accepted spellings.
    pub const ALL: [&'static str; 4] = ["doi", "url", "swh", "other"];
}

/// A reference (`preferred-citation` or an entry of `references`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VersionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionValue>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn person(given: &str, family: &str) -> Person {
        Person {
            given_names: Some(given.into()),
            family_names: Some(family.into()),
            ..Person::default()
        }
    }

    #[test]
    fn test_person_full_name() {
        let mut p = person("Guido", "Rossum");
        p.name_particle = Some("van".into());
        assert_eq!(p.full_name(), "Guido van Rossum");
        assert_eq!(p.family_with_particle().as_deref(), Some("van Rossum"));
    }

    #[test]
    fn test_person_alias_fallback() {
        let p = Person {
            alias: Some("octocat".into()),
            ..Person::default()
        };
        assert_eq!(p.full_name(), "octocat");
    }

    #[test]
    fn test_initials() {
        assert_eq!(person("Jean-Baptiste Marie", "Dupont").initials(), "J.-B. M.");
        assert_eq!(person("Florian", "Pinault").initials(), "F.");
    }

    #[test]
    fn test_license_display() {
        let single = License::Single("Apache-2.0".into());
        assert_eq!(single.to_string(), "Apache-2.0");

        let multi = License::Multiple(vec!["MIT".into(), "Apache-2.0".into()]);
        assert_eq!(multi.ids(), vec!["MIT", "Apache-2.0"]);
        assert_eq!(multi.to_string(), "MIT OR Apache-2.0");
    }

    #[test]
    fn test_citation_type_default() {
        assert_eq!(CitationType::default(), CitationType::Software);
        assert_eq!(CitationType::Dataset.to_string(), "dataset");
    }

    #[test]
    fn test_author_display_name() {
        let entity = Author::Entity(Entity {
            name: "ECMWF".into(),
            ..Entity::default()
        });
        assert_eq!(entity.display_name(), "ECMWF");

        let p = Author::Person(person("Baudouin", "Raoult"));
        assert_eq!(p.display_name(), "Baudouin Raoult");
    }

    #[test]
    fn test_version_value_display() {
        assert_eq!(VersionValue::Text("0.3.1".into()).to_string(), "0.3.1");
        assert_eq!(VersionValue::Integer(2).to_string(), "2");
    }
}
