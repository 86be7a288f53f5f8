//! Citation File Format (CFF) support.
//!
//! Reads `CITATION.cff` documents, checks them against the CFF 1.2.0 schema
//! rules, and renders them as formatted references.
//!
//! # Modules
//!
//! - [`model`]: Typed citation record (authors, license, identifiers, ...)
//! - [`parse`]: YAML loading
//! - [`validate`]: Schema validation with path-addressed issues
//! - [`render`]: APA and BibTeX output
//! - [`spdx`]: License identifier checks
//!
//! # Example
//!
//! ```rust
//! use aim_citation::{parse_str, ValidationPolicy};
//!
//! let content = "\
//! cff-version: 1.2.0
//! message: If you use this software, please cite it as below.
//! title: ai-models
//! type: software
//! license: Apache-2.0
//! authors:
//!   - name: European Centre for Medium-Range Weather Forecasts
//! ";
//! let doc = parse_str(content).unwrap();
//! assert!(doc.validate(&ValidationPolicy::default()).is_valid());
//! assert_eq!(doc.deserialize().unwrap().title, "ai-models");
//! ```

pub mod model;
pub mod parse;
pub mod render;
pub mod spdx;
pub mod validate;

pub use model::{Author, Citation, CitationType, Entity, License, Person};
pub use parse::{CITATION_FILE_NAME, CitationDocument, load, parse_str};
pub use validate::{Issue, Severity, ValidationPolicy, ValidationReport, validate};
