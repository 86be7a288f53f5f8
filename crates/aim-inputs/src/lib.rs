//! Input fields for AI weather models.
//!
//! This crate provides the data side of a model run: reading initial
//! conditions, deriving parameters a source lacks, and writing fields out.
//!
//! # Modules
//!
//! - [`field`]: [`Field`], [`FieldMetadata`] and [`FieldList`]
//! - [`format`]: JSON / JSON Lines field files
//! - [`compute`]: Derived parameters (`z`, `tcwv`, `r`)
//! - [`input`]: The [`Input`] trait and [`FileInput`]
//! - [`registry`]: Inputs by name
//! - [`output`]: Output sinks
//!
//! # Example
//!
//! ```rust
//! use aim_inputs::compute::make_tcwv_from_q;
//! use aim_inputs::{Field, FieldList, FieldMetadata, LevType};
//!
//! let q = |level, value| {
//!     Field::new(FieldMetadata::new("q", LevType::Pl).with_level(level), vec![value]).unwrap()
//! };
//! let fields = FieldList::new(vec![q(500, 0.001), q(850, 0.006)]);
//! let fields = make_tcwv_from_q(fields).unwrap();
//! assert!(fields.has_param("tcwv"));
//! ```

pub mod compute;
pub mod field;
pub mod format;
pub mod input;
pub mod output;
pub mod registry;

mod proptests;

pub use field::{Field, FieldList, FieldMetadata, LevType};
pub use format::{FieldFormat, read_fields, write_fields};
pub use input::{FileInput, Input};
pub use output::{Output, OutputSummary, available_outputs, get_output};
pub use registry::{InputArgs, InputRegistry, available_inputs, get_input};
