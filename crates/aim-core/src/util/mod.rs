//! Utility modules.
//!
//! - [`paths`]: Tilde expansion, upward file discovery, extensions

pub mod paths;
