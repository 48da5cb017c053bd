//! wsdef - LDML writing system definitions
//!
//! A language tag model, an LDML reader/writer that preserves content it does
//! not understand, sort-rule dialects with a tailored comparator, and a
//! migrator for older LDML schema versions. The binary manages a directory
//! store of definition files.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{LanguageTag, SortRulesType, WritingSystemDefinition};
pub use error::WsError;
