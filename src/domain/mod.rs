//! Domain layer - Writing system model, language tags and collation

pub mod collation;
pub mod defaults;
pub mod definition;
pub mod language_tag;
pub mod subtags;

pub use collation::{CollationSetting, Collator, SortRulesType};
pub use definition::WritingSystemDefinition;
pub use language_tag::{IpaStatus, LanguageTag};
