//! Infrastructure layer - LDML codec, store and configuration

pub mod config;
pub mod ldml;
pub mod store;

pub use config::StoreConfig;
pub use store::{DefinitionEntry, DefinitionStore, FileSystemStore};
