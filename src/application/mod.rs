//! Application layer - Use cases and orchestration

pub mod init;
pub mod manage_config;
pub mod manage_definition;
pub mod migrate_store;

pub use manage_config::ConfigService;
pub use manage_definition::{DefinitionService, DefinitionSummary};
pub use migrate_store::{migrate_store, MigrateStoreOptions};
