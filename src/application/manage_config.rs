//! Config management use case

use crate::error::{Result, WsError};
use crate::infrastructure::{DefinitionStore, FileSystemStore, StoreConfig};

/// Service for managing store configuration
pub struct ConfigService {
    store: FileSystemStore,
}

impl ConfigService {
    pub fn new(store: FileSystemStore) -> Self {
        ConfigService { store }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.store.load_config()?;

        match key {
            "archive_on_migrate" => Ok(config.archive_on_migrate.to_string()),
            "default_font" => Ok(config.default_font.clone()),
            "created" => Ok(config.created.to_rfc3339()),
            _ => Err(WsError::Config(format!(
                "Unknown config key: '{}'. Valid keys are: archive_on_migrate, default_font, created",
                key
            ))),
        }
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.store.load_config()?;

        match key {
            "archive_on_migrate" => {
                config.archive_on_migrate = parse_bool(value).ok_or_else(|| {
                    WsError::Config(format!(
                        "Invalid value for archive_on_migrate: '{}'. Use true or false",
                        value
                    ))
                })?;
            }
            "default_font" => {
                config.default_font = value.trim().to_string();
            }
            "created" => {
                return Err(WsError::Config(
                    "Cannot modify 'created' field (read-only)".to_string(),
                ));
            }
            _ => {
                return Err(WsError::Config(format!(
                    "Unknown config key: '{}'. Valid keys are: archive_on_migrate, default_font",
                    key
                )));
            }
        }

        self.store.save_config(&config)?;
        Ok(())
    }

    /// List all config values
    pub fn list(&self) -> Result<StoreConfig> {
        self.store.load_config()
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
