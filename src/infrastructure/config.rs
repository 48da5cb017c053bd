//! Store configuration

use crate::error::{Result, WsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the directory that marks a store root
pub const STORE_DIR: &str = ".wsdef";

fn default_archive_on_migrate() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub created: DateTime<Utc>,
    /// Keep a copy of every file a migration rewrites
    #[serde(default = "default_archive_on_migrate")]
    pub archive_on_migrate: bool,
    /// Font given to definitions created with `wsdef new`
    #[serde(default)]
    pub default_font: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new()
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        StoreConfig {
            created: Utc::now(),
            archive_on_migrate: default_archive_on_migrate(),
            default_font: String::new(),
        }
    }

    /// Load config from .wsdef/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(STORE_DIR).join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WsError::NotStoreDirectory(path.to_path_buf())
            } else {
                WsError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| WsError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config to .wsdef/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let store_dir = path.join(STORE_DIR);
        if !store_dir.exists() {
            fs::create_dir(&store_dir)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| WsError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(store_dir.join("config.toml"), contents)?;
        Ok(())
    }
}
