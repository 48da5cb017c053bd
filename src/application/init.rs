//! Initialize store use case

use crate::error::Result;
use crate::infrastructure::{DefinitionStore, FileSystemStore, StoreConfig};
use std::fs;
use std::path::Path;

/// Initialize a new writing system store at the specified path.
pub fn init(path: &Path, default_font: Option<&str>) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let store = FileSystemStore::new(path.to_path_buf());
    store.initialize()?;

    let mut config = StoreConfig::new();
    if let Some(font) = default_font {
        config.default_font = font.to_string();
    }
    store.save_config(&config)?;

    println!("Initialized wsdef store at {}", path.display());
    Ok(())
}
