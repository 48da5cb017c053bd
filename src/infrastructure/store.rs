//! File system store of LDML definitions

use crate::domain::WritingSystemDefinition;
use crate::error::{Result, WsError};
use crate::infrastructure::config::{StoreConfig, STORE_DIR};
use crate::infrastructure::ldml;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File extension of stored definitions
pub const LDML_EXTENSION: &str = "ldml";

/// A definition file in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionEntry {
    /// Store id, the file name without extension
    pub id: String,
    /// Path relative to the store root
    pub filename: String,
}

/// Abstract store of writing system definitions
pub trait DefinitionStore {
    /// Get the root directory of this store
    fn root(&self) -> &Path;

    /// Load configuration from .wsdef/config.toml
    fn load_config(&self) -> Result<StoreConfig>;

    /// Save configuration to .wsdef/config.toml
    fn save_config(&self, config: &StoreConfig) -> Result<()>;

    /// Check if .wsdef directory exists
    fn is_initialized(&self) -> bool;

    /// Create .wsdef directory structure
    fn initialize(&self) -> Result<()>;
}

/// File system implementation of DefinitionStore
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    pub root: PathBuf,
}

impl FileSystemStore {
    pub fn new(root: PathBuf) -> Self {
        FileSystemStore { root }
    }

    /// Discover the store root by walking up from the current directory.
    /// WSDEF_ROOT takes precedence when set.
    pub fn discover() -> Result<Self> {
        if let Ok(root_path) = std::env::var("WSDEF_ROOT") {
            let path = PathBuf::from(root_path);
            if Self::has_store_dir(&path) {
                return Ok(FileSystemStore::new(path));
            }
            return Err(WsError::Config(format!(
                "WSDEF_ROOT is set to '{}' but no .wsdef directory found. \
                Run 'wsdef init' in that directory or unset WSDEF_ROOT.",
                path.display()
            )));
        }

        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Discover the store root by walking up from a specific starting directory
    pub fn discover_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            if Self::has_store_dir(&current) {
                return Ok(FileSystemStore::new(current));
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(WsError::NotStoreDirectory(start.to_path_buf())),
            }
        }
    }

    fn has_store_dir(path: &Path) -> bool {
        path.join(STORE_DIR).is_dir()
    }
}

impl DefinitionStore for FileSystemStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load_config(&self) -> Result<StoreConfig> {
        StoreConfig::load_from_dir(&self.root)
    }

    fn save_config(&self, config: &StoreConfig) -> Result<()> {
        config.save_to_dir(&self.root)
    }

    fn is_initialized(&self) -> bool {
        Self::has_store_dir(&self.root)
    }

    fn initialize(&self) -> Result<()> {
        let store_dir = self.root.join(STORE_DIR);
        if store_dir.exists() {
            return Err(WsError::Config(format!(
                "Directory already initialized: {}",
                self.root.display()
            )));
        }
        fs::create_dir(&store_dir)?;
        Ok(())
    }
}

// Definition files (not part of trait - filesystem-specific)
impl FileSystemStore {
    pub fn file_name_for(id: &str) -> String {
        format!("{}.{}", id, LDML_EXTENSION)
    }

    pub fn definition_path(&self, id: &str) -> PathBuf {
        self.root.join(Self::file_name_for(id))
    }

    /// All definition files at the store root, sorted by id. Hidden files
    /// and the .wsdef directory are skipped.
    pub fn list_definitions(&self) -> Result<Vec<DefinitionEntry>> {
        let walker = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !name.starts_with('.'))
            });

        let mut definitions = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| WsError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LDML_EXTENSION) {
                continue;
            }
            let (Some(id), Some(filename)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            definitions.push(DefinitionEntry {
                id: id.to_string(),
                filename: filename.to_string(),
            });
        }

        definitions.sort_by(|a, b| a.id.to_lowercase().cmp(&b.id.to_lowercase()));
        Ok(definitions)
    }

    /// Resolve `id` to a stored id, ignoring case
    pub fn find_id(&self, id: &str) -> Result<String> {
        let entries = self.list_definitions()?;
        entries
            .iter()
            .find(|entry| entry.id == id)
            .or_else(|| entries.iter().find(|entry| entry.id.eq_ignore_ascii_case(id)))
            .map(|entry| entry.id.clone())
            .ok_or_else(|| WsError::DefinitionNotFound(id.to_string()))
    }

    pub fn read_definition(&self, id: &str) -> Result<WritingSystemDefinition> {
        let id = self.find_id(id)?;
        let mut ws = ldml::read_file(&self.definition_path(&id))?;
        ws.set_store_id(Some(id));
        Ok(ws)
    }

    /// Save `ws` as `<rfc5646>.ldml`, merging over the file it was loaded
    /// from. When the tag changed since the last save the old file is
    /// removed.
    pub fn save_definition(&self, ws: &mut WritingSystemDefinition) -> Result<PathBuf> {
        let id = ws.rfc5646();
        let path = self.definition_path(&id);
        let previous = ws.store_id().map(str::to_string);
        let renamed = previous.as_deref().filter(|old| *old != id);

        if path.exists() && previous.as_deref() != Some(id.as_str()) {
            return Err(WsError::InvalidValue(format!(
                "a writing system with id '{}' already exists",
                id
            )));
        }

        let prior_file = match renamed {
            Some(old) if self.definition_path(old).is_file() => Self::file_name_for(old),
            _ => Self::file_name_for(&id),
        };
        let prior = if self.root.join(&prior_file).is_file() {
            Some(self.read_raw(&prior_file)?)
        } else {
            None
        };

        let xml = ldml::write_to_string(ws, prior.as_deref())?;
        self.write_atomic(&Self::file_name_for(&id), &xml)?;

        if let Some(old) = renamed {
            let old_path = self.definition_path(old);
            if old_path.is_file() {
                info!(from = old, to = %id, "writing system id changed; removing old file");
                fs::remove_file(old_path)?;
            }
        }

        debug!(id = %id, "saved writing system");
        ws.set_store_id(Some(id));
        ws.set_modified(false);
        Ok(path)
    }

    pub fn read_raw(&self, filename: &str) -> Result<String> {
        let path = self.root.join(filename);
        fs::read_to_string(&path).map_err(WsError::Io)
    }

    /// Write content using a best-effort atomic replace:
    /// write to a temp file in the same directory, then rename into place.
    ///
    /// On Windows, `rename` does not overwrite existing files, so we remove the destination first.
    pub fn write_atomic(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.root.join(filename);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_name = format!(
            "{}.wsdef-tmp-{}",
            path.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("definition.ldml"),
            std::process::id()
        );
        let tmp_path = path.with_file_name(tmp_name);
        fs::write(&tmp_path, content)?;

        if cfg!(windows) && path.exists() {
            fs::remove_file(&path)?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Copy a file (relative paths) within the store.
    pub fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let from_path = self.root.join(from);
        let to_path = self.root.join(to);

        if !from_path.exists() {
            return Err(WsError::Config(format!(
                "Cannot copy missing file: {}",
                from_path.display()
            )));
        }
        if let Some(parent) = to_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(from_path, to_path)?;
        Ok(())
    }

    /// Move (rename) a file (relative paths) within the store.
    pub fn move_file(&self, from: &str, to: &str) -> Result<()> {
        let from_path = self.root.join(from);
        let to_path = self.root.join(to);

        if !from_path.exists() {
            return Err(WsError::Config(format!(
                "Cannot move missing file: {}",
                from_path.display()
            )));
        }
        if to_path.exists() {
            return Err(WsError::Config(format!(
                "Destination already exists: {}",
                to_path.display()
            )));
        }
        if let Some(parent) = to_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::rename(from_path, to_path)?;
        Ok(())
    }
}
