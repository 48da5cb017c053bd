//! Store migration use case.
//!
//! Upgrades every definition file in the store to the current LDML schema
//! version, archiving the originals first.

use crate::error::{Result, WsError};
use crate::infrastructure::ldml::{self, SCHEMA_VERSION};
use crate::infrastructure::{DefinitionStore, FileSystemStore};
use chrono::Utc;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct MigrateStoreOptions {
    pub dry_run: bool,
    pub yes: bool,
    pub archive_dir: Option<PathBuf>,
}

pub fn migrate_store(store: &FileSystemStore, options: MigrateStoreOptions) -> Result<()> {
    MigrateStoreContext { store }.execute(options)
}

struct MigrateStoreContext<'a> {
    store: &'a FileSystemStore,
}

#[derive(Debug, Clone)]
struct FileUpgrade {
    filename: String,
    from_version: i32,
    /// File name matching the upgraded tag; equals `filename` when unchanged
    target: String,
    content: String,
}

#[derive(Debug, Clone)]
struct MigrationPlan {
    current: usize,
    upgrades: Vec<FileUpgrade>,
}

impl MigrateStoreContext<'_> {
    pub fn execute(&self, options: MigrateStoreOptions) -> Result<()> {
        let config = self.store.load_config()?;
        let archive_dir = if options.archive_dir.is_some() || config.archive_on_migrate {
            Some(self.resolve_archive_dir(options.archive_dir)?)
        } else {
            None
        };

        let plan = self.plan()?;
        if plan.upgrades.is_empty() {
            println!(
                "All {} writing systems are at version {}. Nothing to do.",
                plan.current, SCHEMA_VERSION
            );
            return Ok(());
        }

        self.print_plan(archive_dir.as_deref(), &plan);

        if options.dry_run {
            return Ok(());
        }
        if !options.yes {
            println!("Refusing to run without --yes. Re-run with --yes to apply the migration.");
            return Ok(());
        }

        self.apply(archive_dir.as_deref(), &plan)?;
        println!(
            "Migration complete. Upgraded {} files to version {}.",
            plan.upgrades.len(),
            SCHEMA_VERSION
        );
        Ok(())
    }

    fn resolve_archive_dir(&self, archive_dir: Option<PathBuf>) -> Result<String> {
        // Only allow archive within store root (relative path) to keep all file operations under the store.
        if let Some(p) = archive_dir {
            if p.is_absolute() {
                return Err(WsError::Config(
                    "archive-dir must be a relative path within the store directory".to_string(),
                ));
            }
            return Ok(p.to_string_lossy().to_string());
        }

        let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
        Ok(format!(".wsdef/archive/migration-{}", stamp))
    }

    /// Compute every upgraded document up front so a failure leaves the
    /// store untouched.
    fn plan(&self) -> Result<MigrationPlan> {
        let entries = self.store.list_definitions()?;
        let existing: HashSet<String> = entries.iter().map(|e| e.filename.clone()).collect();
        let mut claimed: HashSet<String> = HashSet::new();
        let mut plan = MigrationPlan {
            current: 0,
            upgrades: Vec::new(),
        };

        for entry in entries {
            let raw = self.store.read_raw(&entry.filename)?;
            let from_version = ldml::detect_version(&raw).map_err(|e| in_file(&entry.filename, e))?;
            if from_version == SCHEMA_VERSION {
                plan.current += 1;
                continue;
            }

            let content = ldml::migrate_to_latest(&raw).map_err(|e| in_file(&entry.filename, e))?;
            let ws = ldml::read_definition(&content).map_err(|e| in_file(&entry.filename, e))?;

            let renamed = FileSystemStore::file_name_for(&ws.rfc5646());
            let target = if renamed != entry.filename
                && !existing.contains(&renamed)
                && !claimed.contains(&renamed)
            {
                renamed
            } else {
                entry.filename.clone()
            };
            claimed.insert(target.clone());

            plan.upgrades.push(FileUpgrade {
                filename: entry.filename,
                from_version,
                target,
                content,
            });
        }
        Ok(plan)
    }

    fn print_plan(&self, archive_dir: Option<&str>, plan: &MigrationPlan) {
        println!("LDML migration plan: upgrade to version {}", SCHEMA_VERSION);
        println!("Archive dir: {}", archive_dir.unwrap_or("(none)"));
        println!("Files already current: {}", plan.current);
        println!("Files to upgrade: {}", plan.upgrades.len());
        for upgrade in &plan.upgrades {
            if upgrade.target == upgrade.filename {
                println!("- {} (version {})", upgrade.filename, upgrade.from_version);
            } else {
                println!(
                    "- {} (version {}) -> {}",
                    upgrade.filename, upgrade.from_version, upgrade.target
                );
            }
        }
    }

    fn apply(&self, archive_dir: Option<&str>, plan: &MigrationPlan) -> Result<()> {
        // 1) Back up every file before anything is rewritten.
        if let Some(archive_dir) = archive_dir {
            for upgrade in &plan.upgrades {
                let backup = format!("{}/{}", archive_dir, upgrade.filename);
                self.store.copy_file(&upgrade.filename, &backup)?;
            }
        }

        // 2) Rewrite in place, then move to the name of the upgraded tag.
        for upgrade in &plan.upgrades {
            self.store.write_atomic(&upgrade.filename, &upgrade.content)?;
            if upgrade.target != upgrade.filename {
                self.store.move_file(&upgrade.filename, &upgrade.target)?;
            }
            info!(file = %upgrade.filename, from = upgrade.from_version, "upgraded writing system");
        }
        Ok(())
    }
}

fn in_file(filename: &str, err: WsError) -> WsError {
    match err {
        WsError::Structural(msg) => WsError::Structural(format!("{}: {}", filename, msg)),
        other => other,
    }
}
