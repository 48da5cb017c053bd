//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wsdef")]
#[command(about = "Manage LDML writing system definitions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new store
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Font given to new writing systems
        #[arg(long)]
        font: Option<String>,
    },

    /// Create a writing system from a seed key (e.g., en-latn) or a language tag
    New {
        key: String,
    },

    /// List the writing systems in the store
    List,

    /// Show every field of a writing system
    Show {
        id: String,
    },

    /// Change one field of a writing system
    Set {
        id: String,

        /// Field name (e.g., region, font, sort_using, sort_rules)
        field: String,

        /// New value; an empty string clears text fields
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Check the tag and sort rules of a writing system
    Validate {
        id: String,
    },

    /// Sort words with the collation of a writing system
    Sort {
        id: String,

        #[arg(required = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Print the schema version of an LDML file (-1 when unversioned)
    Version {
        file: PathBuf,
    },

    /// Upgrade every file in the store to the current schema version
    Migrate {
        /// Print the plan without changing files
        #[arg(long)]
        dry_run: bool,

        /// Apply the migration
        #[arg(long)]
        yes: bool,

        /// Archive directory relative to the store root
        #[arg(long)]
        archive_dir: Option<PathBuf>,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },
}
