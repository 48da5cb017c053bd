//! Error types for wsdef

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wsdef
#[derive(Debug, Error)]
pub enum WsError {
    #[error("Not a wsdef store: {0}")]
    NotStoreDirectory(PathBuf),

    #[error("Writing system not found: {0}")]
    DefinitionNotFound(String),

    #[error("Invalid language tag: {0}")]
    InvalidTag(String),

    #[error("Invalid sort rules: {0}")]
    InvalidRules(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Malformed LDML: {0}")]
    Structural(String),

    #[error("Cannot read LDML expecting version {expected} but got {found}")]
    UnsupportedVersion { expected: i32, found: i32 },

    #[error("No migration known for LDML version {0}")]
    UnknownVersion(i32),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl WsError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WsError::NotStoreDirectory(_) => 2,
            WsError::DefinitionNotFound(_) => 3,
            WsError::InvalidTag(_) | WsError::InvalidRules(_) | WsError::InvalidValue(_) => 4,
            WsError::Structural(_)
            | WsError::UnsupportedVersion { .. }
            | WsError::UnknownVersion(_)
            | WsError::Xml(_)
            | WsError::XmlAttribute(_) => 5,
            _ => 1,
        }
    }

    /// True for failures that abort a read or migration outright
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            WsError::Structural(_)
                | WsError::UnsupportedVersion { .. }
                | WsError::UnknownVersion(_)
                | WsError::Xml(_)
                | WsError::XmlAttribute(_)
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            WsError::NotStoreDirectory(path) => {
                format!(
                    "Not a wsdef store: {}\n\n\
                    Suggestions:\n\
                    • Run 'wsdef init' in this directory to create a new store\n\
                    • Navigate to an existing store directory\n\
                    • Set WSDEF_ROOT environment variable to your store path",
                    path.display()
                )
            }
            WsError::DefinitionNotFound(id) => {
                format!(
                    "Writing system not found: '{}'\n\n\
                    Suggestions:\n\
                    • Use 'wsdef list' to see the writing systems in this store\n\
                    • Identifiers are RFC 5646 tags (e.g., en-Latn, qaa-x-kal)\n\
                    • Create it with 'wsdef new {}'",
                    id, id
                )
            }
            WsError::InvalidTag(msg) => {
                format!(
                    "Invalid language tag: {}\n\n\
                    Expected form: language[-Script][-REGION][-variant...][-x-private...]\n\
                    Example: wsdef set en-Latn region US",
                    msg
                )
            }
            WsError::InvalidRules(msg) => {
                format!(
                    "Invalid sort rules: {}\n\n\
                    Suggestions:\n\
                    • Check the rules with 'wsdef validate <id>'\n\
                    • Simple rules: one sort group per line, case variants separated by spaces\n\
                    • ICU rules: '&a < b << c <<< C'",
                    msg
                )
            }
            WsError::UnsupportedVersion { found, .. } => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check the file version: wsdef version <file>\n\
                    • Upgrade the store: wsdef migrate --yes{}",
                    self,
                    if *found < 0 {
                        " (file has no version marker)"
                    } else {
                        ""
                    }
                )
            }
            WsError::Config(msg) => {
                if msg.contains("Unknown config key") {
                    format!(
                        "{}\n\n\
                        Valid keys: archive_on_migrate, default_font, created\n\
                        Example: wsdef config default_font 'Charis SIL'",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using WsError
pub type Result<T> = std::result::Result<T, WsError>;
