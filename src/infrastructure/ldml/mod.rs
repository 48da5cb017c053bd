//! LDML codec: read, write, version detection and migration
//!
//! Path and stream entry points load the whole document into memory before
//! parsing, so a write never holds more than the destination and the prior
//! document open at once.

pub mod cursor;
pub mod migration;
pub mod names;
pub mod reader;
pub mod rules_xml;
pub mod version;
pub mod writer;

pub use migration::migrate_to_latest;
pub use reader::read_definition;
pub use version::detect_version;
pub use writer::write_definition;

use crate::domain::WritingSystemDefinition;
use crate::error::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Schema version this codec reads and writes
pub const SCHEMA_VERSION: i32 = 2;

pub fn read<R: Read>(mut input: R) -> Result<WritingSystemDefinition> {
    let mut xml = String::new();
    input.read_to_string(&mut xml)?;
    read_definition(&xml)
}

pub fn read_file(path: &Path) -> Result<WritingSystemDefinition> {
    read_definition(&fs::read_to_string(path)?)
}

/// Write `ws` to `output`, merging over `prior` when given
pub fn write<W: Write, R: Read>(
    output: W,
    ws: &WritingSystemDefinition,
    prior: Option<R>,
) -> Result<W> {
    let prior = match prior {
        Some(mut input) => {
            let mut xml = String::new();
            input.read_to_string(&mut xml)?;
            Some(xml)
        }
        None => None,
    };
    write_definition(output, ws, prior.as_deref())
}

pub fn write_to_string(ws: &WritingSystemDefinition, prior: Option<&str>) -> Result<String> {
    let bytes = write_definition(Vec::new(), ws, prior)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `ws` to `path`. An existing file at `path` is used as the prior
/// document.
pub fn write_file(path: &Path, ws: &WritingSystemDefinition) -> Result<()> {
    let prior = if path.exists() {
        Some(fs::read_to_string(path)?)
    } else {
        None
    };
    let xml = write_to_string(ws, prior.as_deref())?;
    fs::write(path, xml)?;
    Ok(())
}

pub fn detect_version_of<R: Read>(mut input: R) -> Result<i32> {
    let mut xml = String::new();
    input.read_to_string(&mut xml)?;
    detect_version(&xml)
}

pub fn detect_version_file(path: &Path) -> Result<i32> {
    detect_version(&fs::read_to_string(path)?)
}
