//! Schema version detection

use super::cursor::XmlCursor;
use super::names::VERSION;
use crate::error::{Result, WsError};

/// Version marker of an LDML document, or -1 when it has none
pub fn detect_version(xml: &str) -> Result<i32> {
    let mut cursor = XmlCursor::parse(xml)?;
    if cursor.move_to_root().as_deref() != Some("ldml") {
        return Err(WsError::Structural(
            "Unable to detect version: Missing <ldml> tag.".to_string(),
        ));
    }
    if !cursor.enter() {
        return Ok(-1);
    }
    while cursor.find_element("special") {
        let Some(prefix) = cursor.palaso_prefix()? else {
            cursor.skip_node();
            continue;
        };
        let fields = cursor.special_fields(&prefix)?;
        return match fields.get(VERSION) {
            Some(value) => value.trim().parse::<i32>().map_err(|_| {
                WsError::Structural(format!("version '{}' is not a number", value))
            }),
            None => Ok(-1),
        };
    }
    Ok(-1)
}
