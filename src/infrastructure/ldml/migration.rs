//! Upgraders for older LDML generations.
//!
//! This module is I/O-free: each step takes document text and returns new
//! document text. A step rewrites the identity components and the version
//! marker and copies every other node through.

use super::cursor::{element_name, XmlCursor, XmlOut};
use super::names::{PALASO_NS, PALASO_PREFIX, VERSION};
use super::version::detect_version;
use super::SCHEMA_VERSION;
use crate::domain::language_tag::{
    concatenate_variant_and_private_use, is_flex_private_use, is_variant_subtag,
    split_variant_and_private_use, LanguageTag, AUDIO_PRIVATE_USE, AUDIO_SCRIPT,
    IPA_PHONEMIC_PRIVATE_USE, IPA_PHONETIC_PRIVATE_USE,
};
use crate::domain::subtags;
use crate::error::{Result, WsError};
use quick_xml::events::{BytesDecl, BytesText, Event};
use tracing::{debug, info};

/// Markers older files put in the variant that belong in private use
const MISPLACED_PRIVATE_USE: &[&str] = &[
    AUDIO_PRIVATE_USE,
    IPA_PHONEMIC_PRIVATE_USE,
    IPA_PHONETIC_PRIVATE_USE,
];

/// The four `identity` components a step may rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityParts {
    pub language: String,
    pub script: String,
    pub territory: String,
    pub variant: String,
}

impl IdentityParts {
    fn from_tag(tag: &LanguageTag) -> Self {
        IdentityParts {
            language: tag.language().to_string(),
            script: tag.script().to_string(),
            territory: tag.region().to_string(),
            variant: tag.variant(),
        }
    }
}

pub type Step = fn(IdentityParts) -> Result<IdentityParts>;

/// The upgrader for documents at `version` and the version it produces
pub fn upgrade_step(version: i32) -> Option<(i32, Step)> {
    match version {
        -1 => Some((1, convert_flex_identity as Step)),
        1 => Some((2, conform_to_rfc5646 as Step)),
        _ => None,
    }
}

/// Apply single-step upgraders until the document is current. A current
/// document is returned unchanged.
pub fn migrate_to_latest(xml: &str) -> Result<String> {
    let mut current = xml.to_string();
    let mut version = detect_version(&current)?;
    while version != SCHEMA_VERSION {
        let (target, step) = upgrade_step(version).ok_or(WsError::UnknownVersion(version))?;
        info!(from = version, to = target, "upgrading LDML document");
        current = apply_step(&current, target, step)?;
        version = detect_version(&current)?;
    }
    Ok(current)
}

/// Unversioned files may carry FLEx private-use languages (`x-kal`)
fn convert_flex_identity(parts: IdentityParts) -> Result<IdentityParts> {
    if !is_flex_private_use(&parts.language) {
        return Ok(parts);
    }
    debug!(language = %parts.language, "converting FLEX private-use identity");
    let tag = LanguageTag::from_flex_private_use(
        &parts.language,
        &parts.script,
        &parts.territory,
        &parts.variant,
    )?;
    Ok(IdentityParts::from_tag(&tag))
}

/// Version 1 files may use three-letter codes with a two-letter equivalent
/// and private-use markers outside the `-x-` section
fn conform_to_rfc5646(parts: IdentityParts) -> Result<IdentityParts> {
    let mut language = parts.language.trim().to_ascii_lowercase();
    if let Some(entry) = subtags::find_language(&language) {
        if entry.code.len() < language.len() {
            language = entry.code.to_string();
        }
    }

    let (variant, private) = split_variant_and_private_use(&parts.variant);
    let mut variants: Vec<String> = Vec::new();
    let mut private_use: Vec<String> = Vec::new();
    for subtag in variant.split('-').filter(|s| !s.is_empty()) {
        let subtag = subtag.to_ascii_lowercase();
        if is_variant_subtag(&subtag) && !MISPLACED_PRIVATE_USE.contains(&subtag.as_str()) {
            variants.push(subtag);
        } else {
            private_use.push(subtag);
        }
    }
    for subtag in private.split('-').filter(|s| !s.is_empty()) {
        let subtag = subtag.to_ascii_lowercase();
        if !private_use.contains(&subtag) {
            private_use.push(subtag);
        }
    }

    let mut script = parts.script.clone();
    if script.is_empty() && private_use.iter().any(|p| p == AUDIO_PRIVATE_USE) {
        script = AUDIO_SCRIPT.to_string();
    }

    let combined = concatenate_variant_and_private_use(&variants.join("-"), &private_use.join("-"));
    let tag = LanguageTag::from_components(&language, &script, &parts.territory, &combined)?;
    Ok(IdentityParts::from_tag(&tag))
}

/// Run `step` over the identity of `xml` and stamp `target` as its version
pub fn apply_step(xml: &str, target: i32, step: Step) -> Result<String> {
    let mut cursor = XmlCursor::parse(xml)?;
    if cursor.move_to_root().as_deref() != Some("ldml") {
        return Err(WsError::Structural(
            "Unable to migrate: Missing <ldml> tag.".to_string(),
        ));
    }
    let root = cursor
        .element()
        .cloned()
        .ok_or_else(|| WsError::Structural("Unable to migrate: Missing <ldml> tag.".to_string()))?;

    let mut out = XmlOut::new(Vec::new());
    out.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    out.write(Event::Start(root))?;

    if cursor.enter() {
        cursor.copy_until(&mut out, "identity")?;
        if cursor.is_at("identity") {
            rewrite_identity(&mut cursor, &mut out, step)?;
        }
        cursor.copy_until(&mut out, "special")?;
        if !has_metadata_ahead(&cursor)? {
            write_version_block(&mut out, target)?;
        }
        while !cursor.at_end() {
            if cursor.is_at("special") && cursor.palaso_prefix()?.is_some() {
                restamp_version(&mut cursor, &mut out, target)?;
            } else {
                cursor.copy_node(&mut out)?;
            }
        }
    } else {
        write_version_block(&mut out, target)?;
    }

    out.end("ldml")?;
    out.write(Event::Text(BytesText::new("\n")))?;
    String::from_utf8(out.into_inner())
        .map_err(|e| WsError::Structural(format!("migrated document is not UTF-8: {}", e)))
}

fn rewrite_identity(cursor: &mut XmlCursor, out: &mut XmlOut<Vec<u8>>, step: Step) -> Result<()> {
    let Some(Event::Start(start)) = cursor.peek().cloned() else {
        // an empty identity has no components to rewrite
        return cursor.copy_node(out);
    };
    cursor.enter();
    out.write(Event::Start(start))?;

    let mut parts = IdentityParts::default();
    for (name, value) in [
        ("language", &mut parts.language),
        ("script", &mut parts.script),
        ("territory", &mut parts.territory),
        ("variant", &mut parts.variant),
    ] {
        cursor.copy_until(out, name)?;
        if cursor.is_at(name) {
            *value = cursor.attribute("type")?.unwrap_or_default();
            cursor.skip_node();
        }
    }

    let parts = step(parts)?;
    for (name, value) in [
        ("language", parts.language.as_str()),
        ("script", parts.script.as_str()),
        ("territory", parts.territory.as_str()),
        ("variant", parts.variant.as_str()),
    ] {
        if !value.is_empty() {
            out.empty(name, &[("type", value)])?;
        }
    }
    cursor.copy_to_end(out)?;
    out.end("identity")
}

fn has_metadata_ahead(cursor: &XmlCursor) -> Result<bool> {
    let mut probe = cursor.clone();
    while !probe.at_end() {
        if probe.is_at("special") && probe.palaso_prefix()?.is_some() {
            return Ok(true);
        }
        probe.skip_node();
    }
    Ok(false)
}

fn write_version_block(out: &mut XmlOut<Vec<u8>>, target: i32) -> Result<()> {
    let xmlns = format!("xmlns:{}", PALASO_PREFIX);
    let field = format!("{}:{}", PALASO_PREFIX, VERSION);
    let value = target.to_string();
    out.start("special", &[(xmlns.as_str(), PALASO_NS)])?;
    out.empty(&field, &[("value", value.as_str())])?;
    out.end("special")
}

fn restamp_version(cursor: &mut XmlCursor, out: &mut XmlOut<Vec<u8>>, target: i32) -> Result<()> {
    let prefix = cursor
        .palaso_prefix()?
        .unwrap_or_else(|| PALASO_PREFIX.to_string());
    let field = format!("{}:{}", prefix, VERSION);
    let value = target.to_string();
    let Some(start) = cursor.element().cloned() else {
        return Ok(());
    };
    let name = element_name(&start);

    out.write(Event::Start(start))?;
    if cursor.enter() {
        while !cursor.at_end() {
            if cursor.is_at(&field) {
                cursor.skip_node();
            } else {
                cursor.copy_node(out)?;
            }
        }
        cursor.next_event();
    }
    out.empty(&field, &[("value", value.as_str())])?;
    out.end(&name)
}
