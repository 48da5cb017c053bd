//! LDML document → [`WritingSystemDefinition`]

use super::cursor::XmlCursor;
use super::names::*;
use super::rules_xml::CollationContent;
use super::SCHEMA_VERSION;
use crate::domain::collation::{SimpleRules, SortRulesType};
use crate::domain::language_tag::{is_flex_private_use, LanguageTag};
use crate::domain::WritingSystemDefinition;
use crate::error::{Result, WsError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::str::FromStr;
use tracing::{debug, warn};

/// Parse a definition from LDML text. The result is unmodified and has no
/// store id.
pub fn read_definition(xml: &str) -> Result<WritingSystemDefinition> {
    let mut cursor = XmlCursor::parse(xml)?;
    if cursor.move_to_root().as_deref() != Some("ldml") {
        return Err(WsError::Structural(
            "Unable to load writing system definition: Missing <ldml> tag.".to_string(),
        ));
    }

    let mut ws = WritingSystemDefinition::new();
    let mut flex = false;
    let mut metadata_found = false;
    if cursor.enter() {
        if cursor.find_element("identity") {
            flex = read_identity(&mut cursor, &mut ws)?;
        }
        if cursor.find_element("layout") {
            read_layout(&mut cursor, &mut ws)?;
        }
        if cursor.find_element("collations") {
            read_collations(&mut cursor, &mut ws)?;
        }
        while cursor.find_element("special") {
            if read_metadata(&mut cursor, &mut ws, flex)? {
                metadata_found = true;
            }
        }
    }

    // FLEX private-use files predate the version marker
    if !flex && !metadata_found {
        return Err(WsError::UnsupportedVersion {
            expected: SCHEMA_VERSION,
            found: -1,
        });
    }

    ws.set_store_id(None);
    ws.set_modified(false);
    Ok(ws)
}

/// Returns true when the identity used a FLEX private-use language
fn read_identity(cursor: &mut XmlCursor, ws: &mut WritingSystemDefinition) -> Result<bool> {
    let mut language = String::new();
    let mut script = String::new();
    let mut region = String::new();
    let mut variant = String::new();

    if cursor.enter() {
        if cursor.find_element("version") {
            ws.set_version_number(cursor.attribute("number")?.as_deref());
            let description = cursor.read_text()?;
            ws.set_version_description(description.as_str());
        }
        if cursor.find_element("generation") {
            let date = cursor.attribute("date")?.unwrap_or_default();
            ws.set_date_modified(parse_generation_date(&date)?);
            cursor.skip_node();
        }
        for (name, value) in [
            ("language", &mut language),
            ("script", &mut script),
            ("territory", &mut region),
            ("variant", &mut variant),
        ] {
            if cursor.find_element(name) {
                *value = cursor.attribute("type")?.unwrap_or_default();
                cursor.skip_node();
            }
        }
        cursor.skip_to_end();
    } else {
        return Ok(false);
    }

    let flex = is_flex_private_use(&language);
    let tag = if flex {
        debug!(language = %language, "converting FLEX private-use identity");
        LanguageTag::from_flex_private_use(&language, &script, &region, &variant)
    } else {
        LanguageTag::from_components(&language, &script, &region, &variant)
    }
    .map_err(|e| WsError::Structural(format!("identity: {}", e)))?;
    ws.set_tag(tag);
    Ok(flex)
}

fn read_layout(cursor: &mut XmlCursor, ws: &mut WritingSystemDefinition) -> Result<()> {
    if !cursor.enter() {
        return Ok(());
    }
    if cursor.find_element("orientation") {
        let characters = cursor.attribute("characters")?;
        ws.set_right_to_left(characters.as_deref() == Some("right-to-left"));
        cursor.skip_node();
    }
    cursor.skip_to_end();
    Ok(())
}

fn read_collations(cursor: &mut XmlCursor, ws: &mut WritingSystemDefinition) -> Result<()> {
    if !cursor.enter() {
        return Ok(());
    }
    while cursor.find_element("collation") {
        if is_standard_collation(cursor.attribute("type")?.as_deref()) {
            let content = CollationContent::parse(cursor.take_node())?;
            apply_collation(content, ws)?;
            break;
        }
        cursor.skip_node();
    }
    cursor.skip_to_end();
    Ok(())
}

/// What a standard collation block reads back as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollationRead {
    /// Rules in the dialect the document declared
    Exact(SortRulesType, String),
    /// The declared dialect could not be honored; the rules are kept as ICU
    /// text instead
    Degraded { rules: String, reason: &'static str },
}

/// Resolve the declared dialect of a standard collation against its content
pub fn resolve_collation(content: CollationContent) -> Result<CollationRead> {
    let sort_using = match content.sort_rules_type.as_deref() {
        Some(value) => SortRulesType::from_str(value).map_err(WsError::Structural)?,
        None => SortRulesType::DefaultOrdering,
    };
    let icu_text = if content.has_rules {
        content.rules.to_rule_text()
    } else {
        String::new()
    };

    let read = match sort_using {
        SortRulesType::DefaultOrdering => CollationRead::Exact(sort_using, String::new()),
        SortRulesType::OtherLanguage => match content.alias_source {
            Some(source) => CollationRead::Exact(sort_using, source),
            None => CollationRead::Degraded {
                rules: icu_text,
                reason: "OtherLanguage collation has no base alias",
            },
        },
        SortRulesType::CustomSimple => {
            let simple = if content.has_rules {
                SimpleRules::from_icu(&content.rules)
            } else {
                None
            };
            match simple {
                Some(simple) => CollationRead::Exact(sort_using, simple.to_text()),
                None => CollationRead::Degraded {
                    rules: icu_text,
                    reason: "Simple sort rules could not be recovered",
                },
            }
        }
        SortRulesType::CustomICU => CollationRead::Exact(sort_using, icu_text),
    };
    Ok(read)
}

fn apply_collation(content: CollationContent, ws: &mut WritingSystemDefinition) -> Result<()> {
    let (sort_using, rules) = match resolve_collation(content)? {
        CollationRead::Exact(sort_using, rules) => (sort_using, rules),
        CollationRead::Degraded { rules, reason } => {
            warn!("{}; reading them as ICU rules", reason);
            (SortRulesType::CustomICU, rules)
        }
    };
    ws.set_sort_using(sort_using);
    ws.set_sort_rules(rules.as_str());
    Ok(())
}

/// Read one top-level `special`. Returns true when it was our metadata block.
fn read_metadata(
    cursor: &mut XmlCursor,
    ws: &mut WritingSystemDefinition,
    flex: bool,
) -> Result<bool> {
    let Some(prefix) = cursor.palaso_prefix()? else {
        cursor.skip_node();
        return Ok(false);
    };
    let fields = cursor.special_fields(&prefix)?;
    let field = |name: &str| fields.get(name).map(String::as_str);

    if !flex {
        let found = match field(VERSION) {
            Some(value) => value.trim().parse::<i32>().map_err(|_| {
                WsError::Structural(format!("version '{}' is not a number", value))
            })?,
            None => -1,
        };
        if found != SCHEMA_VERSION {
            return Err(WsError::UnsupportedVersion {
                expected: SCHEMA_VERSION,
                found,
            });
        }
    }

    if let Some(value) = field(ABBREVIATION) {
        ws.set_abbreviation(value);
    }
    if let Some(value) = field(DEFAULT_FONT_FAMILY) {
        ws.set_default_font_name(value);
    }
    if let Some(value) = field(DEFAULT_FONT_SIZE) {
        match value.trim().parse::<f32>() {
            Ok(size) => ws.set_default_font_size(size)?,
            Err(_) => warn!(value, "ignoring unreadable default font size"),
        }
    }
    if let Some(value) = field(DEFAULT_KEYBOARD) {
        ws.set_keyboard(value);
    }
    if let Some(value) = field(IS_LEGACY_ENCODED) {
        ws.set_legacy_encoded(value.trim().eq_ignore_ascii_case("true"));
    }
    if let Some(value) = field(LANGUAGE_NAME) {
        ws.set_language_name(value);
    }
    if let Some(value) = field(SPELL_CHECKING_ID) {
        ws.set_spell_checking_id(value);
    }
    Ok(true)
}

/// Accepts ISO 8601 and the CVS keyword form `$Date: 2008/06/18 22:52:35 $`.
/// An empty date reads as now.
pub fn parse_generation_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Utc::now());
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "$Date: %Y/%m/%d %H:%M:%S $"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(date.and_utc());
        }
    }
    if let Some(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(date.and_utc());
    }
    Err(WsError::Structural(format!(
        "unrecognized generation date '{}'",
        value
    )))
}
