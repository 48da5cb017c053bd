//! Writing system definition use cases

use crate::application::manage_config::parse_bool;
use crate::domain::{defaults, IpaStatus, LanguageTag, SortRulesType, WritingSystemDefinition};
use crate::error::{Result, WsError};
use crate::infrastructure::{DefinitionStore, FileSystemStore};
use chrono::Utc;
use std::str::FromStr;
use tracing::warn;

/// Fields accepted by [`DefinitionService::set`]
pub const FIELDS: &[&str] = &[
    "tag",
    "language",
    "script",
    "region",
    "variant",
    "ipa",
    "voice",
    "duplicate",
    "language_name",
    "abbreviation",
    "font",
    "font_size",
    "keyboard",
    "rtl",
    "legacy",
    "spell_checking_id",
    "version_number",
    "version_description",
    "sort_using",
    "sort_rules",
];

/// One line of `wsdef list`
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionSummary {
    pub id: String,
    /// Verbose description, absent when the file cannot be read
    pub description: Option<String>,
    /// Why the file cannot be read
    pub problem: Option<String>,
}

/// Service for creating, editing and inspecting stored definitions
pub struct DefinitionService {
    store: FileSystemStore,
}

impl DefinitionService {
    pub fn new(store: FileSystemStore) -> Self {
        DefinitionService { store }
    }

    /// Create and save a definition from a seed key such as `en-latn`, or
    /// from a language tag.
    pub fn create(&self, key: &str) -> Result<WritingSystemDefinition> {
        let config = self.store.load_config()?;

        let mut ws = if defaults::has_seed(key) {
            WritingSystemDefinition::with_defaults(key)?
        } else {
            WritingSystemDefinition::from_tag(LanguageTag::parse(key)?)
        };
        if !config.default_font.is_empty() {
            ws.set_default_font_name(config.default_font.as_str());
        }

        self.store.save_definition(&mut ws)?;
        Ok(ws)
    }

    /// Summaries of every stored definition. Files that cannot be read are
    /// listed with the reason instead of failing the listing.
    pub fn list(&self) -> Result<Vec<DefinitionSummary>> {
        let mut summaries = Vec::new();
        for entry in self.store.list_definitions()? {
            let summary = match self.store.read_definition(&entry.id) {
                Ok(ws) => DefinitionSummary {
                    id: entry.id,
                    description: Some(ws.verbose_description()),
                    problem: None,
                },
                Err(e) if e.is_structural() => DefinitionSummary {
                    id: entry.id,
                    description: None,
                    problem: Some(e.to_string()),
                },
                Err(e) => return Err(e),
            };
            summaries.push(summary);
        }
        Ok(summaries)
    }

    pub fn show(&self, id: &str) -> Result<WritingSystemDefinition> {
        self.store.read_definition(id)
    }

    /// Change one field and save. An empty value clears text fields.
    pub fn set(&self, id: &str, field: &str, value: &str) -> Result<WritingSystemDefinition> {
        let mut ws = self.store.read_definition(id)?;
        apply_field(&mut ws, field, value)?;

        if !ws.is_modified() {
            return Ok(ws);
        }
        if matches!(field, "sort_using" | "sort_rules") {
            if let Err(e) = ws.validate_collation_rules() {
                warn!(id = %ws.rfc5646(), error = %e, "sort rules are not valid and will not be written");
            }
        }
        ws.set_date_modified(Utc::now());
        self.store.save_definition(&mut ws)?;
        Ok(ws)
    }

    /// Check the tag and sort rules of a stored definition
    pub fn validate(&self, id: &str) -> Result<WritingSystemDefinition> {
        let ws = self.store.read_definition(id)?;
        ws.tag().validate()?;
        ws.validate_collation_rules()?;
        Ok(ws)
    }

    /// Sort `words` with the definition's collation
    pub fn sort(&self, id: &str, mut words: Vec<String>) -> Result<Vec<String>> {
        let ws = self.store.read_definition(id)?;
        ws.collator()?.sort(&mut words);
        Ok(words)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    parse_bool(value).ok_or_else(|| {
        WsError::InvalidValue(format!("{} expects true or false, got '{}'", field, value))
    })
}

fn apply_field(ws: &mut WritingSystemDefinition, field: &str, value: &str) -> Result<()> {
    match field {
        "tag" => ws.set_tag(LanguageTag::parse(value)?),
        "language" => ws.set_language(value)?,
        "script" => ws.set_script(value)?,
        "region" => ws.set_region(value)?,
        "variant" => ws.set_variant(value)?,
        "ipa" => ws.set_ipa_status(IpaStatus::from_str(value).map_err(WsError::InvalidValue)?)?,
        "voice" => ws.set_is_voice(parse_flag(field, value)?)?,
        "duplicate" => {
            let number = value.trim().parse::<i64>().map_err(|_| {
                WsError::InvalidValue(format!("duplicate expects a number, got '{}'", value))
            })?;
            ws.set_duplicate_number(number)?
        }
        "language_name" => ws.set_language_name(value),
        "abbreviation" => ws.set_abbreviation(value),
        "font" => ws.set_default_font_name(value),
        "font_size" => {
            let size = value.trim().parse::<f32>().map_err(|_| {
                WsError::InvalidValue(format!("font_size expects a number, got '{}'", value))
            })?;
            ws.set_default_font_size(size)?
        }
        "keyboard" => ws.set_keyboard(value),
        "rtl" => ws.set_right_to_left(parse_flag(field, value)?),
        "legacy" => ws.set_legacy_encoded(parse_flag(field, value)?),
        "spell_checking_id" => ws.set_spell_checking_id(value),
        "version_number" => ws.set_version_number(value),
        "version_description" => ws.set_version_description(value),
        "sort_using" => {
            ws.set_sort_using(SortRulesType::from_str(value).map_err(WsError::InvalidValue)?)
        }
        "sort_rules" => ws.set_sort_rules(value),
        _ => {
            return Err(WsError::InvalidValue(format!(
                "Unknown field: '{}'. Valid fields are: {}",
                field,
                FIELDS.join(", ")
            )))
        }
    }
    Ok(())
}
