//! The writing system definition aggregate

use crate::domain::collation::{self, CollationSetting, Collator, SortRulesType};
use crate::domain::defaults;
use crate::domain::language_tag::{IpaStatus, LanguageTag};
use crate::domain::subtags;
use crate::error::{Result, WsError};
use chrono::{DateTime, Utc};

/// Replace `field` with `value`, treating `None` and `""` as equal.
/// Returns true when the stored value changed.
fn update_text(field: &mut String, value: Option<&str>) -> bool {
    let value = value.unwrap_or("");
    if field == value {
        return false;
    }
    field.clear();
    field.push_str(value);
    true
}

/// Identity, display and sorting settings for one writing system.
///
/// Every setter that changes observable state marks the definition as
/// modified. `store_id` is the key the store last saved it under and can lag
/// behind the tag until the store reconciles it.
#[derive(Debug, Clone, PartialEq)]
pub struct WritingSystemDefinition {
    tag: LanguageTag,
    language_name: String,
    abbreviation: String,
    default_font_name: String,
    default_font_size: f32,
    keyboard: String,
    is_legacy_encoded: bool,
    spell_checking_id: String,
    right_to_left: bool,
    version_number: String,
    version_description: String,
    date_modified: DateTime<Utc>,
    collation: CollationSetting,
    modified: bool,
    store_id: Option<String>,
}

impl Default for WritingSystemDefinition {
    fn default() -> Self {
        WritingSystemDefinition::from_tag(LanguageTag::default())
    }
}

impl WritingSystemDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tag(tag: LanguageTag) -> Self {
        WritingSystemDefinition {
            tag,
            language_name: String::new(),
            abbreviation: String::new(),
            default_font_name: String::new(),
            default_font_size: 0.0,
            keyboard: String::new(),
            is_legacy_encoded: false,
            spell_checking_id: String::new(),
            right_to_left: false,
            version_number: String::new(),
            version_description: String::new(),
            date_modified: Utc::now(),
            collation: CollationSetting::default(),
            modified: false,
            store_id: None,
        }
    }

    /// A definition seeded from the defaults table, e.g. `en-latn`
    pub fn with_defaults(key: &str) -> Result<Self> {
        let mut ws = WritingSystemDefinition::new();
        ws.fill_with_defaults(key)?;
        Ok(ws)
    }

    pub fn fill_with_defaults(&mut self, key: &str) -> Result<()> {
        let seed = defaults::seed_for(key);
        let mut tag = self.tag.clone();
        if let Some(language) = seed.language {
            tag.set_language(language)?;
        }
        tag.set_script(seed.script)?;
        self.set_tag(tag);
        if let Some(name) = seed.language_name {
            self.set_language_name(name);
        }
        if let Some(abbreviation) = seed.abbreviation {
            self.set_abbreviation(abbreviation);
        }
        Ok(())
    }

    fn touch(&mut self, changed: bool) {
        if changed {
            self.modified = true;
        }
    }

    // Identity

    pub fn tag(&self) -> &LanguageTag {
        &self.tag
    }

    pub fn rfc5646(&self) -> String {
        self.tag.compose()
    }

    pub fn language(&self) -> &str {
        self.tag.language()
    }

    pub fn script(&self) -> &str {
        self.tag.script()
    }

    pub fn region(&self) -> &str {
        self.tag.region()
    }

    /// Combined `variant-x-private` form
    pub fn variant(&self) -> String {
        self.tag.variant()
    }

    pub fn set_tag(&mut self, tag: LanguageTag) {
        let changed = self.tag != tag;
        self.tag = tag;
        self.touch(changed);
    }

    fn update_tag(&mut self, change: impl FnOnce(&mut LanguageTag) -> Result<()>) -> Result<()> {
        let mut tag = self.tag.clone();
        change(&mut tag)?;
        self.set_tag(tag);
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.update_tag(|t| t.set_language(language))
    }

    pub fn set_script(&mut self, script: &str) -> Result<()> {
        self.update_tag(|t| t.set_script(script))
    }

    pub fn set_region(&mut self, region: &str) -> Result<()> {
        self.update_tag(|t| t.set_region(region))
    }

    pub fn set_variant(&mut self, variant: &str) -> Result<()> {
        self.update_tag(|t| t.set_variant(variant))
    }

    pub fn set_all_components(
        &mut self,
        language: &str,
        script: &str,
        region: &str,
        variant: &str,
    ) -> Result<()> {
        let tag = LanguageTag::from_components(language, script, region, variant)?;
        self.set_tag(tag);
        Ok(())
    }

    pub fn ipa_status(&self) -> IpaStatus {
        self.tag.ipa_status()
    }

    pub fn set_ipa_status(&mut self, status: IpaStatus) -> Result<()> {
        self.update_tag(|t| t.set_ipa_status(status))
    }

    pub fn is_voice(&self) -> bool {
        self.tag.is_audio()
    }

    /// Turning voice on also clears IPA marking and the keyboard
    pub fn set_is_voice(&mut self, voice: bool) -> Result<()> {
        if self.is_voice() == voice {
            return Ok(());
        }
        self.update_tag(|t| t.set_audio(voice))?;
        if voice {
            self.set_keyboard(None);
        }
        Ok(())
    }

    pub fn duplicate_number(&self) -> u32 {
        self.tag.duplicate_number()
    }

    pub fn set_duplicate_number(&mut self, number: i64) -> Result<()> {
        self.update_tag(|t| t.set_duplicate_number(number))
    }

    // Display

    /// The custom name, else the name from the language table
    pub fn language_name(&self) -> String {
        if !self.language_name.is_empty() {
            return self.language_name.clone();
        }
        subtags::find_language(self.language())
            .map(|l| l.name.to_string())
            .unwrap_or_else(|| "Unknown Language".to_string())
    }

    pub fn set_language_name<'a>(&mut self, name: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.language_name, name.into());
        self.touch(changed);
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn set_abbreviation<'a>(&mut self, abbreviation: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.abbreviation, abbreviation.into());
        self.touch(changed);
    }

    /// "English in US written in Latin script. (en-Latn-US)"
    pub fn verbose_description(&self) -> String {
        let mut summary = self.language_name();
        if !self.region().is_empty() {
            summary.push_str(&format!(" in {}", self.region()));
        }
        if !self.script().is_empty() {
            let label = subtags::find_script(self.script())
                .map(|s| s.label)
                .unwrap_or(self.script());
            summary.push_str(&format!(" written in {} script", label));
        }
        summary.push_str(&format!(". ({})", self.rfc5646()));
        summary
    }

    pub fn default_font_name(&self) -> &str {
        &self.default_font_name
    }

    pub fn set_default_font_name<'a>(&mut self, font: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.default_font_name, font.into());
        self.touch(changed);
    }

    pub fn default_font_size(&self) -> f32 {
        self.default_font_size
    }

    pub fn set_default_font_size(&mut self, size: f32) -> Result<()> {
        if size == self.default_font_size {
            return Ok(());
        }
        if !size.is_finite() || size < 0.0 {
            return Err(WsError::InvalidValue(format!(
                "Font size must be a non-negative number, got {}",
                size
            )));
        }
        self.default_font_size = size;
        self.modified = true;
        Ok(())
    }

    pub fn keyboard(&self) -> &str {
        &self.keyboard
    }

    pub fn set_keyboard<'a>(&mut self, keyboard: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.keyboard, keyboard.into());
        self.touch(changed);
    }

    pub fn right_to_left(&self) -> bool {
        self.right_to_left
    }

    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        let changed = self.right_to_left != right_to_left;
        self.right_to_left = right_to_left;
        self.touch(changed);
    }

    pub fn is_legacy_encoded(&self) -> bool {
        self.is_legacy_encoded
    }

    pub fn set_legacy_encoded(&mut self, legacy: bool) {
        let changed = self.is_legacy_encoded != legacy;
        self.is_legacy_encoded = legacy;
        self.touch(changed);
    }

    /// Falls back to the language subtag when unset
    pub fn spell_checking_id(&self) -> &str {
        if self.spell_checking_id.is_empty() {
            self.language()
        } else {
            &self.spell_checking_id
        }
    }

    pub fn set_spell_checking_id<'a>(&mut self, id: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.spell_checking_id, id.into());
        self.touch(changed);
    }

    // Versioning and bookkeeping

    pub fn version_number(&self) -> &str {
        &self.version_number
    }

    pub fn set_version_number<'a>(&mut self, number: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.version_number, number.into());
        self.touch(changed);
    }

    pub fn version_description(&self) -> &str {
        &self.version_description
    }

    pub fn set_version_description<'a>(&mut self, description: impl Into<Option<&'a str>>) {
        let changed = update_text(&mut self.version_description, description.into());
        self.touch(changed);
    }

    pub fn date_modified(&self) -> DateTime<Utc> {
        self.date_modified
    }

    /// Does not mark the definition as modified
    pub fn set_date_modified(&mut self, date: DateTime<Utc>) {
        self.date_modified = date;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    pub fn set_store_id(&mut self, id: Option<String>) {
        self.store_id = id;
    }

    // Sorting

    pub fn collation(&self) -> &CollationSetting {
        &self.collation
    }

    pub fn sort_using(&self) -> SortRulesType {
        self.collation.sort_using()
    }

    pub fn set_sort_using(&mut self, sort_using: SortRulesType) {
        let changed = self.collation.set_sort_using(sort_using);
        self.touch(changed);
    }

    pub fn sort_rules(&self) -> &str {
        self.collation.rules()
    }

    pub fn set_sort_rules<'a>(&mut self, rules: impl Into<Option<&'a str>>) {
        let changed = self.collation.set_rules(rules.into().unwrap_or(""));
        self.touch(changed);
    }

    pub fn validate_collation_rules(&self) -> Result<()> {
        collation::validate_rules(self.sort_using(), self.sort_rules())
    }

    pub fn collator(&self) -> Result<&Collator> {
        self.collation.collator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn english() -> WritingSystemDefinition {
        WritingSystemDefinition::from_tag(LanguageTag::parse("en").unwrap())
    }

    #[test]
    fn test_new_definition_is_unmodified_unlisted_language() {
        let ws = WritingSystemDefinition::new();
        assert_eq!(ws.rfc5646(), "qaa");
        assert!(!ws.is_modified());
        assert_eq!(ws.sort_using(), SortRulesType::DefaultOrdering);
    }

    #[test]
    fn test_setters_mark_modified() {
        let mut ws = english();
        ws.set_abbreviation("eng");
        assert!(ws.is_modified());

        ws.set_modified(false);
        ws.set_region("US").unwrap();
        assert!(ws.is_modified());

        ws.set_modified(false);
        ws.set_sort_using(SortRulesType::CustomICU);
        assert!(ws.is_modified());
    }

    #[test]
    fn test_setting_same_value_is_noop() {
        let mut ws = english();
        ws.set_abbreviation(None);
        ws.set_abbreviation("");
        ws.set_language("en").unwrap();
        ws.set_right_to_left(false);
        ws.set_sort_rules("");
        ws.set_default_font_size(0.0).unwrap();
        assert!(!ws.is_modified());
    }

    #[test]
    fn test_rejected_mutation_leaves_definition_unchanged() {
        let mut ws = english();
        assert!(ws.set_variant("x-audio").is_err());
        assert_eq!(ws.rfc5646(), "en");
        assert!(!ws.is_modified());
    }

    #[test]
    fn test_language_name_falls_back() {
        let mut ws = english();
        assert_eq!(ws.language_name(), "English");
        ws.set_language_name("Inglés");
        assert_eq!(ws.language_name(), "Inglés");

        let unknown = WritingSystemDefinition::from_tag(LanguageTag::parse("zzz").unwrap());
        assert_eq!(unknown.language_name(), "Unknown Language");
    }

    #[test]
    fn test_spell_checking_id_defaults_to_language() {
        let mut ws = english();
        assert_eq!(ws.spell_checking_id(), "en");
        ws.set_spell_checking_id("en_US");
        assert_eq!(ws.spell_checking_id(), "en_US");
    }

    #[test]
    fn test_voice_clears_keyboard_and_ipa() {
        let mut ws = english();
        ws.set_keyboard("US International");
        ws.set_ipa_status(IpaStatus::IpaPhonemic).unwrap();
        ws.set_is_voice(true).unwrap();
        assert!(ws.is_voice());
        assert_eq!(ws.keyboard(), "");
        assert_eq!(ws.ipa_status(), IpaStatus::NotIpa);
        assert_eq!(ws.rfc5646(), "en-Zxxx-x-audio");

        ws.set_is_voice(false).unwrap();
        assert_eq!(ws.rfc5646(), "en");
    }

    #[test]
    fn test_ipa_on_voice_fails_and_keeps_state() {
        let mut ws = english();
        ws.set_is_voice(true).unwrap();
        assert!(ws.set_ipa_status(IpaStatus::Ipa).is_err());
        assert!(ws.is_voice());
    }

    #[test]
    fn test_font_size_validation() {
        let mut ws = english();
        assert!(ws.set_default_font_size(-1.0).is_err());
        assert!(ws.set_default_font_size(f32::NAN).is_err());
        assert!(ws.set_default_font_size(f32::INFINITY).is_err());
        ws.set_default_font_size(12.0).unwrap();
        assert_eq!(ws.default_font_size(), 12.0);
    }

    #[test]
    fn test_verbose_description() {
        let mut ws = english();
        ws.set_script("Latn").unwrap();
        ws.set_region("US").unwrap();
        assert_eq!(
            ws.verbose_description(),
            "English in US written in Latin script. (en-Latn-US)"
        );
    }

    #[test]
    fn test_fill_with_defaults() {
        let ws = WritingSystemDefinition::with_defaults("en-latn").unwrap();
        assert_eq!(ws.rfc5646(), "en-Latn");
        assert_eq!(ws.abbreviation(), "eng");
        assert_eq!(ws.language_name(), "English");

        let other = WritingSystemDefinition::with_defaults("unknown").unwrap();
        assert_eq!(other.rfc5646(), "qaa-Latn");
    }

    #[test]
    fn test_duplicate_number() {
        let mut ws = english();
        ws.set_duplicate_number(2).unwrap();
        assert_eq!(ws.rfc5646(), "en-x-dupl2");
        assert_eq!(ws.duplicate_number(), 2);
        assert!(ws.set_duplicate_number(-3).is_err());
    }

    #[test]
    fn test_collator_follows_rules() {
        let mut ws = english();
        ws.set_sort_using(SortRulesType::CustomICU);
        ws.set_sort_rules("&a < c");
        let collator = ws.collator().unwrap();
        assert_eq!(collator.compare("c", "b"), Ordering::Less);
        assert!(ws.validate_collation_rules().is_ok());
    }
}
