//! RFC 5646 language tags with the private-use conventions used for audio and
//! IPA writing systems.

use crate::error::{Result, WsError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Script code reserved for unwritten (audio) writing systems
pub const AUDIO_SCRIPT: &str = "Zxxx";
/// Private-use subtag marking an audio writing system
pub const AUDIO_PRIVATE_USE: &str = "audio";
/// Registered variant subtag for the International Phonetic Alphabet
pub const IPA_VARIANT: &str = "fonipa";
pub const IPA_PHONEMIC_PRIVATE_USE: &str = "emic";
pub const IPA_PHONETIC_PRIVATE_USE: &str = "etic";
/// Language code for a language that is not listed in ISO 639
pub const UNLISTED_LANGUAGE: &str = "qaa";

fn duplicate_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^dupl[0-9]*$").unwrap())
}

/// How a writing system relates to the International Phonetic Alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpaStatus {
    #[default]
    NotIpa,
    Ipa,
    IpaPhonetic,
    IpaPhonemic,
}

impl FromStr for IpaStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "notipa" | "no" => Ok(IpaStatus::NotIpa),
            "ipa" => Ok(IpaStatus::Ipa),
            "phonetic" | "etic" => Ok(IpaStatus::IpaPhonetic),
            "phonemic" | "emic" => Ok(IpaStatus::IpaPhonemic),
            _ => Err(format!(
                "Invalid IPA status: '{}'. Valid values are: none, ipa, phonetic, phonemic",
                s
            )),
        }
    }
}

/// A structured language tag: `language-Script-REGION-variant...-x-private...`
///
/// All subtags are stored in canonical case, so composing a tag and parsing it
/// back always yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    language: String,
    script: String,
    region: String,
    variants: Vec<String>,
    private_use: Vec<String>,
}

impl Default for LanguageTag {
    fn default() -> Self {
        LanguageTag {
            language: UNLISTED_LANGUAGE.to_string(),
            script: String::new(),
            region: String::new(),
            variants: Vec::new(),
            private_use: Vec::new(),
        }
    }
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_language_subtag(s: &str) -> bool {
    is_alpha(s) && (matches!(s.len(), 2 | 3) || (5..=8).contains(&s.len()))
}

fn is_script_subtag(s: &str) -> bool {
    s.len() == 4 && is_alpha(s)
}

fn is_region_subtag(s: &str) -> bool {
    (s.len() == 2 && is_alpha(s)) || (s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()))
}

pub(crate) fn is_variant_subtag(s: &str) -> bool {
    is_alphanumeric(s)
        && ((5..=8).contains(&s.len())
            || (s.len() == 4 && s.starts_with(|c: char| c.is_ascii_digit())))
}

fn is_private_use_subtag(s: &str) -> bool {
    is_alphanumeric(s) && s.len() <= 8
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Split a combined `variant-x-private` string into its RFC variant part and
/// its private-use part (both without the `x` separator).
pub fn split_variant_and_private_use(variant: &str) -> (String, String) {
    let lower = variant.to_ascii_lowercase();
    if lower == "x" {
        return (String::new(), String::new());
    }
    if let Some(rest) = lower.strip_prefix("x-") {
        return (String::new(), variant[variant.len() - rest.len()..].to_string());
    }
    match lower.find("-x-") {
        Some(pos) => (variant[..pos].to_string(), variant[pos + 3..].to_string()),
        None => (variant.to_string(), String::new()),
    }
}

/// Join an RFC variant part and a private-use part into the combined form
/// stored in LDML `identity/variant`.
pub fn concatenate_variant_and_private_use(variant: &str, private_use: &str) -> String {
    match (variant.is_empty(), private_use.is_empty()) {
        (true, true) => String::new(),
        (false, true) => variant.to_string(),
        (true, false) => format!("x-{}", private_use),
        (false, false) => format!("{}-x-{}", variant, private_use),
    }
}

/// A language code written by FLEx for private-use languages (`x-kal`)
pub fn is_flex_private_use(language: &str) -> bool {
    // Only `x` and `x-...`: registered codes such as `xh` also start with x.
    let lower = language.to_ascii_lowercase();
    lower == "x" || lower.starts_with("x-")
}

fn strip_private_use_prefix(subtag: &str) -> &str {
    let trimmed = subtag.trim_start_matches('-');
    if trimmed.len() >= 2 && trimmed[..2].eq_ignore_ascii_case("x-") {
        &trimmed[2..]
    } else {
        trimmed
    }
}

fn private_use_parts(text: &str) -> Result<Vec<String>> {
    text.split('-')
        .filter(|p| !p.is_empty())
        .map(|p| {
            if is_private_use_subtag(p) {
                Ok(p.to_ascii_lowercase())
            } else {
                Err(WsError::InvalidTag(format!(
                    "'{}' is not a valid private use subtag",
                    p
                )))
            }
        })
        .collect()
}

fn variant_parts(text: &str) -> Result<Vec<String>> {
    text.split('-')
        .filter(|p| !p.is_empty())
        .map(|p| {
            if is_variant_subtag(p) {
                Ok(p.to_ascii_lowercase())
            } else {
                Err(WsError::InvalidTag(format!(
                    "'{}' is not a valid variant subtag",
                    p
                )))
            }
        })
        .collect()
}

impl LanguageTag {
    /// Parse a tag from its canonical string form
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WsError::InvalidTag("tag is empty".to_string()));
        }

        let parts: Vec<&str> = text.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(WsError::InvalidTag(format!("'{}' has an empty subtag", text)));
        }

        let mut tag = LanguageTag {
            language: String::new(),
            ..LanguageTag::default()
        };
        let mut i = 0;

        if !parts[0].eq_ignore_ascii_case("x") {
            if !is_language_subtag(parts[0]) {
                return Err(WsError::InvalidTag(format!(
                    "'{}' is not a valid language subtag",
                    parts[0]
                )));
            }
            tag.language = parts[0].to_ascii_lowercase();
            i = 1;

            if i < parts.len() && is_script_subtag(parts[i]) {
                tag.script = title_case(parts[i]);
                i += 1;
            }
            if i < parts.len() && is_region_subtag(parts[i]) {
                tag.region = parts[i].to_ascii_uppercase();
                i += 1;
            }
            while i < parts.len() && is_variant_subtag(parts[i]) {
                tag.variants.push(parts[i].to_ascii_lowercase());
                i += 1;
            }
        }

        if i < parts.len() {
            if !parts[i].eq_ignore_ascii_case("x") {
                let reason = if parts[i].len() == 1 {
                    "extension subtags are not supported"
                } else {
                    "subtag is out of place or malformed"
                };
                return Err(WsError::InvalidTag(format!(
                    "'{}' in '{}': {}",
                    parts[i], text, reason
                )));
            }
            i += 1;
            if i == parts.len() {
                return Err(WsError::InvalidTag(format!(
                    "'{}' has an empty private use section",
                    text
                )));
            }
            tag.private_use = private_use_parts(&parts[i..].join("-"))?;
        }

        tag.validate()?;
        Ok(tag)
    }

    /// Build a tag from the four LDML identity components. `variant` is the
    /// combined `variant-x-private` form.
    pub fn from_components(language: &str, script: &str, region: &str, variant: &str) -> Result<Self> {
        let mut tag = LanguageTag {
            language: String::new(),
            ..LanguageTag::default()
        };
        tag.apply_language(language)?;
        tag.apply_script(script)?;
        tag.apply_region(region)?;
        tag.apply_variant(variant)?;
        tag.validate()?;
        Ok(tag)
    }

    /// Reinterpret identity components written with the FLEx private-use
    /// convention, where the language itself is a private-use code.
    ///
    /// The FLEx language code moves to the front of the private-use subtags
    /// and the language becomes `qaa` unless the result is pure private use.
    pub fn from_flex_private_use(
        language: &str,
        script: &str,
        region: &str,
        variant: &str,
    ) -> Result<Self> {
        let (rfc_variant, variant_private) = split_variant_and_private_use(variant);
        let flex_code = strip_private_use_prefix(language);
        let private_use = [flex_code, variant_private.as_str()]
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("-");

        let language = if script.is_empty() && region.is_empty() && rfc_variant.is_empty() {
            ""
        } else {
            UNLISTED_LANGUAGE
        };

        let combined = concatenate_variant_and_private_use(&rfc_variant, &private_use);
        Self::from_components(language, script, region, &combined)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn private_use(&self) -> &[String] {
        &self.private_use
    }

    /// The combined `variant-x-private` form stored in LDML `identity/variant`
    pub fn variant(&self) -> String {
        concatenate_variant_and_private_use(&self.variants.join("-"), &self.private_use.join("-"))
    }

    /// Compose the canonical string form (inverse of [`LanguageTag::parse`])
    pub fn compose(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for field in [&self.language, &self.script, &self.region] {
            if !field.is_empty() {
                parts.push(field);
            }
        }
        parts.extend(self.variants.iter().map(String::as_str));
        if !self.private_use.is_empty() {
            parts.push("x");
            parts.extend(self.private_use.iter().map(String::as_str));
        }
        parts.join("-")
    }

    /// Check the cross-field invariants. Every mutation runs this before it
    /// commits.
    pub fn validate(&self) -> Result<()> {
        if self.language.is_empty() {
            if !(self.script.is_empty() && self.region.is_empty() && self.variants.is_empty()) {
                return Err(WsError::InvalidTag(
                    "a language subtag is required when script, region or variant is set"
                        .to_string(),
                ));
            }
            if self.private_use.is_empty() {
                return Err(WsError::InvalidTag(
                    "a tag needs a language subtag or a private use section".to_string(),
                ));
            }
        }

        if let Some(bad) = self.variants.iter().find(|v| !is_variant_subtag(v)) {
            return Err(WsError::InvalidTag(format!(
                "'{}' is not a valid variant subtag",
                bad
            )));
        }
        if let Some(bad) = self.private_use.iter().find(|p| !is_private_use_subtag(p)) {
            return Err(WsError::InvalidTag(format!(
                "'{}' is not a valid private use subtag",
                bad
            )));
        }

        let has_audio_marker = self.has_private_use(AUDIO_PRIVATE_USE);
        if has_audio_marker && self.script != AUDIO_SCRIPT {
            return Err(WsError::InvalidTag(format!(
                "The script subtag must be set to {} when the variant tag indicates an audio writing system.",
                AUDIO_SCRIPT
            )));
        }
        let has_ipa_marker = self.has_variant(IPA_VARIANT)
            || self.has_private_use(IPA_PHONEMIC_PRIVATE_USE)
            || self.has_private_use(IPA_PHONETIC_PRIVATE_USE);
        if has_audio_marker && has_ipa_marker {
            return Err(WsError::InvalidTag(
                "A writing system may not be marked as audio and ipa at the same time."
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn mutate(&mut self, change: impl FnOnce(&mut LanguageTag) -> Result<()>) -> Result<()> {
        let mut candidate = self.clone();
        change(&mut candidate)?;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn apply_language(&mut self, language: &str) -> Result<()> {
        if !language.is_empty() && !is_language_subtag(language) {
            return Err(WsError::InvalidTag(format!(
                "'{}' is not a valid language subtag",
                language
            )));
        }
        self.language = language.to_ascii_lowercase();
        Ok(())
    }

    fn apply_script(&mut self, script: &str) -> Result<()> {
        if !script.is_empty() && !is_script_subtag(script) {
            return Err(WsError::InvalidTag(format!(
                "'{}' is not a valid script subtag",
                script
            )));
        }
        self.script = title_case(script);
        Ok(())
    }

    fn apply_region(&mut self, region: &str) -> Result<()> {
        if !region.is_empty() && !is_region_subtag(region) {
            return Err(WsError::InvalidTag(format!(
                "'{}' is not a valid region subtag",
                region
            )));
        }
        self.region = region.to_ascii_uppercase();
        Ok(())
    }

    fn apply_variant(&mut self, variant: &str) -> Result<()> {
        let lower = variant.to_ascii_lowercase();
        if lower == "x" || lower.ends_with("-x") || lower.ends_with("-x-") || lower == "x-" {
            return Err(WsError::InvalidTag(
                "The variant may not end in '-x' or '-x-'".to_string(),
            ));
        }
        let (rfc_variant, private_use) = split_variant_and_private_use(variant);
        self.variants = variant_parts(&rfc_variant)?;
        self.private_use = private_use_parts(&private_use)?;
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.mutate(|t| t.apply_language(language))
    }

    pub fn set_script(&mut self, script: &str) -> Result<()> {
        self.mutate(|t| t.apply_script(script))
    }

    pub fn set_region(&mut self, region: &str) -> Result<()> {
        self.mutate(|t| t.apply_region(region))
    }

    /// Replace both variant and private-use subtags from the combined form
    pub fn set_variant(&mut self, variant: &str) -> Result<()> {
        self.mutate(|t| t.apply_variant(variant))
    }

    pub fn has_variant(&self, subtag: &str) -> bool {
        self.variants.iter().any(|v| v.eq_ignore_ascii_case(subtag))
    }

    pub fn add_variant(&mut self, subtag: &str) -> Result<()> {
        if self.has_variant(subtag) {
            return Ok(());
        }
        self.mutate(|t| {
            t.variants.extend(variant_parts(subtag)?);
            Ok(())
        })
    }

    pub fn remove_variant(&mut self, subtag: &str) -> Result<()> {
        self.mutate(|t| {
            t.variants.retain(|v| !v.eq_ignore_ascii_case(subtag));
            Ok(())
        })
    }

    /// Accepts `etic`, `x-etic` or `-x-etic`
    pub fn has_private_use(&self, subtag: &str) -> bool {
        let subtag = strip_private_use_prefix(subtag);
        self.private_use.iter().any(|p| p.eq_ignore_ascii_case(subtag))
    }

    pub fn add_private_use(&mut self, subtag: &str) -> Result<()> {
        let parts = private_use_parts(strip_private_use_prefix(subtag))?;
        self.mutate(|t| {
            for part in parts {
                if !t.private_use.contains(&part) {
                    t.private_use.push(part);
                }
            }
            Ok(())
        })
    }

    pub fn remove_private_use(&mut self, subtag: &str) -> Result<()> {
        let subtag = strip_private_use_prefix(subtag).to_string();
        self.mutate(|t| {
            t.private_use.retain(|p| !p.eq_ignore_ascii_case(&subtag));
            Ok(())
        })
    }

    /// First private-use subtag matching `pattern`
    pub fn find_private_use(&self, pattern: &Regex) -> Option<&str> {
        self.private_use
            .iter()
            .map(String::as_str)
            .find(|p| pattern.is_match(p))
    }

    pub fn is_audio(&self) -> bool {
        self.script == AUDIO_SCRIPT && self.has_private_use(AUDIO_PRIVATE_USE)
    }

    pub fn ipa_status(&self) -> IpaStatus {
        if !self.has_variant(IPA_VARIANT) {
            return IpaStatus::NotIpa;
        }
        if self.has_private_use(IPA_PHONEMIC_PRIVATE_USE) {
            IpaStatus::IpaPhonemic
        } else if self.has_private_use(IPA_PHONETIC_PRIVATE_USE) {
            IpaStatus::IpaPhonetic
        } else {
            IpaStatus::Ipa
        }
    }

    /// Replace any IPA markers with the ones for `status`. The audio marker is
    /// left alone, so this fails on an audio tag.
    pub fn set_ipa_status(&mut self, status: IpaStatus) -> Result<()> {
        if self.ipa_status() == status {
            return Ok(());
        }
        self.mutate(|t| {
            t.clear_ipa_markers();
            match status {
                IpaStatus::NotIpa => {}
                IpaStatus::Ipa => t.variants.push(IPA_VARIANT.to_string()),
                IpaStatus::IpaPhonemic => {
                    t.variants.push(IPA_VARIANT.to_string());
                    t.private_use.push(IPA_PHONEMIC_PRIVATE_USE.to_string());
                }
                IpaStatus::IpaPhonetic => {
                    t.variants.push(IPA_VARIANT.to_string());
                    t.private_use.push(IPA_PHONETIC_PRIVATE_USE.to_string());
                }
            }
            Ok(())
        })
    }

    fn clear_ipa_markers(&mut self) {
        self.variants.retain(|v| v != IPA_VARIANT);
        self.private_use
            .retain(|p| p != IPA_PHONEMIC_PRIVATE_USE && p != IPA_PHONETIC_PRIVATE_USE);
    }

    /// Mark or unmark the tag as an audio writing system
    pub fn set_audio(&mut self, audio: bool) -> Result<()> {
        if self.is_audio() == audio {
            return Ok(());
        }
        self.mutate(|t| {
            if audio {
                t.clear_ipa_markers();
                t.script = AUDIO_SCRIPT.to_string();
                if !t.private_use.iter().any(|p| p == AUDIO_PRIVATE_USE) {
                    t.private_use.push(AUDIO_PRIVATE_USE.to_string());
                }
            } else {
                t.script.clear();
                t.private_use.retain(|p| p != AUDIO_PRIVATE_USE);
            }
            Ok(())
        })
    }

    /// The `N` of a `duplN` private-use subtag, 0 when there is none
    pub fn duplicate_number(&self) -> u32 {
        self.find_private_use(duplicate_regex())
            .and_then(|tag| tag["dupl".len()..].parse().ok())
            .unwrap_or(0)
    }

    pub fn set_duplicate_number(&mut self, number: i64) -> Result<()> {
        if number < 0 {
            return Err(WsError::InvalidTag(
                "We can't have a negative number of duplicates.".to_string(),
            ));
        }
        self.mutate(|t| {
            t.private_use.retain(|p| !duplicate_regex().is_match(p));
            if number > 0 {
                t.private_use.push(format!("dupl{}", number));
            }
            Ok(())
        })
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

impl FromStr for LanguageTag {
    type Err = WsError;

    fn from_str(s: &str) -> Result<Self> {
        LanguageTag::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_tag() {
        let tag = LanguageTag::parse("en-Latn-US-fonipa-x-etic").unwrap();
        assert_eq!(tag.language(), "en");
        assert_eq!(tag.script(), "Latn");
        assert_eq!(tag.region(), "US");
        assert_eq!(tag.variants(), ["fonipa"]);
        assert_eq!(tag.private_use(), ["etic"]);
        assert_eq!(tag.variant(), "fonipa-x-etic");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let tag = LanguageTag::parse("EN-latn-us").unwrap();
        assert_eq!(tag.compose(), "en-Latn-US");
    }

    #[test]
    fn test_parse_pure_private_use() {
        let tag = LanguageTag::parse("x-kal").unwrap();
        assert_eq!(tag.language(), "");
        assert_eq!(tag.private_use(), ["kal"]);
        assert_eq!(tag.compose(), "x-kal");
    }

    #[test]
    fn test_parse_numeric_region_and_digit_variant() {
        let tag = LanguageTag::parse("es-419-1994").unwrap();
        assert_eq!(tag.region(), "419");
        assert_eq!(tag.variants(), ["1994"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(LanguageTag::parse("").is_err());
        assert!(LanguageTag::parse("en--US").is_err());
        assert!(LanguageTag::parse("e").is_err());
        assert!(LanguageTag::parse("en-x").is_err());
        assert!(LanguageTag::parse("en-a-foo").is_err());
        assert!(LanguageTag::parse("en-US-Latn").is_err());
        assert!(LanguageTag::parse("en-x-waytoolongsubtag").is_err());
    }

    #[test]
    fn test_round_trip_law() {
        let cases = [
            "en",
            "qaa-x-kal",
            "en-Zxxx-x-audio",
            "de-Latn-CH-1901-x-dupl2",
            "fr-fonipa-x-emic",
            "x-a-b-c",
            "tpi-PG",
        ];
        for text in cases {
            let tag = LanguageTag::parse(text).unwrap();
            assert_eq!(LanguageTag::parse(&tag.compose()).unwrap(), tag);
        }
    }

    #[test]
    fn test_round_trip_from_setters() {
        let mut tag = LanguageTag::default();
        tag.set_language("EN").unwrap();
        tag.set_script("cyrl").unwrap();
        tag.set_region("gb").unwrap();
        tag.set_variant("SCOTLAND-x-Foo").unwrap();
        assert_eq!(tag.compose(), "en-Cyrl-GB-scotland-x-foo");
        assert_eq!(LanguageTag::parse(&tag.compose()).unwrap(), tag);
    }

    #[test]
    fn test_default_is_unlisted_language() {
        assert_eq!(LanguageTag::default().compose(), "qaa");
    }

    #[test]
    fn test_split_variant_and_private_use() {
        assert_eq!(
            split_variant_and_private_use("fonipa-x-etic"),
            ("fonipa".to_string(), "etic".to_string())
        );
        assert_eq!(
            split_variant_and_private_use("x-audio"),
            (String::new(), "audio".to_string())
        );
        assert_eq!(
            split_variant_and_private_use("1901"),
            ("1901".to_string(), String::new())
        );
    }

    #[test]
    fn test_set_variant_rejects_trailing_separator() {
        let mut tag = LanguageTag::parse("en").unwrap();
        assert!(tag.set_variant("fonipa-x").is_err());
        assert!(tag.set_variant("fonipa-x-").is_err());
        assert_eq!(tag.compose(), "en");
    }

    #[test]
    fn test_audio_marker_requires_audio_script() {
        let mut tag = LanguageTag::parse("en").unwrap();
        let err = tag.add_private_use("audio").unwrap_err();
        assert!(err.to_string().contains("Zxxx"));
        assert_eq!(tag.compose(), "en");
    }

    #[test]
    fn test_set_audio_forces_script_and_clears_ipa() {
        let mut tag = LanguageTag::parse("en-fonipa-x-etic").unwrap();
        tag.set_audio(true).unwrap();
        assert_eq!(tag.compose(), "en-Zxxx-x-audio");
        assert!(tag.is_audio());
        assert_eq!(tag.ipa_status(), IpaStatus::NotIpa);

        tag.set_audio(false).unwrap();
        assert_eq!(tag.compose(), "en");
    }

    #[test]
    fn test_ipa_on_audio_tag_fails() {
        let mut tag = LanguageTag::parse("en-Zxxx-x-audio").unwrap();
        let err = tag.set_ipa_status(IpaStatus::IpaPhonetic).unwrap_err();
        assert!(err.to_string().contains("audio and ipa"));
        assert_eq!(tag.compose(), "en-Zxxx-x-audio");
    }

    #[test]
    fn test_audio_marker_on_ipa_tag_fails() {
        let mut tag = LanguageTag::parse("en-Zxxx-fonipa").unwrap();
        assert!(tag.add_private_use("x-audio").is_err());
        assert!(tag.set_variant("fonipa-x-audio").is_err());
        assert_eq!(tag.compose(), "en-Zxxx-fonipa");
    }

    #[test]
    fn test_set_ipa_status_replaces_markers() {
        let mut tag = LanguageTag::parse("en").unwrap();
        tag.set_ipa_status(IpaStatus::IpaPhonemic).unwrap();
        assert_eq!(tag.compose(), "en-fonipa-x-emic");
        tag.set_ipa_status(IpaStatus::IpaPhonetic).unwrap();
        assert_eq!(tag.compose(), "en-fonipa-x-etic");
        tag.set_ipa_status(IpaStatus::Ipa).unwrap();
        assert_eq!(tag.compose(), "en-fonipa");
        tag.set_ipa_status(IpaStatus::NotIpa).unwrap();
        assert_eq!(tag.compose(), "en");
    }

    #[test]
    fn test_duplicate_number() {
        let mut tag = LanguageTag::parse("en-x-kal").unwrap();
        assert_eq!(tag.duplicate_number(), 0);
        tag.set_duplicate_number(3).unwrap();
        assert_eq!(tag.compose(), "en-x-kal-dupl3");
        assert_eq!(tag.duplicate_number(), 3);
        tag.set_duplicate_number(1).unwrap();
        assert_eq!(tag.compose(), "en-x-kal-dupl1");
        tag.set_duplicate_number(0).unwrap();
        assert_eq!(tag.compose(), "en-x-kal");
        assert!(tag.set_duplicate_number(-1).is_err());
    }

    #[test]
    fn test_duplicate_number_must_fit_a_subtag() {
        let mut tag = LanguageTag::parse("en").unwrap();
        tag.set_duplicate_number(9999).unwrap();
        assert_eq!(LanguageTag::parse(&tag.compose()).unwrap(), tag);

        let err = tag.set_duplicate_number(100000).unwrap_err();
        assert!(err.to_string().contains("'dupl100000' is not a valid private use subtag"));
        assert_eq!(tag.compose(), "en-x-dupl9999");
    }

    #[test]
    fn test_add_and_remove_variant() {
        let mut tag = LanguageTag::parse("de-x-kal").unwrap();
        tag.add_variant("1901").unwrap();
        tag.add_variant("1901").unwrap();
        assert_eq!(tag.compose(), "de-1901-x-kal");

        tag.add_variant("fonipa").unwrap();
        assert_eq!(tag.variants(), ["1901", "fonipa"]);
        assert!(tag.add_variant("ab").is_err());

        tag.remove_variant("1901").unwrap();
        assert_eq!(tag.compose(), "de-fonipa-x-kal");
        tag.remove_variant("1901").unwrap();
        assert_eq!(tag.compose(), "de-fonipa-x-kal");
    }

    #[test]
    fn test_find_private_use() {
        let tag = LanguageTag::parse("en-x-foo-dupl12").unwrap();
        assert_eq!(tag.find_private_use(duplicate_regex()), Some("dupl12"));
    }

    #[test]
    fn test_flex_conversion_pure_private_use() {
        let tag = LanguageTag::from_flex_private_use("x-kal", "", "", "").unwrap();
        assert_eq!(tag.compose(), "x-kal");
    }

    #[test]
    fn test_flex_conversion_with_script_and_variant() {
        let tag =
            LanguageTag::from_flex_private_use("x-kal", "Latn", "US", "1901-x-foo").unwrap();
        assert_eq!(tag.language(), UNLISTED_LANGUAGE);
        assert_eq!(tag.script(), "Latn");
        assert_eq!(tag.region(), "US");
        assert_eq!(tag.variants(), ["1901"]);
        assert_eq!(tag.private_use(), ["kal", "foo"]);
        assert_eq!(tag.compose(), "qaa-Latn-US-1901-x-kal-foo");
    }

    #[test]
    fn test_flex_detection() {
        assert!(is_flex_private_use("x-kal"));
        assert!(is_flex_private_use("X-KAL"));
        assert!(!is_flex_private_use("xh"));
        assert!(!is_flex_private_use("en"));
    }

    #[test]
    fn test_ipa_status_from_str() {
        assert_eq!(IpaStatus::from_str("phonemic").unwrap(), IpaStatus::IpaPhonemic);
        assert_eq!(IpaStatus::from_str("NONE").unwrap(), IpaStatus::NotIpa);
        assert!(IpaStatus::from_str("maybe").is_err());
    }
}
