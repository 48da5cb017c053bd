//! Sort-rule dialects, validation and lazily built comparators

pub mod collator;
pub mod icu_rules;
pub mod simple_rules;

pub use collator::{BuiltinLocales, Collator, LocaleCollatorProvider};
pub use icu_rules::IcuRules;
pub use simple_rules::SimpleRules;

use crate::error::{Result, WsError};
use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

/// How the rule text of a [`CollationSetting`] is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortRulesType {
    /// Default Unicode ordering; takes no rules
    #[default]
    DefaultOrdering,
    /// Shoebox-style rules, see [`simple_rules`]
    CustomSimple,
    /// Raw ICU rule text
    CustomICU,
    /// Rule text is the locale identifier of the language to sort like
    OtherLanguage,
}

impl SortRulesType {
    /// Name stored in the LDML `sortRulesType` field
    pub fn as_str(&self) -> &'static str {
        match self {
            SortRulesType::DefaultOrdering => "DefaultOrdering",
            SortRulesType::CustomSimple => "CustomSimple",
            SortRulesType::CustomICU => "CustomICU",
            SortRulesType::OtherLanguage => "OtherLanguage",
        }
    }
}

impl fmt::Display for SortRulesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortRulesType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "defaultordering" | "default" => Ok(SortRulesType::DefaultOrdering),
            "customsimple" | "simple" => Ok(SortRulesType::CustomSimple),
            "customicu" | "icu" => Ok(SortRulesType::CustomICU),
            "otherlanguage" | "other" => Ok(SortRulesType::OtherLanguage),
            _ => Err(format!(
                "Invalid sort rules type: '{}'. Valid values are: DefaultOrdering, CustomSimple, CustomICU, OtherLanguage",
                s
            )),
        }
    }
}

/// Check `rules` under `sort_using`, resolving locales through `locales`
pub fn validate_rules_with(
    sort_using: SortRulesType,
    rules: &str,
    locales: &dyn LocaleCollatorProvider,
) -> Result<()> {
    match sort_using {
        SortRulesType::DefaultOrdering => {
            if rules.is_empty() {
                Ok(())
            } else {
                Err(WsError::InvalidRules(
                    "Default ordering does not use sort rules".to_string(),
                ))
            }
        }
        SortRulesType::CustomSimple => simple_rules::validate(rules),
        SortRulesType::CustomICU => icu_rules::validate(rules),
        SortRulesType::OtherLanguage => locales.collator_for(rules).map(|_| ()).map_err(|e| {
            WsError::InvalidRules(format!("Error while validating sorting rules: {}", e))
        }),
    }
}

pub fn validate_rules(sort_using: SortRulesType, rules: &str) -> Result<()> {
    validate_rules_with(sort_using, rules, &BuiltinLocales)
}

fn build_collator(sort_using: SortRulesType, rules: &str) -> Result<Collator> {
    match sort_using {
        SortRulesType::DefaultOrdering => Ok(Collator::root()),
        SortRulesType::CustomSimple => Ok(Collator::from_icu(&SimpleRules::parse(rules)?.to_icu())),
        SortRulesType::CustomICU => Ok(Collator::from_icu(&IcuRules::parse(rules)?)),
        SortRulesType::OtherLanguage => BuiltinLocales.collator_for(rules).map_err(|e| {
            WsError::InvalidRules(format!("Error while validating sorting rules: {}", e))
        }),
    }
}

/// Rule dialect plus rule text, with a comparator built on first use
#[derive(Debug, Default)]
pub struct CollationSetting {
    sort_using: SortRulesType,
    rules: String,
    collator: OnceCell<Collator>,
}

impl Clone for CollationSetting {
    fn clone(&self) -> Self {
        CollationSetting::new(self.sort_using, &self.rules)
    }
}

impl PartialEq for CollationSetting {
    fn eq(&self, other: &Self) -> bool {
        self.sort_using == other.sort_using && self.rules == other.rules
    }
}

impl Eq for CollationSetting {}

impl CollationSetting {
    pub fn new(sort_using: SortRulesType, rules: &str) -> Self {
        CollationSetting {
            sort_using,
            rules: rules.to_string(),
            collator: OnceCell::new(),
        }
    }

    pub fn sort_using(&self) -> SortRulesType {
        self.sort_using
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }

    /// Returns true when the dialect changed
    pub fn set_sort_using(&mut self, sort_using: SortRulesType) -> bool {
        if self.sort_using == sort_using {
            return false;
        }
        self.sort_using = sort_using;
        self.collator.take();
        true
    }

    /// Returns true when the text changed
    pub fn set_rules(&mut self, rules: &str) -> bool {
        if self.rules == rules {
            return false;
        }
        self.rules = rules.to_string();
        self.collator.take();
        true
    }

    pub fn validate(&self) -> Result<()> {
        validate_rules(self.sort_using, &self.rules)
    }

    pub fn collator(&self) -> Result<&Collator> {
        if let Some(collator) = self.collator.get() {
            return Ok(collator);
        }
        let built = build_collator(self.sort_using, &self.rules)?;
        Ok(self.collator.get_or_init(|| built))
    }

    pub fn is_collator_cached(&self) -> bool {
        self.collator.get().is_some()
    }
}
