//! String comparison for the four sort dialects
//!
//! Untailored characters get weights derived from their code points, with
//! case as a tertiary difference. Tailored elements are weighted relative to
//! their reset: each relation steps the weight at its own level, so `&a < b`
//! places `b` after `a` and before whatever followed `a`.

use super::icu_rules::{CaseFirst, IcuOption, IcuRules, ResetTarget, SpecialAnchor, Strength};
use crate::domain::subtags;
use std::cmp::Ordering;
use std::collections::HashMap;

const PRIMARY_SPACING: u64 = 1 << 20;
const LEVEL_BASE: u32 = 1 << 16;
const UPPER_CASE_STEP: u32 = 1 << 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Weight {
    primary: u64,
    secondary: u32,
    tertiary: u32,
}

impl Weight {
    fn new(primary: u64) -> Self {
        Weight {
            primary,
            secondary: LEVEL_BASE,
            tertiary: LEVEL_BASE,
        }
    }

    fn step(self, strength: Strength) -> Self {
        match strength {
            Strength::Primary => Weight::new(self.primary + 1),
            Strength::Secondary => Weight {
                secondary: self.secondary + 1,
                tertiary: LEVEL_BASE,
                ..self
            },
            Strength::Tertiary | Strength::Quaternary => Weight {
                tertiary: self.tertiary + 1,
                ..self
            },
            Strength::Identical => self,
        }
    }

    fn before(self, strength: Strength) -> Self {
        match strength {
            Strength::Primary => Weight::new(self.primary.saturating_sub(PRIMARY_SPACING / 2)),
            Strength::Secondary => Weight {
                secondary: self.secondary.saturating_sub(LEVEL_BASE / 2),
                tertiary: LEVEL_BASE,
                ..self
            },
            _ => Weight {
                tertiary: self.tertiary.saturating_sub(UPPER_CASE_STEP / 2),
                ..self
            },
        }
    }
}

fn anchor_weight(anchor: SpecialAnchor) -> Weight {
    match anchor {
        SpecialAnchor::FirstTertiaryIgnorable
        | SpecialAnchor::LastTertiaryIgnorable
        | SpecialAnchor::FirstSecondaryIgnorable
        | SpecialAnchor::LastSecondaryIgnorable
        | SpecialAnchor::FirstPrimaryIgnorable
        | SpecialAnchor::LastPrimaryIgnorable => Weight::new(0),
        SpecialAnchor::FirstVariable | SpecialAnchor::LastVariable => {
            Weight::new(PRIMARY_SPACING / 4)
        }
        SpecialAnchor::FirstRegular => Weight::new(PRIMARY_SPACING / 2),
        SpecialAnchor::LastRegular => Weight::new(u64::MAX / 4),
        SpecialAnchor::FirstTrailing | SpecialAnchor::LastTrailing => Weight::new(u64::MAX / 2),
    }
}

/// Compares strings under one sort configuration
#[derive(Debug, Clone)]
pub struct Collator {
    tailoring: HashMap<String, Weight>,
    longest_element: usize,
    strength: Strength,
    upper_first: bool,
}

impl Default for Collator {
    fn default() -> Self {
        Collator::root()
    }
}

impl Collator {
    /// Default ordering without any tailoring
    pub fn root() -> Self {
        Collator {
            tailoring: HashMap::new(),
            longest_element: 1,
            strength: Strength::Tertiary,
            upper_first: false,
        }
    }

    pub fn from_icu(rules: &IcuRules) -> Self {
        let mut collator = Collator::root();
        for option in &rules.options {
            match option {
                IcuOption::Strength(strength) => collator.strength = *strength,
                IcuOption::CaseFirst(case_first) => {
                    collator.upper_first = *case_first == CaseFirst::Upper
                }
                _ => {}
            }
        }

        for chain in &rules.chains {
            let mut current = match &chain.reset.target {
                ResetTarget::Text(text) => collator
                    .elements(text)
                    .last()
                    .copied()
                    .unwrap_or_else(|| Weight::new(0)),
                ResetTarget::Anchor(anchor) => anchor_weight(*anchor),
            };
            if let Some(before) = chain.reset.before {
                current = current.before(before);
            }
            for relation in &chain.relations {
                for element in relation.elements() {
                    current = current.step(relation.strength);
                    collator.longest_element =
                        collator.longest_element.max(element.chars().count());
                    collator.tailoring.insert(element, current);
                }
            }
        }
        collator
    }

    fn base_weight(&self, c: char) -> Weight {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let mut weight = Weight::new((lower as u64 + 1) * PRIMARY_SPACING);
        let is_upper = lower != c;
        if is_upper != self.upper_first {
            weight.tertiary += UPPER_CASE_STEP;
        }
        weight
    }

    fn elements(&self, text: &str) -> Vec<Weight> {
        let chars: Vec<char> = text.chars().collect();
        let mut weights = Vec::with_capacity(chars.len());
        let mut i = 0;
        'outer: while i < chars.len() {
            let longest = self.longest_element.min(chars.len() - i);
            for len in (1..=longest).rev() {
                let candidate: String = chars[i..i + len].iter().collect();
                if let Some(weight) = self.tailoring.get(&candidate) {
                    weights.push(*weight);
                    i += len;
                    continue 'outer;
                }
            }
            weights.push(self.base_weight(chars[i]));
            i += 1;
        }
        weights
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let left = self.elements(a);
        let right = self.elements(b);

        let by_level = |level: fn(&Weight) -> u64| {
            left.iter()
                .map(level)
                .cmp(right.iter().map(level))
        };

        let mut ordering = by_level(|w| w.primary);
        if self.strength >= Strength::Secondary {
            ordering = ordering.then_with(|| by_level(|w| u64::from(w.secondary)));
        }
        if self.strength >= Strength::Tertiary {
            ordering = ordering.then_with(|| by_level(|w| u64::from(w.tertiary)));
        }
        if self.strength == Strength::Identical {
            ordering = ordering.then_with(|| a.cmp(b));
        }
        ordering
    }

    pub fn sort<S: AsRef<str>>(&self, words: &mut [S]) {
        words.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

/// Resolves "sort like another language" locale identifiers
pub trait LocaleCollatorProvider {
    fn collator_for(&self, locale: &str) -> Result<Collator, String>;
}

/// Accepts any locale whose language is in the language table and sorts it
/// with the default ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocales;

impl LocaleCollatorProvider for BuiltinLocales {
    fn collator_for(&self, locale: &str) -> Result<Collator, String> {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim();
        if language.is_empty() {
            return Err("No locale was given".to_string());
        }
        if subtags::find_language(language).is_none() {
            return Err(format!("'{}' is not a known locale", locale));
        }
        Ok(Collator::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(collator: &Collator, words: &[&str]) -> Vec<String> {
        let mut words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        collator.sort(&mut words);
        words
    }

    #[test]
    fn test_root_orders_case_after_letter() {
        let root = Collator::root();
        assert_eq!(sorted(&root, &["b", "A", "a", "B"]), ["a", "A", "b", "B"]);
        assert_eq!(root.compare("abc", "abd"), Ordering::Less);
        assert_eq!(root.compare("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_tailored_primary_order() {
        let rules = IcuRules::parse("&a < c < b").unwrap();
        let collator = Collator::from_icu(&rules);
        assert_eq!(sorted(&collator, &["b", "c", "a", "d"]), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_before_reset_sorts_ahead() {
        let rules = IcuRules::parse("&[before 1]a < z").unwrap();
        let collator = Collator::from_icu(&rules);
        assert_eq!(sorted(&collator, &["a", "z", "b"]), ["z", "a", "b"]);
    }

    #[test]
    fn test_contraction() {
        let rules = IcuRules::parse("&c < ch").unwrap();
        let collator = Collator::from_icu(&rules);
        assert_eq!(sorted(&collator, &["cz", "ch", "d"]), ["cz", "ch", "d"]);
    }

    #[test]
    fn test_strength_option_ignores_case() {
        let rules = IcuRules::parse("[strength 1]").unwrap();
        let collator = Collator::from_icu(&rules);
        assert_eq!(collator.compare("abc", "ABC"), Ordering::Equal);
    }

    #[test]
    fn test_upper_first() {
        let rules = IcuRules::parse("[caseFirst upper]").unwrap();
        let collator = Collator::from_icu(&rules);
        assert_eq!(collator.compare("A", "a"), Ordering::Less);
    }

    #[test]
    fn test_builtin_locales() {
        assert!(BuiltinLocales.collator_for("fr").is_ok());
        assert!(BuiltinLocales.collator_for("en_US").is_ok());
        let err = BuiltinLocales.collator_for("zz-ZZ").unwrap_err();
        assert!(err.contains("zz-ZZ"));
        assert!(BuiltinLocales.collator_for("").is_err());
    }
}
