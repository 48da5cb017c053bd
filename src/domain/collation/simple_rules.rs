//! Shoebox-style sort rules
//!
//! Each non-blank line is a sort group that sorts after the previous line.
//! Within a line, whitespace-separated elements are case variants of each
//! other in the order given. An element may be several characters (`ch`).
//! `\uXXXX` writes a character by code point and `\\` a backslash.

use super::icu_rules::{IcuRules, Relation, Reset, ResetTarget, RuleChain, Strength};
use crate::error::{Result, WsError};
use std::collections::HashSet;

/// The reset every converted rule set hangs from
const ANCHOR: &str = "a";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleRules {
    groups: Vec<Vec<String>>,
}

fn unescape(element: &str, line: usize) -> Result<String> {
    let mut out = String::new();
    let mut chars = element.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        WsError::InvalidRules(format!(
                            "Invalid escape '\\u{}' on line {}",
                            hex, line
                        ))
                    })?;
                out.push(decoded);
            }
            _ => {
                return Err(WsError::InvalidRules(format!(
                    "Invalid escape in '{}' on line {}",
                    element, line
                )))
            }
        }
    }
    Ok(out)
}

fn escape(element: &str) -> String {
    let mut out = String::new();
    for c in element.chars() {
        if c == '\\' {
            out.push_str("\\\\");
        } else if c.is_whitespace() || c.is_control() {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

impl SimpleRules {
    pub fn parse(text: &str) -> Result<Self> {
        let mut groups = Vec::new();
        let mut seen = HashSet::new();

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let mut group = Vec::new();
            for raw in line.split_whitespace() {
                let element = unescape(raw, line_number)?;
                if !seen.insert(element.clone()) {
                    return Err(WsError::InvalidRules(format!(
                        "The element '{}' appears more than once (line {})",
                        raw, line_number
                    )));
                }
                group.push(element);
            }
            if !group.is_empty() {
                groups.push(group);
            }
        }
        Ok(SimpleRules { groups })
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.iter().map(|e| escape(e)).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_icu(&self) -> IcuRules {
        if self.groups.is_empty() {
            return IcuRules::default();
        }
        let mut relations = Vec::new();
        for group in &self.groups {
            for (i, element) in group.iter().enumerate() {
                relations.push(Relation {
                    strength: if i == 0 {
                        Strength::Primary
                    } else {
                        Strength::Tertiary
                    },
                    text: element.clone(),
                    star: false,
                });
            }
        }
        IcuRules {
            options: Vec::new(),
            chains: vec![RuleChain {
                reset: Reset {
                    before: Some(Strength::Primary),
                    target: ResetTarget::Text(ANCHOR.to_string()),
                },
                relations,
            }],
        }
    }

    /// Recover simple rules from ICU rules produced by [`SimpleRules::to_icu`].
    /// Returns `None` for anything the simple syntax cannot express.
    pub fn from_icu(rules: &IcuRules) -> Option<Self> {
        if rules.is_empty() {
            return Some(SimpleRules::default());
        }
        if !rules.options.is_empty() || rules.chains.len() != 1 {
            return None;
        }
        let chain = &rules.chains[0];
        if chain.reset.before != Some(Strength::Primary)
            || chain.reset.target != ResetTarget::Text(ANCHOR.to_string())
        {
            return None;
        }

        let mut groups: Vec<Vec<String>> = Vec::new();
        for relation in &chain.relations {
            if relation.star {
                return None;
            }
            match relation.strength {
                Strength::Primary => groups.push(vec![relation.text.clone()]),
                Strength::Tertiary => groups.last_mut()?.push(relation.text.clone()),
                _ => return None,
            }
        }
        let rules = SimpleRules { groups };
        SimpleRules::parse(&rules.to_text()).ok()
    }
}

pub fn validate(text: &str) -> Result<()> {
    SimpleRules::parse(text).map(|_| ())
}

/// Convert simple rule text to ICU rule text
pub fn convert_to_icu(text: &str) -> Result<String> {
    Ok(SimpleRules::parse(text)?.to_icu().to_rule_text())
}
