//! ICU rules as LDML `settings` and `rules` elements, and the reverse

use super::cursor::{XmlCursor, XmlOut};
use super::names::SORT_RULES_TYPE;
use crate::domain::collation::icu_rules::{
    Alternate, CaseFirst, IcuOption, Relation, Reset, ResetTarget, RuleChain, SpecialAnchor,
    Strength,
};
use crate::domain::collation::IcuRules;
use crate::error::{Result, WsError};
use quick_xml::events::Event;
use std::io::Write;
use tracing::warn;

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn option_attribute(option: IcuOption) -> (&'static str, &'static str) {
    match option {
        IcuOption::Strength(s) => ("strength", s.ldml_name()),
        IcuOption::Alternate(Alternate::Shifted) => ("alternate", "shifted"),
        IcuOption::Alternate(Alternate::NonIgnorable) => ("alternate", "non-ignorable"),
        IcuOption::Backwards(v) => ("backwards", on_off(v)),
        IcuOption::CaseLevel(v) => ("caseLevel", on_off(v)),
        IcuOption::CaseFirst(CaseFirst::Upper) => ("caseFirst", "upper"),
        IcuOption::CaseFirst(CaseFirst::Lower) => ("caseFirst", "lower"),
        IcuOption::CaseFirst(CaseFirst::Off) => ("caseFirst", "off"),
        IcuOption::Normalization(v) => ("normalization", on_off(v)),
        IcuOption::HiraganaQ(v) => ("hiraganaQuaternary", on_off(v)),
        IcuOption::Numeric(v) => ("numeric", on_off(v)),
    }
}

fn option_from_attribute(key: &str, value: &str) -> Option<IcuOption> {
    let flag = match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    };
    match key {
        "strength" => Strength::from_ldml_name(value).map(IcuOption::Strength),
        "alternate" => match value {
            "shifted" => Some(IcuOption::Alternate(Alternate::Shifted)),
            "non-ignorable" => Some(IcuOption::Alternate(Alternate::NonIgnorable)),
            _ => None,
        },
        // ICU text can only express backwards on
        "backwards" => flag.filter(|on| *on).map(IcuOption::Backwards),
        "caseLevel" => flag.map(IcuOption::CaseLevel),
        "caseFirst" => match value {
            "upper" => Some(IcuOption::CaseFirst(CaseFirst::Upper)),
            "lower" => Some(IcuOption::CaseFirst(CaseFirst::Lower)),
            "off" => Some(IcuOption::CaseFirst(CaseFirst::Off)),
            _ => None,
        },
        "normalization" => flag.map(IcuOption::Normalization),
        "hiraganaQuaternary" => flag.map(IcuOption::HiraganaQ),
        "numeric" => flag.map(IcuOption::Numeric),
        _ => None,
    }
}

fn relation_element(relation: &Relation) -> String {
    let base = match relation.strength {
        Strength::Primary => "p",
        Strength::Secondary => "s",
        Strength::Tertiary => "t",
        Strength::Quaternary => "q",
        Strength::Identical => "i",
    };
    if relation.star {
        format!("{}c", base)
    } else {
        base.to_string()
    }
}

fn relation_from_element(name: &str) -> Option<(Strength, bool)> {
    let (base, star) = match name.strip_suffix('c') {
        Some(base) => (base, true),
        None => (name, false),
    };
    let strength = match base {
        "p" => Strength::Primary,
        "s" => Strength::Secondary,
        "t" => Strength::Tertiary,
        "q" => Strength::Quaternary,
        "i" => Strength::Identical,
        _ => return None,
    };
    Some((strength, star))
}

/// Write `<settings .../>` (when there are options) followed by `<rules>`
pub fn write_icu_rules<W: Write>(out: &mut XmlOut<W>, rules: &IcuRules) -> Result<()> {
    if !rules.options.is_empty() {
        let attrs: Vec<(&str, &str)> = rules.options.iter().map(|o| option_attribute(*o)).collect();
        out.empty("settings", &attrs)?;
    }
    if rules.chains.is_empty() {
        return out.empty("rules", &[]);
    }

    out.start("rules", &[])?;
    for chain in &rules.chains {
        let before = chain.reset.before.map(|s| ("before", s.ldml_name()));
        let attrs: Vec<(&str, &str)> = before.into_iter().collect();
        match &chain.reset.target {
            ResetTarget::Text(text) => out.text_element("reset", &attrs, text)?,
            ResetTarget::Anchor(anchor) => {
                out.start("reset", &attrs)?;
                out.empty(anchor.ldml_name(), &[])?;
                out.end("reset")?;
            }
        }
        for relation in &chain.relations {
            out.text_element(&relation_element(relation), &[], &relation.text)?;
        }
    }
    out.end("rules")
}

/// What a standard `collation` element holds
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollationContent {
    /// `source` of `<base><alias source="..."/></base>`
    pub alias_source: Option<String>,
    /// Options from `settings` plus the chains from `rules`
    pub rules: IcuRules,
    /// A `rules` element was present and understood
    pub has_rules: bool,
    /// `sortRulesType` from our metadata block
    pub sort_rules_type: Option<String>,
}

impl CollationContent {
    /// Parse the events of one `collation` element
    pub fn parse(events: Vec<Event<'static>>) -> Result<Self> {
        let mut cursor = XmlCursor::from_events(events);
        let mut content = CollationContent::default();
        if !cursor.enter() {
            return Ok(content);
        }
        while !cursor.at_end() {
            match cursor.element_name().as_deref() {
                Some("base") => {
                    if cursor.enter() {
                        while !cursor.at_end() {
                            if cursor.is_at("alias") {
                                content.alias_source = cursor.attribute("source")?;
                            }
                            cursor.skip_node();
                        }
                        cursor.next_event();
                    }
                }
                Some("settings") => {
                    if let Some(element) = cursor.element() {
                        for attr in element.attributes() {
                            let attr = attr?;
                            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                            let value = attr.unescape_value()?;
                            if let Some(option) = option_from_attribute(&key, &value) {
                                content.rules.options.push(option);
                            }
                        }
                    }
                    cursor.skip_node();
                }
                Some("rules") => match read_chains(&mut cursor) {
                    Ok(chains) => {
                        content.rules.chains = chains;
                        content.has_rules = true;
                    }
                    Err(e) => warn!("Ignoring collation rules that cannot be read: {}", e),
                },
                Some("special") => {
                    if let Some(prefix) = cursor.palaso_prefix()? {
                        let fields = cursor.special_fields(&prefix)?;
                        if let Some(value) = fields.get(SORT_RULES_TYPE) {
                            content.sort_rules_type = Some(value.clone());
                        }
                    } else {
                        cursor.skip_node();
                    }
                }
                _ => cursor.skip_node(),
            }
        }
        Ok(content)
    }
}

/// Read the chains of a `rules` element. The cursor always moves past it.
fn read_chains(cursor: &mut XmlCursor) -> Result<Vec<RuleChain>> {
    let mut node = XmlCursor::from_events(cursor.take_node());
    let mut chains: Vec<RuleChain> = Vec::new();
    if !node.enter() {
        return Ok(chains);
    }
    while !node.at_end() {
        let Some(name) = node.element_name() else {
            node.skip_node();
            continue;
        };
        if name == "reset" {
            let before = match node.attribute("before")? {
                Some(value) => Some(Strength::from_ldml_name(&value).ok_or_else(|| {
                    WsError::InvalidRules(format!("unknown reset strength '{}'", value))
                })?),
                None => None,
            };
            let (text, children) = node.read_mixed()?;
            let target = match children.first() {
                Some(anchor) => ResetTarget::Anchor(SpecialAnchor::from_ldml_name(anchor).ok_or_else(
                    || WsError::InvalidRules(format!("unknown reset position <{}>", anchor)),
                )?),
                None => ResetTarget::Text(text),
            };
            chains.push(RuleChain {
                reset: Reset { before, target },
                relations: Vec::new(),
            });
        } else if let Some((strength, star)) = relation_from_element(&name) {
            let text = node.read_text()?;
            let chain = chains.last_mut().ok_or_else(|| {
                WsError::InvalidRules(format!("<{}> appears before any <reset>", name))
            })?;
            chain.relations.push(Relation {
                strength,
                text,
                star,
            });
        } else {
            return Err(WsError::InvalidRules(format!(
                "unsupported rule element <{}>",
                name
            )));
        }
    }
    Ok(chains)
}
