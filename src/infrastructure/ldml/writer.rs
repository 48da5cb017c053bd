//! [`WritingSystemDefinition`] → LDML, merged over an optional prior document
//!
//! The write is a single forward pass over the prior document. Each owned
//! region (identity, layout, collations, our metadata block) has a phase;
//! between phases, prior content that sorts before the next region is copied
//! through untouched.

use super::cursor::{XmlCursor, XmlOut};
use super::names::*;
use super::rules_xml::write_icu_rules;
use super::SCHEMA_VERSION;
use crate::domain::collation::{IcuRules, SimpleRules, SortRulesType};
use crate::domain::WritingSystemDefinition;
use crate::error::{Result, WsError};
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use std::io::Write;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WritePhase {
    BeforeIdentity,
    Identity,
    BeforeLayout,
    Layout,
    BeforeCollations,
    Collations,
    BeforeSpecial,
    OwnedSpecial,
    TrailingCopy,
    Done,
}

impl WritePhase {
    fn next(self) -> Self {
        match self {
            WritePhase::BeforeIdentity => WritePhase::Identity,
            WritePhase::Identity => WritePhase::BeforeLayout,
            WritePhase::BeforeLayout => WritePhase::Layout,
            WritePhase::Layout => WritePhase::BeforeCollations,
            WritePhase::BeforeCollations => WritePhase::Collations,
            WritePhase::Collations => WritePhase::BeforeSpecial,
            WritePhase::BeforeSpecial => WritePhase::OwnedSpecial,
            WritePhase::OwnedSpecial => WritePhase::TrailingCopy,
            WritePhase::TrailingCopy | WritePhase::Done => WritePhase::Done,
        }
    }
}

/// Serialize `ws` into `out`. Content of `prior` that the definition does
/// not own is carried over.
pub fn write_definition<W: Write>(
    out: W,
    ws: &WritingSystemDefinition,
    prior: Option<&str>,
) -> Result<W> {
    let source = match prior {
        Some(xml) => {
            let mut cursor = XmlCursor::parse(xml)?;
            if cursor.move_to_root().as_deref() != Some("ldml") {
                return Err(WsError::Structural(
                    "Unable to merge into existing document: Missing <ldml> tag.".to_string(),
                ));
            }
            Some(cursor)
        }
        None => None,
    };
    LdmlWriter {
        out: XmlOut::new(out),
        source,
        ws,
    }
    .run()
}

struct LdmlWriter<'a, W: Write> {
    out: XmlOut<W>,
    source: Option<XmlCursor>,
    ws: &'a WritingSystemDefinition,
}

impl<W: Write> LdmlWriter<'_, W> {
    fn run(mut self) -> Result<W> {
        self.out
            .write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        let root = match self.source.as_mut() {
            Some(source) => {
                let root = source.element().cloned().unwrap_or_else(|| BytesStart::new("ldml"));
                if !source.enter() {
                    // an empty prior root has nothing left to merge
                    self.source = None;
                }
                root
            }
            None => BytesStart::new("ldml"),
        };
        self.out.write(Event::Start(root))?;

        let mut phase = WritePhase::BeforeIdentity;
        while phase != WritePhase::Done {
            trace!(?phase, "ldml write");
            match phase {
                WritePhase::BeforeIdentity => self.copy_until("identity")?,
                WritePhase::Identity => self.write_identity()?,
                WritePhase::BeforeLayout => self.copy_until("layout")?,
                WritePhase::Layout => self.write_layout()?,
                WritePhase::BeforeCollations => self.copy_until("collations")?,
                WritePhase::Collations => self.write_collations()?,
                WritePhase::BeforeSpecial => self.copy_until("special")?,
                WritePhase::OwnedSpecial => self.write_metadata()?,
                WritePhase::TrailingCopy => {
                    if let Some(source) = self.source.as_mut() {
                        copy_other_specials(source, &mut self.out)?;
                        while !source.at_end() {
                            source.copy_node(&mut self.out)?;
                        }
                    }
                }
                WritePhase::Done => {}
            }
            phase = phase.next();
        }

        self.out.end("ldml")?;
        self.out.write(Event::Text(BytesText::new("\n")))?;
        Ok(self.out.into_inner())
    }

    fn copy_until(&mut self, anchor: &str) -> Result<()> {
        match self.source.as_mut() {
            Some(source) => source.copy_until(&mut self.out, anchor),
            None => Ok(()),
        }
    }

    /// The prior document's cursor, if it sits on element `name`
    fn source_at(&mut self, name: &str) -> Option<&mut XmlCursor> {
        self.source.as_mut().filter(|s| s.is_at(name))
    }

    fn write_identity(&mut self) -> Result<()> {
        let ws = self.ws;
        let out = &mut self.out;
        out.start("identity", &[])?;
        out.text_element(
            "version",
            &[("number", ws.version_number())],
            ws.version_description(),
        )?;
        let date = ws.date_modified().format("%Y-%m-%dT%H:%M:%S").to_string();
        out.empty("generation", &[("date", date.as_str())])?;
        let variant = ws.variant();
        for (name, value) in [
            ("language", ws.language()),
            ("script", ws.script()),
            ("territory", ws.region()),
            ("variant", variant.as_str()),
        ] {
            if !value.is_empty() {
                out.empty(name, &[("type", value)])?;
            }
        }

        if let Some(source) = self.source.as_mut().filter(|s| s.is_at("identity")) {
            if source.enter() {
                source.find_element("special");
                source.copy_to_end(&mut self.out)?;
            }
        }
        self.out.end("identity")
    }

    fn write_layout(&mut self) -> Result<()> {
        self.out.open_lazy(BytesStart::new("layout"));
        if self.ws.right_to_left() {
            self.out
                .empty("orientation", &[("characters", "right-to-left")])?;
        }
        if let Some(source) = self.source.as_mut().filter(|s| s.is_at("layout")) {
            if source.enter() {
                // our orientation replaces the prior one
                if source.find_element("orientation") {
                    source.skip_node();
                }
                source.copy_to_end(&mut self.out)?;
            }
        }
        self.out.close_lazy("layout")?;
        Ok(())
    }

    fn write_collations(&mut self) -> Result<()> {
        self.out.open_lazy(BytesStart::new("collations"));
        let mut entered = false;
        if let Some(source) = self.source_at("collations") {
            if source.enter() {
                if source.find_element("alias") {
                    source.skip_node();
                }
                entered = true;
            }
        }

        if entered {
            if let Some(source) = self.source.as_mut() {
                source.copy_until(&mut self.out, "collation")?;
                while source.is_at("collation")
                    && !is_standard_collation(source.attribute("type")?.as_deref())
                {
                    source.copy_node(&mut self.out)?;
                }
            }
        }

        let prior = if entered {
            self.source
                .as_mut()
                .filter(|s| s.is_at("collation"))
                .and_then(|s| if s.enter() { Some(s) } else { None })
        } else {
            None
        };
        write_collation(&mut self.out, self.ws, prior)?;

        if entered {
            if let Some(source) = self.source.as_mut() {
                source.copy_to_end(&mut self.out)?;
            }
        }
        self.out.close_lazy("collations")?;
        Ok(())
    }

    fn write_metadata(&mut self) -> Result<()> {
        let ws = self.ws;
        let out = &mut self.out;
        let xmlns = format!("xmlns:{}", PALASO_PREFIX);
        out.start("special", &[(xmlns.as_str(), PALASO_NS)])?;

        let font_size = if ws.default_font_size() != 0.0 {
            ws.default_font_size().to_string()
        } else {
            String::new()
        };
        let legacy = if ws.is_legacy_encoded() { "true" } else { "" };
        let language_name = ws.language_name();
        let spell_checking_id = if ws.spell_checking_id() != ws.language() {
            ws.spell_checking_id()
        } else {
            ""
        };
        let version = SCHEMA_VERSION.to_string();

        for (field, value) in [
            (ABBREVIATION, ws.abbreviation()),
            (DEFAULT_FONT_FAMILY, ws.default_font_name()),
            (DEFAULT_FONT_SIZE, font_size.as_str()),
            (DEFAULT_KEYBOARD, ws.keyboard()),
            (IS_LEGACY_ENCODED, legacy),
            (LANGUAGE_NAME, language_name.as_str()),
            (SPELL_CHECKING_ID, spell_checking_id),
            (VERSION, version.as_str()),
        ] {
            write_field(out, field, value)?;
        }
        out.end("special")?;

        // a prior metadata block sitting here is replaced by ours
        if let Some(source) = self.source.as_mut() {
            if source.is_at("special") && source.palaso_prefix()?.is_some() {
                source.skip_node();
            }
        }
        Ok(())
    }
}

fn write_field<W: Write>(out: &mut XmlOut<W>, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    out.empty(&format!("{}:{}", PALASO_PREFIX, field), &[("value", value)])
}

/// Copy sibling `special` blocks except our own, plus any non-element nodes
/// between them
fn copy_other_specials<W: Write>(source: &mut XmlCursor, out: &mut XmlOut<W>) -> Result<()> {
    while !source.at_end() {
        match source.element_name() {
            Some(name) if name == "special" => {
                if source.palaso_prefix()?.is_some() {
                    source.skip_node();
                } else {
                    source.copy_node(out)?;
                }
            }
            Some(_) => break,
            None => source.copy_node(out)?,
        }
    }
    Ok(())
}

/// Write the standard `collation`. `prior` is positioned inside the prior
/// standard collation, if there was one.
fn write_collation<W: Write>(
    out: &mut XmlOut<W>,
    ws: &WritingSystemDefinition,
    mut prior: Option<&mut XmlCursor>,
) -> Result<()> {
    let sort_using = ws.sort_using();
    if sort_using == SortRulesType::DefaultOrdering {
        // keep whatever foreign content the prior collation had
        if let Some(source) = prior {
            out.open_lazy(BytesStart::new("collation"));
            source.find_element("special");
            copy_other_specials(source, out)?;
            source.copy_to_end(out)?;
            out.close_lazy("collation")?;
        }
        return Ok(());
    }

    out.start("collation", &[])?;
    match sort_using {
        SortRulesType::OtherLanguage => {
            out.start("base", &[])?;
            out.empty("alias", &[("source", ws.sort_rules())])?;
            out.end("base")?;
        }
        SortRulesType::CustomSimple => match SimpleRules::parse(ws.sort_rules()) {
            Ok(simple) => write_rules(out, prior.as_deref_mut(), &simple.to_icu())?,
            Err(e) => warn!(id = %ws.rfc5646(), "not writing invalid simple sort rules: {}", e),
        },
        SortRulesType::CustomICU => match IcuRules::parse(ws.sort_rules()) {
            Ok(rules) => write_rules(out, prior.as_deref_mut(), &rules)?,
            Err(e) => warn!(id = %ws.rfc5646(), "not writing invalid ICU sort rules: {}", e),
        },
        SortRulesType::DefaultOrdering => {}
    }

    let xmlns = format!("xmlns:{}", PALASO_PREFIX);
    out.start("special", &[(xmlns.as_str(), PALASO_NS)])?;
    write_field(out, SORT_RULES_TYPE, sort_using.as_str())?;
    out.end("special")?;

    if let Some(source) = prior {
        source.find_element("special");
        copy_other_specials(source, out)?;
        source.copy_to_end(out)?;
    }
    out.end("collation")
}

fn write_rules<W: Write>(
    out: &mut XmlOut<W>,
    prior: Option<&mut XmlCursor>,
    rules: &IcuRules,
) -> Result<()> {
    if let Some(source) = prior {
        if source.find_element("alias") {
            source.skip_node();
        }
        source.copy_until(out, "settings")?;
    }
    write_icu_rules(out, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn write(ws: &WritingSystemDefinition, prior: Option<&str>) -> String {
        String::from_utf8(write_definition(Vec::new(), ws, prior).unwrap()).unwrap()
    }

    fn english() -> WritingSystemDefinition {
        let mut ws = WritingSystemDefinition::new();
        ws.set_all_components("en", "Latn", "US", "").unwrap();
        ws
    }

    #[test]
    fn test_fresh_document_layout() {
        let xml = write(&english(), None);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ldml>"));
        assert!(xml.contains("<language type=\"en\"/>"));
        assert!(xml.contains("<script type=\"Latn\"/>"));
        assert!(xml.contains("<territory type=\"US\"/>"));
        assert!(!xml.contains("<variant"));
        assert!(!xml.contains("<layout"));
        assert!(!xml.contains("<collations"));
        assert!(xml.contains("<palaso:version value=\"2\"/>"));
        assert!(xml.ends_with("</ldml>\n"));
    }

    #[test]
    fn test_metadata_fields_in_order() {
        let mut ws = english();
        ws.set_abbreviation("eng");
        ws.set_default_font_name("Charis SIL");
        ws.set_default_font_size(12.0).unwrap();
        ws.set_legacy_encoded(true);
        let xml = write(&ws, None);
        let abbreviation = xml.find("palaso:abbreviation").unwrap();
        let font = xml.find("palaso:defaultFontFamily").unwrap();
        let size = xml.find("palaso:defaultFontSize value=\"12\"").unwrap();
        let legacy = xml.find("palaso:isLegacyEncoded value=\"true\"").unwrap();
        let version = xml.find("palaso:version").unwrap();
        assert!(abbreviation < font && font < size && size < legacy && legacy < version);
        assert!(!xml.contains("spellCheckingId"));
    }

    #[test]
    fn test_right_to_left_layout() {
        let mut ws = english();
        ws.set_right_to_left(true);
        let xml = write(&ws, None);
        assert!(xml.contains("<layout>\n\t\t<orientation characters=\"right-to-left\"/>\n\t</layout>"));
    }

    #[test]
    fn test_unknown_content_is_preserved() {
        let prior = "<ldml><identity><language type=\"en\"/>\
            <special><fw:id value=\"1\"/></special></identity>\
            <dates><calendar type=\"gregorian\"/></dates>\
            <special xmlns:palaso=\"urn://palaso.org/ldmlExtensions/v1\"><palaso:version value=\"2\"/></special>\
            <special xmlns:fw=\"urn://fieldworks.sil.org/ldmlExtensions/v1\"><fw:graphite value=\"on\"/></special>\
            </ldml>";
        let xml = write(&english(), Some(prior));
        assert!(xml.contains("<fw:id value=\"1\"/>"));
        assert!(xml.contains("<calendar type=\"gregorian\"/>"));
        assert!(xml.contains("<fw:graphite value=\"on\"/>"));
        assert_eq!(xml.matches("palaso:version").count(), 1);
        let dates = xml.find("<dates>").unwrap();
        let ours = xml.find("xmlns:palaso").unwrap();
        let theirs = xml.find("xmlns:fw").unwrap();
        assert!(dates < ours && ours < theirs);
    }

    #[test]
    fn test_prior_orientation_is_replaced() {
        let prior = "<ldml><layout><orientation characters=\"right-to-left\"/><inList casing=\"titlecase\"/></layout></ldml>";
        let xml = write(&english(), Some(prior));
        assert!(!xml.contains("right-to-left"));
        assert!(xml.contains("<inList casing=\"titlecase\"/>"));
    }

    #[test]
    fn test_simple_rules_written_as_icu() {
        let mut ws = english();
        ws.set_sort_using(SortRulesType::CustomSimple);
        ws.set_sort_rules("b B\na A");
        let xml = write(&ws, None);
        assert!(xml.contains("<reset before=\"primary\">a</reset>"));
        assert!(xml.contains("<p>b</p>"));
        assert!(xml.contains("<palaso:sortRulesType value=\"CustomSimple\"/>"));
    }

    #[test]
    fn test_other_language_written_as_alias() {
        let mut ws = english();
        ws.set_sort_using(SortRulesType::OtherLanguage);
        ws.set_sort_rules("fr");
        let xml = write(&ws, None);
        assert!(xml.contains("<alias source=\"fr\"/>"));
        assert!(!xml.contains("<rules"));
    }

    #[traced_test]
    #[test]
    fn test_invalid_icu_rules_are_skipped() {
        let mut ws = english();
        ws.set_sort_using(SortRulesType::CustomICU);
        ws.set_sort_rules("&a < ");
        let xml = write(&ws, None);
        assert!(!xml.contains("<rules"));
        assert!(xml.contains("<palaso:sortRulesType value=\"CustomICU\"/>"));
        assert!(logs_contain("not writing invalid ICU sort rules"));
    }

    #[test]
    fn test_default_ordering_keeps_foreign_collation_content() {
        let prior = "<ldml><collations><collation type=\"phonebook\"><rules/></collation>\
            <collation><rules><reset>a</reset><p>b</p></rules>\
            <special xmlns:palaso=\"urn://palaso.org/ldmlExtensions/v1\"><palaso:sortRulesType value=\"CustomICU\"/></special>\
            <special xmlns:fw=\"urn://fieldworks.sil.org/ldmlExtensions/v1\"><fw:x value=\"1\"/></special>\
            </collation></collations></ldml>";
        let xml = write(&english(), Some(prior));
        assert!(xml.contains("<collation type=\"phonebook\">"));
        assert!(xml.contains("<fw:x value=\"1\"/>"));
        assert!(!xml.contains("<p>b</p>"));
        assert!(!xml.contains("sortRulesType"));
    }

    #[test]
    fn test_default_ordering_with_nothing_to_keep_omits_collations() {
        let prior = "<ldml><collations><collation><rules><reset>a</reset><p>b</p></rules></collation></collations></ldml>";
        let xml = write(&english(), Some(prior));
        assert!(!xml.contains("<collation"));
    }

    #[test]
    fn test_prior_without_root_fails() {
        let err = write_definition(Vec::new(), &english(), Some("<other/>")).unwrap_err();
        assert!(err.is_structural());
    }
}
