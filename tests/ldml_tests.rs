//! Integration tests for the LDML codec through the library API

use wsdef::domain::{IpaStatus, LanguageTag, SortRulesType, WritingSystemDefinition};
use wsdef::infrastructure::ldml;
use wsdef::WsError;

mod common;
use common::PALASO_NS;

fn full_definition() -> WritingSystemDefinition {
    let mut ws = WritingSystemDefinition::from_tag(LanguageTag::parse("ar-Arab-EG").unwrap());
    ws.set_language_name("Egyptian Arabic");
    ws.set_abbreviation("arz");
    ws.set_default_font_name("Scheherazade");
    ws.set_default_font_size(16.0).unwrap();
    ws.set_keyboard("Arabic (101)");
    ws.set_right_to_left(true);
    ws.set_legacy_encoded(true);
    ws.set_spell_checking_id("ar_EG");
    ws.set_version_number("3");
    ws.set_version_description("Reviewed");
    ws.set_sort_using(SortRulesType::CustomICU);
    ws.set_sort_rules("&ب < پ");
    ws
}

#[test]
fn test_every_field_survives_a_write_and_read() {
    let ws = full_definition();
    let xml = ldml::write_to_string(&ws, None).unwrap();
    let back = ldml::read_definition(&xml).unwrap();

    assert_eq!(back.rfc5646(), "ar-Arab-EG");
    assert_eq!(back.language_name(), "Egyptian Arabic");
    assert_eq!(back.abbreviation(), "arz");
    assert_eq!(back.default_font_name(), "Scheherazade");
    assert_eq!(back.default_font_size(), 16.0);
    assert_eq!(back.keyboard(), "Arabic (101)");
    assert!(back.right_to_left());
    assert!(back.is_legacy_encoded());
    assert_eq!(back.spell_checking_id(), "ar_EG");
    assert_eq!(back.version_number(), "3");
    assert_eq!(back.version_description(), "Reviewed");
    assert_eq!(back.sort_using(), SortRulesType::CustomICU);
    assert_eq!(back.sort_rules(), "&ب < پ");
    assert!(!back.is_modified());
    assert_eq!(back.store_id(), None);
}

#[test]
fn test_written_document_layout() {
    let xml = ldml::write_to_string(&full_definition(), None).unwrap();

    let identity = xml.find("<identity>").unwrap();
    let layout = xml.find("<layout>").unwrap();
    let collations = xml.find("<collations>").unwrap();
    let metadata = xml.rfind("<special").unwrap();
    assert!(identity < layout && layout < collations && collations < metadata);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<orientation characters=\"right-to-left\"/>"));
    assert!(xml.contains("<palaso:isLegacyEncoded value=\"true\"/>"));
    assert!(xml.trim_end().ends_with("</ldml>"));
}

#[test]
fn test_unknown_content_survives_rewrite() {
    let prior = format!(
        "<ldml>\
         <identity><version number=\"1\"/><generation date=\"2011-01-01T00:00:00\"/><language type=\"en\"/>\
         <special xmlns:fw=\"urn://fieldworks.sil.org/ldmlExtensions/v1\"><fw:windowsLCID value=\"1033\"/></special></identity>\
         <localeDisplayNames><languages><language type=\"en\">English</language></languages></localeDisplayNames>\
         <numbers><symbols><decimal>.</decimal></symbols></numbers>\
         <collations><collation type=\"phonebook\"><rules><reset>a</reset></rules></collation></collations>\
         <special xmlns:palaso=\"{ns}\"><palaso:version value=\"2\"/></special>\
         <special xmlns:fw=\"urn://fieldworks.sil.org/ldmlExtensions/v1\"><fw:validChars value=\"abc\"/></special>\
         </ldml>",
        ns = PALASO_NS
    );

    let mut ws = ldml::read_definition(&prior).unwrap();
    ws.set_keyboard("US");
    let xml = ldml::write_to_string(&ws, Some(&prior)).unwrap();

    assert!(xml.contains("<fw:windowsLCID value=\"1033\"/>"));
    assert!(xml.contains("<language type=\"en\">English</language>"));
    assert!(xml.contains("<decimal>.</decimal>"));
    assert!(xml.contains("<collation type=\"phonebook\">"));
    assert!(xml.contains("<fw:validChars value=\"abc\"/>"));
    assert!(xml.contains("<palaso:defaultKeyboard value=\"US\"/>"));
    assert_eq!(xml.matches("<palaso:version").count(), 1);

    let back = ldml::read_definition(&xml).unwrap();
    assert_eq!(back.keyboard(), "US");
    assert_eq!(back.sort_using(), SortRulesType::DefaultOrdering);
}

#[test]
fn test_simple_rules_round_trip() {
    let mut ws = WritingSystemDefinition::new();
    ws.set_language("tpi").unwrap();
    ws.set_sort_using(SortRulesType::CustomSimple);
    ws.set_sort_rules("a A\nb B\nng Ng NG");

    let xml = ldml::write_to_string(&ws, None).unwrap();
    assert!(xml.contains("<palaso:sortRulesType value=\"CustomSimple\"/>"));

    let back = ldml::read_definition(&xml).unwrap();
    assert_eq!(back.sort_using(), SortRulesType::CustomSimple);
    assert_eq!(back.sort_rules(), "a A\nb B\nng Ng NG");
}

#[test]
fn test_invalid_simple_rules_read_back_as_icu() {
    let mut ws = WritingSystemDefinition::new();
    ws.set_language("fr").unwrap();
    ws.set_sort_using(SortRulesType::CustomSimple);
    ws.set_sort_rules("a a");

    let xml = ldml::write_to_string(&ws, None).unwrap();
    assert!(!xml.contains("<rules"));

    let back = ldml::read_definition(&xml).unwrap();
    assert_eq!(back.sort_using(), SortRulesType::CustomICU);
    assert_eq!(back.sort_rules(), "");
}

#[test]
fn test_other_language_round_trip() {
    let mut ws = WritingSystemDefinition::new();
    ws.set_language("qaa").unwrap();
    ws.set_sort_using(SortRulesType::OtherLanguage);
    ws.set_sort_rules("fr");

    let xml = ldml::write_to_string(&ws, None).unwrap();
    assert!(xml.contains("<alias source=\"fr\"/>"));

    let back = ldml::read_definition(&xml).unwrap();
    assert_eq!(back.sort_using(), SortRulesType::OtherLanguage);
    assert_eq!(back.sort_rules(), "fr");
}

#[test]
fn test_flex_identity_reads_without_version() {
    let xml = "<ldml><identity><language type=\"x-kal\"/><script type=\"Latn\"/></identity></ldml>";
    let ws = ldml::read_definition(xml).unwrap();
    assert_eq!(ws.rfc5646(), "qaa-Latn-x-kal");
}

#[test]
fn test_ipa_variant_round_trip() {
    let mut ws = WritingSystemDefinition::new();
    ws.set_language("de").unwrap();
    ws.set_ipa_status(IpaStatus::IpaPhonemic).unwrap();

    let xml = ldml::write_to_string(&ws, None).unwrap();
    let back = ldml::read_definition(&xml).unwrap();
    assert_eq!(back.rfc5646(), "de-fonipa-x-emic");
    assert_eq!(back.ipa_status(), IpaStatus::IpaPhonemic);
}

#[test]
fn test_wrong_version_is_rejected() {
    let xml = format!(
        "<ldml><identity><language type=\"en\"/></identity>\
         <special xmlns:palaso=\"{}\"><palaso:version value=\"1\"/></special></ldml>",
        PALASO_NS
    );
    match ldml::read_definition(&xml).unwrap_err() {
        WsError::UnsupportedVersion { expected, found } => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("Expected UnsupportedVersion error, got {:?}", other),
    }

    let migrated = ldml::migrate_to_latest(&xml).unwrap();
    assert_eq!(ldml::detect_version(&migrated).unwrap(), 2);
    assert_eq!(ldml::read_definition(&migrated).unwrap().rfc5646(), "en");
}

#[test]
fn test_missing_root_is_structural() {
    let err = ldml::read_definition("<root/>").unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("Missing <ldml> tag"));
}
