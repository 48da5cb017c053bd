//! Integration tests for creating, editing and sorting writing systems

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{init_store, store_cmd};

fn new_definition(root: &std::path::Path, key: &str) {
    store_cmd(root).arg("new").arg(key).assert().success();
}

fn set(root: &std::path::Path, id: &str, field: &str, value: &str) {
    store_cmd(root)
        .args(["set", id, field, value])
        .assert()
        .success();
}

#[test]
fn test_new_from_seed_key() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .arg("new")
        .arg("en-latn")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created English written in Latin script. (en-Latn)",
        ));

    let content = fs::read_to_string(temp.path().join("en-Latn.ldml")).unwrap();
    assert!(content.contains("<language type=\"en\"/>"));
    assert!(content.contains("<palaso:languageName value=\"English\"/>"));
    assert!(content.contains("<palaso:version value=\"2\"/>"));
}

#[test]
fn test_new_rejects_invalid_tag() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .arg("new")
        .arg("toolonglanguage")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid language tag"));
}

#[test]
fn test_new_duplicate_fails() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "fr");

    store_cmd(temp.path())
        .arg("new")
        .arg("fr")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_list_and_show() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "ru-cyrl");
    new_definition(temp.path(), "ar-arab");

    store_cmd(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ar-Arab"))
        .stdout(predicate::str::contains("ru-Cyrl"));

    store_cmd(temp.path())
        .args(["show", "ru-cyrl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: ru-Cyrl"))
        .stdout(predicate::str::contains("language_name: Russian"))
        .stdout(predicate::str::contains("abbreviation: rus"))
        .stdout(predicate::str::contains("sort_using: DefaultOrdering"));
}

#[test]
fn test_show_missing_definition() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .args(["show", "de"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Writing system not found: 'de'"))
        .stderr(predicate::str::contains("wsdef new de"));
}

#[test]
fn test_set_keeps_unknown_content() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "fr");

    let path = temp.path().join("fr.ldml");
    let content = fs::read_to_string(&path).unwrap();
    let content = content.replace("</ldml>", "\t<characters><exemplarCharacters>[a-z]</exemplarCharacters></characters>\n</ldml>");
    fs::write(&path, content).unwrap();

    set(temp.path(), "fr", "keyboard", "AZERTY");

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("<exemplarCharacters>[a-z]</exemplarCharacters>"));
    assert!(content.contains("<palaso:defaultKeyboard value=\"AZERTY\"/>"));
}

#[test]
fn test_set_region_renames_file() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "en-latn");

    store_cmd(temp.path())
        .args(["set", "en-Latn", "region", "GB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en-Latn-GB"));

    assert!(temp.path().join("en-Latn-GB.ldml").is_file());
    assert!(!temp.path().join("en-Latn.ldml").exists());
}

#[test]
fn test_set_unknown_field() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "fr");

    store_cmd(temp.path())
        .args(["set", "fr", "colour", "blue"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown field: 'colour'"));
}

#[test]
fn test_sort_with_icu_rules() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "es");
    set(temp.path(), "es", "sort_using", "CustomICU");
    set(temp.path(), "es", "sort_rules", "&n < ñ");

    store_cmd(temp.path())
        .args(["sort", "es", "ñu", "nu", "ou"])
        .assert()
        .success()
        .stdout("nu\nñu\nou\n");

    let content = fs::read_to_string(temp.path().join("es.ldml")).unwrap();
    assert!(content.contains("<reset>n</reset>"));
    assert!(content.contains("<p>ñ</p>"));
    assert!(content.contains("<palaso:sortRulesType value=\"CustomICU\"/>"));
}

#[test]
fn test_sort_with_simple_rules() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "tpi-latn");
    set(temp.path(), "tpi-Latn", "sort_using", "CustomSimple");
    set(temp.path(), "tpi-Latn", "sort_rules", "b B\na A");

    store_cmd(temp.path())
        .args(["sort", "tpi-Latn", "apa", "bata", "Apa"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bata\n"));

    store_cmd(temp.path())
        .args(["show", "tpi-Latn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sort_rules:\n    b B\n    a A\n"));
}

#[test]
fn test_validate() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    new_definition(temp.path(), "fr");

    store_cmd(temp.path())
        .args(["validate", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fr is valid"));
}
