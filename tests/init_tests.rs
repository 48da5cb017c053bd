//! Integration tests for init and config commands

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{init_store, store_cmd, wsdef_cmd};

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().unwrap();

    wsdef_cmd()
        .arg("init")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized wsdef store"));

    assert!(temp.path().join(".wsdef").is_dir());
    let content = fs::read_to_string(temp.path().join(".wsdef/config.toml")).unwrap();
    assert!(content.contains("created = "));
    assert!(content.contains("archive_on_migrate = true"));
}

#[test]
fn test_init_with_font() {
    let temp = TempDir::new().unwrap();

    wsdef_cmd()
        .arg("init")
        .arg(temp.path())
        .arg("--font")
        .arg("Charis SIL")
        .assert()
        .success();

    let content = fs::read_to_string(temp.path().join(".wsdef/config.toml")).unwrap();
    assert!(content.contains("default_font = \"Charis SIL\""));
}

#[test]
fn test_init_already_initialized_fails() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    wsdef_cmd()
        .arg("init")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_outside_store_fails_with_suggestions() {
    let temp = TempDir::new().unwrap();

    store_cmd(temp.path())
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not a wsdef store"))
        .stderr(predicate::str::contains("wsdef init"));
}

#[test]
fn test_store_discovered_from_subdirectory() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    let nested = temp.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    store_cmd(&nested)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No writing systems found"));
}

#[test]
fn test_wsdef_root_overrides_discovery() {
    let temp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    init_store(temp.path());

    wsdef_cmd()
        .current_dir(elsewhere.path())
        .env("WSDEF_ROOT", temp.path())
        .arg("new")
        .arg("fr")
        .assert()
        .success();

    assert!(temp.path().join("fr.ldml").is_file());
}

#[test]
fn test_config_get_and_set() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .arg("config")
        .arg("archive_on_migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    store_cmd(temp.path())
        .arg("config")
        .arg("default_font")
        .arg("Doulos SIL")
        .assert()
        .success()
        .stdout(predicate::str::contains("Set default_font = Doulos SIL"));

    store_cmd(temp.path())
        .arg("config")
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("default_font = Doulos SIL"))
        .stdout(predicate::str::contains("archive_on_migrate = true"))
        .stdout(predicate::str::contains("created = "));
}

#[test]
fn test_config_created_is_read_only() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .arg("config")
        .arg("created")
        .arg("2020-01-01T00:00:00Z")
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));
}

#[test]
fn test_config_unknown_key() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());

    store_cmd(temp.path())
        .arg("config")
        .arg("editor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key: 'editor'"))
        .stderr(predicate::str::contains("Valid keys"));
}
