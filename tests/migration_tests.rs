//! Integration tests for version detection and store migration

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{init_store, store_cmd, wsdef_cmd, PALASO_NS};

fn version_one(language: &str, variant: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ldml>\n\t<identity>\n\t\t<version number=\"\"/>\n\
         \t\t<generation date=\"2010-05-04T10:00:00\"/>\n\t\t<language type=\"{}\"/>\n\
         \t\t<variant type=\"{}\"/>\n\t</identity>\n\t<dates/>\n\
         \t<special xmlns:palaso=\"{}\">\n\t\t<palaso:version value=\"1\"/>\n\t</special>\n</ldml>\n",
        language, variant, PALASO_NS
    )
}

#[test]
fn test_version_command() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("old.ldml");
    fs::write(&path, version_one("eng", "")).unwrap();

    wsdef_cmd()
        .arg("version")
        .arg(&path)
        .assert()
        .success()
        .stdout("1\n");

    fs::write(&path, "<ldml><identity/></ldml>").unwrap();
    wsdef_cmd()
        .arg("version")
        .arg(&path)
        .assert()
        .success()
        .stdout("-1\n");
}

#[test]
fn test_version_command_rejects_non_ldml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("page.xml");
    fs::write(&path, "<html/>").unwrap();

    wsdef_cmd()
        .arg("version")
        .arg(&path)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Missing <ldml> tag"));
}

#[test]
fn test_old_file_cannot_be_shown_before_migration() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    fs::write(temp.path().join("eng.ldml"), version_one("eng", "")).unwrap();

    store_cmd(temp.path())
        .args(["show", "eng"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("expecting version 2 but got 1"))
        .stderr(predicate::str::contains("wsdef migrate --yes"));

    store_cmd(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreadable"));
}

#[test]
fn test_migrate_requires_yes() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    fs::write(temp.path().join("eng.ldml"), version_one("eng", "")).unwrap();

    store_cmd(temp.path())
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files to upgrade: 1"))
        .stdout(predicate::str::contains("- eng.ldml (version 1) -> en.ldml"))
        .stdout(predicate::str::contains("Refusing to run without --yes"));

    assert!(temp.path().join("eng.ldml").exists());
}

#[test]
fn test_migrate_dry_run() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    fs::write(temp.path().join("eng.ldml"), version_one("eng", "")).unwrap();

    store_cmd(temp.path())
        .args(["migrate", "--dry-run", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LDML migration plan"))
        .stdout(predicate::str::contains("Refusing").not());

    assert!(temp.path().join("eng.ldml").exists());
    assert!(!temp.path().join("en.ldml").exists());
}

#[test]
fn test_migrate_upgrades_store() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    fs::write(temp.path().join("eng.ldml"), version_one("eng", "")).unwrap();
    fs::write(
        temp.path().join("de-fonipa.ldml"),
        version_one("de", "fonipa-emic"),
    )
    .unwrap();
    store_cmd(temp.path()).arg("new").arg("fr").assert().success();

    store_cmd(temp.path())
        .args(["migrate", "--yes", "--archive-dir", "archive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files already current: 1"))
        .stdout(predicate::str::contains("Migration complete. Upgraded 2 files"));

    let en = fs::read_to_string(temp.path().join("en.ldml")).unwrap();
    assert!(en.contains("<language type=\"en\"/>"));
    assert!(en.contains("<dates/>"));
    assert!(en.contains("<palaso:version value=\"2\"/>"));
    assert!(temp.path().join("archive/eng.ldml").is_file());

    assert!(temp.path().join("de-fonipa-x-emic.ldml").is_file());
    assert!(!temp.path().join("de-fonipa.ldml").exists());

    store_cmd(temp.path())
        .args(["show", "de-fonipa-x-emic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("variant: fonipa-x-emic"));

    store_cmd(temp.path())
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));
}

#[test]
fn test_migrate_unknown_version_fails() {
    let temp = TempDir::new().unwrap();
    init_store(temp.path());
    let future = format!(
        "<ldml><special xmlns:palaso=\"{}\"><palaso:version value=\"3\"/></special></ldml>",
        PALASO_NS
    );
    fs::write(temp.path().join("future.ldml"), &future).unwrap();

    store_cmd(temp.path())
        .args(["migrate", "--yes"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No migration known for LDML version 3"));

    assert_eq!(
        fs::read_to_string(temp.path().join("future.ldml")).unwrap(),
        future
    );
}
