#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

pub fn wsdef_cmd() -> Command {
    let mut cmd = Command::cargo_bin("wsdef").unwrap();
    cmd.env_remove("WSDEF_ROOT");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// `wsdef` running inside the store at `root`
pub fn store_cmd(root: &Path) -> Command {
    let mut cmd = wsdef_cmd();
    cmd.current_dir(root);
    cmd
}

pub fn init_store(root: &Path) {
    wsdef_cmd().arg("init").arg(root).assert().success();
}

pub const PALASO_NS: &str = "urn://palaso.org/ldmlExtensions/v1";
