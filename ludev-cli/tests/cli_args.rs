use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;

fn ludev_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ludev"));
    cmd.env_remove("LUDEV_LOG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags() {
    ludev_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--log-format"))
        .stdout(contains("--log-filter"));
}

#[test]
fn version_prints_package_version() {
    ludev_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_log_format_is_a_usage_error() {
    ludev_cmd()
        .args(["--log-format", "yaml"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("expected: text, json"));
}

#[test]
fn invalid_log_filter_exits_non_zero() {
    ludev_cmd()
        .args(["--log-filter", "ludev_core=notalevel"])
        .assert()
        .failure()
        .stderr(contains("invalid log filter"));
}
