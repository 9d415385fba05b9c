//! CLI end-to-end tests that invoke the compiled `refconf` binary.
//!
//! Documents come from `test-fixtures/configs` or are written to temporary
//! directories.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use refconf_test_utils::{TestDir, documents};
use rstest::rstest;

/// Path of a document under `test-fixtures/configs`.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name)
}

/// A `refconf` command with no mode taken from the environment.
fn refconf() -> Command {
    let mut cmd = Command::cargo_bin("refconf").unwrap();
    cmd.env_remove("REFCONF_MODE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    refconf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_no_command_prints_hint() {
    refconf()
        .assert()
        .success()
        .stdout(predicate::str::contains("refconf --help"));
}

#[test]
fn test_resolve_prints_json() {
    let output = refconf()
        .arg("resolve")
        .arg(fixture("service.jsonc"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["url"], "http://localhost:8080/billing");
    assert_eq!(value["workers"], 8);
    assert_eq!(value["primary"], "billing-a");
    assert_eq!(value["banner"], "billing runs 8 workers");
}

#[test]
fn test_resolve_compact_is_one_line() {
    let assert = refconf()
        .arg("resolve")
        .arg(fixture("service.jsonc"))
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"name\":\"billing\""));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_resolve_yaml() {
    refconf()
        .arg("resolve")
        .arg(fixture("service.jsonc"))
        .args(["--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("host: localhost"))
        .stdout(predicate::str::contains("- billing-a"));
}

#[test]
fn test_get_value() {
    refconf()
        .arg("get")
        .arg(fixture("service.jsonc"))
        .arg("url")
        .assert()
        .success()
        .stdout("\"http://localhost:8080/billing\"\n");
}

#[test]
fn test_get_raw_value() {
    refconf()
        .arg("get")
        .arg(fixture("service.jsonc"))
        .args(["replicas.1", "--raw"])
        .assert()
        .success()
        .stdout("billing-b\n");
}

#[test]
fn test_get_missing_path_fails() {
    refconf()
        .arg("get")
        .arg(fixture("service.jsonc"))
        .arg("nope")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_check_succeeds() {
    refconf()
        .arg("check")
        .arg(fixture("service.jsonc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("resolves"))
        .stdout(predicate::str::contains("restricted mode"));
}

#[rstest]
#[case("cycle.json", "Cyclic reference: a -> b -> c -> a")]
#[case("unknown.json", "Unknown reference: ${pong} in ping")]
fn test_check_reports_reference_errors(#[case] name: &str, #[case] message: &str) {
    refconf()
        .arg("check")
        .arg(fixture(name))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(message));
}

#[test]
fn test_check_missing_file() {
    let dir = TestDir::new();
    refconf()
        .arg("check")
        .arg(dir.path("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_restricted_mode_forbids_file_access() {
    refconf()
        .current_dir(fixture(""))
        .args(["resolve", "files.jsonc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Forbidden capability at motd: `read_file` requires unrestricted mode",
        ));
}

#[rstest]
#[case(&["--unrestricted"])]
#[case(&["--mode", "unrestricted"])]
fn test_unrestricted_mode_reads_files(#[case] flags: &[&str]) {
    refconf()
        .current_dir(fixture(""))
        .args(["get", "files.jsonc", "motd", "--raw"])
        .args(flags)
        .assert()
        .success()
        .stdout("welcome aboard\n");
}

#[test]
fn test_mode_from_environment() {
    refconf()
        .current_dir(fixture(""))
        .env("REFCONF_MODE", "unrestricted")
        .args(["get", "files.jsonc", "motd", "--raw"])
        .assert()
        .success()
        .stdout("welcome aboard\n");
}

#[test]
fn test_deps_lists_references() {
    refconf()
        .arg("deps")
        .arg(fixture("service.jsonc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("url -> host, port, name"))
        .stdout(predicate::str::contains("primary -> replicas.0"))
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_deps_reports_self_reference() {
    let dir = TestDir::new();
    let path = dir.write("self.json", documents::SELF_REFERENCE);
    refconf()
        .arg("deps")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("fubar -> fubar"))
        .stderr(predicate::str::contains("Self reference: fubar references itself"));
}

#[test]
fn test_decode_errors_are_reported() {
    let dir = TestDir::new();
    let path = dir.write("broken.json", "{\"a\": }");
    refconf()
        .arg("resolve")
        .arg(&path)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_completions_bash() {
    refconf()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("refconf"));
}
