//! Error handling integration tests for bcp CLI.
//!
//! These tests verify proper error handling behaviors:
//! - Source validation and exit codes
//! - Failed jobs do not stop the rest of the run
//! - Moved sources are kept when their copy fails
//! - Ignored errors are reported as warnings

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_source_exits_with_invalid_input() {
    let dst = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(dst.path().join("does-not-exist"))
        .arg(dst.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Source is not a directory or file path",
        ));

    assert!(!dst.path().join("out").exists());
}

#[test]
fn test_missing_positional_is_usage_error() {
    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg("/MT:4").assert().code(2);
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let src = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(src.path().join("out"))
        .arg("--frobnicate")
        .assert()
        .code(2);
}

/// A file that cannot be written (a directory is in the way) fails its job,
/// but every other file is still copied.
#[test]
fn test_failed_job_reports_and_continues() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("blocked.txt"), "blocked").unwrap();
    fs::write(src.path().join("fine.txt"), "fine").unwrap();
    fs::create_dir_all(dst.path().join("blocked.txt")).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path())
        .arg("/quiet")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 of 2 jobs failed"))
        .stderr(predicate::str::contains("blocked.txt"));

    assert_eq!(
        fs::read_to_string(dst.path().join("fine.txt")).unwrap(),
        "fine"
    );
}

#[test]
fn test_move_keeps_source_of_failed_copy() {
    let root = TempDir::new().unwrap();
    let src = root.path().join("src");
    let dst = root.path().join("dst");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(src.join("blocked.txt"), "keep me").unwrap();
    fs::write(src.join("sub/moved.txt"), "moved").unwrap();
    fs::create_dir_all(dst.join("blocked.txt")).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(&src).arg(&dst).arg("/move").assert().code(1);

    assert_eq!(
        fs::read_to_string(src.join("blocked.txt")).unwrap(),
        "keep me"
    );
    assert!(!src.join("sub").exists());
    assert_eq!(fs::read_to_string(dst.join("sub/moved.txt")).unwrap(), "moved");
}

#[test]
fn test_ignore_errors_downgrades_failure_to_warning() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("blocked.txt"), "blocked").unwrap();
    fs::write(src.path().join("fine.txt"), "fine").unwrap();
    fs::create_dir_all(dst.path().join("blocked.txt")).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path())
        .arg("--ignore-errors")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignored Errors:      1"))
        .stderr(predicate::str::contains("warning: Ignoring error"));
}

#[test]
fn test_json_reports_failures() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("blocked.txt"), "blocked").unwrap();
    fs::create_dir_all(dst.path().join("blocked.txt")).unwrap();

    let output = cargo_bin_cmd!("bcp")
        .arg(src.path())
        .arg(dst.path())
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let failures = value["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(
        failures[0]["path"]
            .as_str()
            .unwrap()
            .ends_with("blocked.txt")
    );
    assert_eq!(value["summary"]["jobs_failed"], 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_file_fails() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores permission bits
    if running_as_root() {
        return;
    }

    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let secret = src.path().join("secret.txt");
    fs::write(&secret, "secret").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    let assert = cmd.arg(src.path()).arg(dst.path()).arg("/quiet").assert();

    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
    assert
        .code(1)
        .stderr(predicate::str::contains("Failed to copy"));
}

#[cfg(unix)]
fn running_as_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim() == "0")
        .unwrap_or(false)
}
