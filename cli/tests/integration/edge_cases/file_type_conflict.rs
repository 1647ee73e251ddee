//! File type conflict integration tests for bcp CLI.
//!
//! These tests verify handling when source and destination have different types:
//! - A file copied onto an existing directory lands inside it
//! - A directory copied where a file exists fails without touching the file
//! - Purge replaces a stale file with a source directory of the same name only
//!   when the name is no longer retained

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_to_existing_directory() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("file.txt"), "content").unwrap();
    fs::create_dir_all(dst.path().join("existing_dir")).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path().join("file.txt"))
        .arg(dst.path().join("existing_dir"))
        .assert()
        .success();

    assert!(
        dst.path().join("existing_dir/file.txt").exists(),
        "File should be copied INTO the directory"
    );
}

#[test]
fn test_directory_to_existing_file_fails() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("a.txt"), "a").unwrap();
    fs::write(dst.path().join("occupied"), "precious").unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path().join("occupied"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to create directory"));

    assert_eq!(
        fs::read_to_string(dst.path().join("occupied")).unwrap(),
        "precious"
    );
}

#[test]
fn test_subdirectory_blocked_by_file_is_ignored_with_flag() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::create_dir(src.path().join("sub")).unwrap();
    fs::write(src.path().join("sub/inner.txt"), "inner").unwrap();
    fs::write(src.path().join("top.txt"), "top").unwrap();
    fs::write(dst.path().join("sub"), "blocker").unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path())
        .arg("--ignore-errors")
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to create directory"));

    assert!(dst.path().join("top.txt").exists());
    assert!(dst.path().join("sub").is_file());
}
