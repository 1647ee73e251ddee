//! /copyall integration tests for bcp CLI.
//!
//! These tests verify that /copyall carries permissions and timestamps over,
//! and that re-runs recognise the copied files as up to date.

use assert_cmd::cargo::cargo_bin_cmd;
use filetime::{FileTime, set_file_times};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_copyall_preserves_mtime() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let file = src.path().join("dated.txt");
    fs::write(&file, "old news").unwrap();
    let mtime = FileTime::from_unix_time(1_234_567_890, 0);
    set_file_times(&file, mtime, mtime).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path())
        .arg("/COPYALL")
        .assert()
        .success();

    let meta = fs::metadata(dst.path().join("dated.txt")).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
}

#[test]
fn test_without_copyall_mtime_is_fresh() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let file = src.path().join("dated.txt");
    fs::write(&file, "old news").unwrap();
    let mtime = FileTime::from_unix_time(1_234_567_890, 0);
    set_file_times(&file, mtime, mtime).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path()).arg(dst.path()).assert().success();

    let meta = fs::metadata(dst.path().join("dated.txt")).unwrap();
    assert_ne!(FileTime::from_last_modification_time(&meta), mtime);
}

#[cfg(unix)]
#[test]
fn test_copyall_preserves_mode() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let script = src.path().join("run.sh");
    fs::write(&script, "#!/bin/sh\necho hi\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o751)).unwrap();

    let mut cmd = cargo_bin_cmd!("bcp");
    cmd.arg(src.path())
        .arg(dst.path())
        .arg("/copyall")
        .assert()
        .success();

    let mode = fs::metadata(dst.path().join("run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o751);
}
