//! Symlink handling integration tests for bcp CLI.
//!
//! These tests verify proper handling of symbolic links:
//! - Symlinks to files are copied as regular files with the target's content
//! - Symlinked directories are never descended into
//! - Dangling symlinks are skipped with a warning
//! - Purge keeps destination entries whose names exist as links in the source

#[cfg(unix)]
use assert_cmd::cargo::cargo_bin_cmd;
#[cfg(unix)]
use predicates::prelude::*;
#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use tempfile::TempDir;

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_symlinked_file_copies_target_content() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        fs::write(src.path().join("target.txt"), "target content").unwrap();
        symlink("target.txt", src.path().join("link")).unwrap();

        let mut cmd = cargo_bin_cmd!("bcp");
        cmd.arg(src.path())
            .arg(dst.path().join("copied"))
            .assert()
            .success();

        let link_path = dst.path().join("copied/link");
        assert!(
            !fs::symlink_metadata(&link_path).unwrap().file_type().is_symlink(),
            "Should be a regular file, not a symlink"
        );
        assert_eq!(fs::read_to_string(&link_path).unwrap(), "target content");
    }

    #[test]
    fn test_symlink_loop_is_not_followed() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        fs::create_dir(src.path().join("dir")).unwrap();
        fs::write(src.path().join("dir/file.txt"), "x").unwrap();
        symlink("..", src.path().join("dir/up")).unwrap();

        let mut cmd = cargo_bin_cmd!("bcp");
        cmd.arg(src.path())
            .arg(dst.path().join("copied"))
            .assert()
            .success()
            .stderr(predicate::str::contains("symlinked directory"));

        assert!(dst.path().join("copied/dir/file.txt").exists());
        assert!(!dst.path().join("copied/dir/up").exists());
    }

    #[test]
    fn test_dangling_symlink_is_skipped() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        fs::write(src.path().join("real.txt"), "real").unwrap();
        symlink("/nonexistent/target", src.path().join("dangling")).unwrap();

        let mut cmd = cargo_bin_cmd!("bcp");
        cmd.arg(src.path())
            .arg(dst.path().join("copied"))
            .assert()
            .success()
            .stderr(predicate::str::contains("broken symlink"));

        assert!(dst.path().join("copied/real.txt").exists());
        assert!(fs::symlink_metadata(dst.path().join("copied/dangling")).is_err());
    }

    #[test]
    fn test_move_keeps_source_with_uncopied_links() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("real.txt"), "real").unwrap();
        symlink("/nonexistent/target", src.join("dangling")).unwrap();

        let mut cmd = cargo_bin_cmd!("bcp");
        cmd.arg(&src)
            .arg(root.path().join("dst"))
            .arg("/move")
            .assert()
            .success();

        assert!(!src.join("real.txt").exists());
        assert!(fs::symlink_metadata(src.join("dangling")).is_ok());
    }

    #[test]
    fn test_purge_retains_names_of_linked_directories() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        fs::create_dir(src.path().join("real")).unwrap();
        symlink("real", src.path().join("linked")).unwrap();
        fs::create_dir_all(dst.path().join("linked")).unwrap();
        fs::write(dst.path().join("linked/kept.txt"), "kept").unwrap();

        let mut cmd = cargo_bin_cmd!("bcp");
        cmd.arg(src.path())
            .arg(dst.path())
            .arg("/purge")
            .assert()
            .success();

        assert!(dst.path().join("linked/kept.txt").exists());
    }
}
