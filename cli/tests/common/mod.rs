//! Shared fixtures for the `bcp` integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A source tree and a scratch area to copy it into.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("source tempdir"),
            dst: TempDir::new().expect("destination tempdir"),
        }
    }

    /// Write `content` to `rel` under the source root, creating parents.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.src.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("source parent");
        }
        fs::write(&path, content).expect("source file");
        path
    }

    /// `count` flat files named `file{i}.txt`, each `size` bytes.
    pub fn create_files(&self, count: usize, size: usize) {
        let body = "x".repeat(size);
        for i in 0..count {
            self.write_source(&format!("file{i}.txt"), &body);
        }
    }

    /// A chain `level0/level1/...` with `files_per_level` files at each depth.
    pub fn create_nested_structure(&self, depth: usize, files_per_level: usize) {
        let mut rel = PathBuf::new();
        for level in 0..depth {
            rel.push(format!("level{level}"));
            fs::create_dir_all(self.src.path().join(&rel)).expect("nested dir");
            for i in 0..files_per_level {
                let file = rel.join(format!("file{i}.txt"));
                self.write_source(
                    file.to_str().expect("utf-8 fixture path"),
                    &format!("content at level {level}"),
                );
            }
        }
    }

    /// Destination root handed to `bcp`. Not created up front.
    pub fn target(&self) -> PathBuf {
        self.dst.path().join("copy")
    }

    /// Number of non-directory entries below `dir`.
    pub fn count_files_recursive(&self, dir: &Path) -> usize {
        relative_listing(dir)
            .iter()
            .filter(|rel| !dir.join(rel).is_dir())
            .count()
    }

    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        let actual = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        assert_eq!(actual, expected, "content mismatch at {}", path.display());
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted paths of every entry below `root`, relative to it.
pub fn relative_listing(root: &Path) -> Vec<PathBuf> {
    fn visit(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                visit(root, &path, out);
            }
        }
    }

    let mut out = Vec::new();
    visit(root, root, &mut out);
    out.sort();
    out
}
