//! Edge case integration tests for bcp CLI.
//!
//! These tests cover edge cases and advanced features:
//! - Symlink handling (symlinked files, directories and dangling links)
//! - File type conflicts between source and destination
//! - Permission and timestamp copying with /copyall

#[path = "edge_cases/file_type_conflict.rs"]
mod file_type_conflict;

#[path = "edge_cases/symlink_handling.rs"]
mod symlink_handling;

#[path = "edge_cases/copyall.rs"]
mod copyall;
