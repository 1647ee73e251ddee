//! Error types for bulkcopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during a run, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors | Policy |
//! |----------|--------|--------|
//! | Validation | [`Error::InvalidSource`] | fails the run before any job |
//! | Per-file | [`Error::Copy`], [`Error::Metadata`] | gated by `ignore_errors` |
//! | Tree | [`Error::CreateDirectory`], [`Error::Walk`] | gated by `ignore_errors` |
//! | Destructive | [`Error::Purge`], [`Error::RemoveSource`], [`Error::MoveCleanup`] | always propagated |
//! | Scheduling | [`Error::ThreadPool`], [`Error::JobPanicked`] | always propagated |
//! | Aggregate | [`Error::JobsFailed`] | overall run failure |

use crate::summary::RunSummary;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for bulkcopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a copy run.
///
/// All errors include relevant path information to aid debugging.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error not attributable to a specific job
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source is neither a regular file nor a directory (or does not exist)
    #[error("Source is not a directory or file path: {0}")]
    InvalidSource(PathBuf),

    /// Opening, reading or writing a file failed
    #[error("Failed to copy {src} -> {dst}: {source}")]
    Copy {
        /// Source file
        src: PathBuf,
        /// Destination file
        dst: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Copying permissions or timestamps failed
    #[error("Failed to copy metadata to {path}: {source}")]
    Metadata {
        /// Path whose metadata could not be set
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Creating a destination directory failed
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Enumerating a source directory failed
    #[error("Failed to read directory {path}: {source}")]
    Walk {
        /// Directory that could not be read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Deleting a stale destination entry failed
    #[error("Failed to purge {path}: {source}")]
    Purge {
        /// Entry that could not be removed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Deleting a moved source file failed
    #[error("Failed to remove moved source file {path}: {source}")]
    RemoveSource {
        /// Source file that could not be removed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Removing the source directory skeleton after a move failed
    #[error("Failed to remove source tree {path} after move: {source}")]
    MoveCleanup {
        /// Source root
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The worker pool could not be built
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker panicked while running a job
    #[error("Worker panicked while processing {0}")]
    JobPanicked(PathBuf),

    /// One or more jobs failed
    ///
    /// Jobs are never cancelled when a sibling fails, so `summary` reflects
    /// everything that completed.
    #[error("{failed} of {total} jobs failed")]
    JobsFailed {
        /// Number of failed jobs
        failed: usize,
        /// Total number of submitted jobs, plus any run step that failed
        /// outside a job
        total: usize,
        /// Every failure, in submission order
        failures: Vec<JobFailure>,
        /// Summary of the run up to completion
        summary: Box<RunSummary>,
    },
}

impl Error {
    /// Whether this error may be downgraded to a warning by `ignore_errors`.
    pub(crate) fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::Copy { .. } | Self::Metadata { .. } | Self::CreateDirectory { .. } | Self::Walk { .. }
        )
    }

    /// The path this error is about, if it names one.
    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::Copy { src: path, .. }
            | Self::Metadata { path, .. }
            | Self::CreateDirectory { path, .. }
            | Self::Walk { path, .. }
            | Self::Purge { path, .. }
            | Self::RemoveSource { path, .. }
            | Self::MoveCleanup { path, .. }
            | Self::InvalidSource(path)
            | Self::JobPanicked(path) => Some(path.as_path()),
            Self::Io(_) | Self::ThreadPool(_) | Self::JobsFailed { .. } => None,
        }
    }
}

/// A single failed job collected while draining.
#[derive(Debug)]
pub struct JobFailure {
    /// Path the job was working on (source file or purged directory), or
    /// the directory named by a failed walk, mkdir or metadata step
    pub path: PathBuf,
    /// Why the job failed
    pub error: Error,
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}
