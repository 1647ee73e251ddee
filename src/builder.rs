//! Builder API for ergonomic copy runs.
//!
//! The builder pattern provides a fluent interface for configuring and executing
//! a run. This is often more convenient than manually constructing
//! [`CopyOptions`] and a [`Copier`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use bulkcopy::CopyBuilder;
//!
//! let summary = CopyBuilder::new("src", "dst").quiet().run()?;
//! println!("Copied {} files", summary.files_copied);
//! # Ok::<(), bulkcopy::Error>(())
//! ```
//!
//! ## Mirror
//!
//! ```no_run
//! use bulkcopy::CopyBuilder;
//!
//! // Make dst an exact mirror of src, re-copying only what changed
//! let summary = CopyBuilder::new("src", "dst")
//!     .parallel(32)
//!     .skip_same_looking()
//!     .copy_permissions()
//!     .purge()
//!     .run()?;
//!
//! println!("{summary}");
//! # Ok::<(), bulkcopy::Error>(())
//! ```

use crate::copy::Copier;
use crate::error::Result;
use crate::options::CopyOptions;
use crate::progress::ProgressSink;
use crate::summary::RunSummary;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A builder for configuring and executing copy runs.
///
/// # Example
///
/// ```no_run
/// use bulkcopy::CopyBuilder;
///
/// let summary = CopyBuilder::new("/data/project", "/backup/project")
///     .parallel(16)
///     .move_files()
///     .run()?;
/// # Ok::<(), bulkcopy::Error>(())
/// ```
#[derive(Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for CopyBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyBuilder")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given source and destination paths.
    ///
    /// Uses default options (parallel=16, 8 KiB buffer, no skip, no purge).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: CopyOptions::default(),
            sink: None,
        }
    }

    /// Set the number of worker threads.
    ///
    /// Default is 16. Set to 1 for sequential copying.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkcopy::CopyBuilder;
    ///
    /// let summary = CopyBuilder::new("src", "dst")
    ///     .parallel(4)
    ///     .run()?;
    /// # Ok::<(), bulkcopy::Error>(())
    /// ```
    #[must_use]
    pub fn parallel(mut self, threads: usize) -> Self {
        self.options = self.options.with_parallel(threads);
        self
    }

    /// Set the chunk size used when streaming file contents.
    #[must_use]
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_buffer_size(bytes);
        self
    }

    /// Set how often throughput is reported.
    #[must_use]
    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.options = self.options.with_report_interval(interval);
        self
    }

    /// Create empty destination files instead of copying contents.
    ///
    /// Useful for rehearsing a large transfer's directory layout.
    #[must_use]
    pub fn zero_length(mut self) -> Self {
        self.options = self.options.with_zero_length();
        self
    }

    /// Do not create destination directories for empty source directories.
    #[must_use]
    pub fn ignore_empty_dirs(mut self) -> Self {
        self.options = self.options.with_ignore_empty_dirs();
        self
    }

    /// Copy permission bits and access/modification times.
    #[must_use]
    pub fn copy_permissions(mut self) -> Self {
        self.options = self.options.with_copy_permissions();
        self
    }

    /// Delete each source file after it has been copied, and the source
    /// tree once everything has been moved.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkcopy::CopyBuilder;
    ///
    /// let summary = CopyBuilder::new("incoming", "archive")
    ///     .move_files()
    ///     .run()?;
    /// # Ok::<(), bulkcopy::Error>(())
    /// ```
    #[must_use]
    pub fn move_files(mut self) -> Self {
        self.options = self.options.with_move();
        self
    }

    /// Delete destination entries that do not exist in the source.
    #[must_use]
    pub fn purge(mut self) -> Self {
        self.options = self.options.with_purge();
        self
    }

    /// Skip files whose destination has the same size and modification time.
    #[must_use]
    pub fn skip_same_looking(mut self) -> Self {
        self.options = self.options.with_skip_same_looking();
        self
    }

    /// Also require matching access times when skipping.
    #[must_use]
    pub fn compare_access_time(mut self) -> Self {
        self.options = self.options.with_access_time_check();
        self
    }

    /// Downgrade per-file copy, metadata and directory errors to warnings.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkcopy::CopyBuilder;
    ///
    /// let summary = CopyBuilder::new("flaky_share", "local")
    ///     .ignore_errors()
    ///     .on_warning(|msg| eprintln!("Warning: {}", msg))
    ///     .run()?;
    ///
    /// if summary.errors_ignored > 0 {
    ///     eprintln!("{} files were not copied", summary.errors_ignored);
    /// }
    /// # Ok::<(), bulkcopy::Error>(())
    /// ```
    #[must_use]
    pub fn ignore_errors(mut self) -> Self {
        self.options = self.options.with_ignore_errors();
        self
    }

    /// Suppress all progress and summary output.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.options = self.options.with_quiet();
        self
    }

    /// Set a warning handler for non-fatal issues.
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Route progress events to a custom sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Build a reusable [`Copier`] without running it.
    #[must_use]
    pub fn build(self) -> Copier {
        let copier = Copier::new(self.src, self.dst, self.options);
        match self.sink {
            Some(sink) => copier.with_sink(sink),
            None => copier,
        }
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// See [`Copier::execute`].
    pub fn run(self) -> Result<RunSummary> {
        self.build().execute()
    }
}
