//! Configuration options for copy runs.
//!
//! This module provides [`CopyOptions`], the immutable per-run settings read
//! by every job.
//!
//! # Example
//!
//! ```
//! use bulkcopy::CopyOptions;
//! use std::time::Duration;
//!
//! let options = CopyOptions::default()
//!     .with_parallel(8)
//!     .with_buffer_size(64 * 1024)
//!     .with_report_interval(Duration::from_millis(250))
//!     .with_purge()
//!     .with_skip_same_looking();
//! ```

use std::time::Duration;

/// Options for a copy run.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `parallel` | 16 | Worker threads |
/// | `buffer_size` | 8192 | Bytes per read/write chunk |
/// | `report_interval` | 100ms | Progress flush and report period |
/// | `zero_length` | `false` | Create empty files instead of copying |
/// | `ignore_empty_dirs` | `false` | Skip creating empty directories |
/// | `copy_permissions` | `false` | Copy mode and atime/mtime |
/// | `move_files` | `false` | Delete sources after copying |
/// | `purge` | `false` | Delete destination entries missing from the source |
/// | `skip_same_looking` | `false` | Skip files whose size and mtime match |
/// | `compare_access_time` | `false` | Also require atime to match when skipping |
/// | `ignore_errors` | `false` | Downgrade per-file errors to warnings |
/// | `quiet` | `false` | Suppress all normal output |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct CopyOptions {
    /// Number of worker threads (default: 16)
    pub parallel: usize,

    /// Size of the chunk buffer used when streaming file contents (default: 8192)
    pub buffer_size: usize,

    /// How often workers flush byte counts and the reporter prints speed
    /// (default: 100ms)
    pub report_interval: Duration,

    /// Create zero-length destination files instead of copying contents
    ///
    /// Useful to materialize a directory and file skeleton.
    pub zero_length: bool,

    /// Skip source directories that contain no entries at all
    pub ignore_empty_dirs: bool,

    /// Copy permission bits and access/modification times to the destination
    pub copy_permissions: bool,

    /// Delete each source file after it is copied, and the source tree at the end
    pub move_files: bool,

    /// Delete destination entries that have no counterpart in the source
    pub purge: bool,

    /// Skip files whose destination already has the same size and mtime
    pub skip_same_looking: bool,

    /// Also compare access times when deciding whether a file looks the same
    ///
    /// Access times are often coarsened or frozen by mount options
    /// (`noatime`, `relatime`), so this is off by default.
    pub compare_access_time: bool,

    /// Treat copy, metadata and directory-creation failures as warnings
    ///
    /// An ignored file counts as neither copied nor skipped.
    pub ignore_errors: bool,

    /// Suppress progress and summary output
    pub quiet: bool,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            parallel: 16,
            buffer_size: 8192,
            report_interval: Duration::from_millis(100),
            zero_length: false,
            ignore_empty_dirs: false,
            copy_permissions: false,
            move_files: false,
            purge: false,
            skip_same_looking: false,
            compare_access_time: false,
            ignore_errors: false,
            quiet: false,
            warn_handler: None,
        }
    }
}

impl CopyOptions {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Set the number of worker threads
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_parallel(mut self, n: usize) -> Self {
        self.parallel = n.max(1);
        self
    }

    /// Set the copy buffer size in bytes
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Set the progress reporting interval
    ///
    /// A zero interval is bumped to one millisecond so the reporter never spins.
    #[must_use]
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Create zero-length files instead of copying contents
    #[must_use]
    pub fn with_zero_length(mut self) -> Self {
        self.zero_length = true;
        self
    }

    /// Do not recreate empty source directories
    #[must_use]
    pub fn with_ignore_empty_dirs(mut self) -> Self {
        self.ignore_empty_dirs = true;
        self
    }

    /// Copy permissions and timestamps
    #[must_use]
    pub fn with_copy_permissions(mut self) -> Self {
        self.copy_permissions = true;
        self
    }

    /// Move instead of copy
    #[must_use]
    pub fn with_move(mut self) -> Self {
        self.move_files = true;
        self
    }

    /// Purge destination entries missing from the source
    #[must_use]
    pub fn with_purge(mut self) -> Self {
        self.purge = true;
        self
    }

    /// Skip files that look identical (size and mtime)
    #[must_use]
    pub fn with_skip_same_looking(mut self) -> Self {
        self.skip_same_looking = true;
        self
    }

    /// Require access times to match too when skipping
    #[must_use]
    pub fn with_access_time_check(mut self) -> Self {
        self.compare_access_time = true;
        self
    }

    /// Downgrade per-file errors to warnings
    #[must_use]
    pub fn with_ignore_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }

    /// Suppress all normal output
    #[must_use]
    pub fn with_quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }
}
