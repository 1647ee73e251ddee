//! # bulkcopy
//!
//! Concurrent, robocopy-style copy, move and mirror engine for Rust.
//!
//! ## Core Features
//!
//! - **Concurrent copying**: Every file becomes an independent job on a bounded
//!   rayon worker pool, so I/O for many files overlaps
//! - **Skip same-looking files**: Re-runs only copy files whose size or
//!   modification time changed
//! - **Purge**: Delete destination entries that no longer exist in the source
//! - **Move**: Delete sources once copied, and the source tree once empty
//! - **Permission preserving**: Optionally copies mode bits and timestamps
//! - **Live throughput**: A reporter thread samples shared atomic counters on a
//!   fixed interval
//! - **Partial failure**: A failed job never cancels its siblings; every
//!   failure is collected and returned together with the run summary
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use bulkcopy::CopyBuilder;
//!
//! let summary = CopyBuilder::new("src", "dst").run()?;
//! println!("Copied {} files ({} bytes)", summary.files_copied, summary.bytes_copied);
//! # Ok::<(), bulkcopy::Error>(())
//! ```
//!
//! ## Copier API
//!
//! For repeated runs or progress monitoring, use [`Copier`] with [`CopyOptions`]:
//!
//! ```no_run
//! use bulkcopy::{Copier, CopyOptions, SilentSink};
//! use std::sync::Arc;
//!
//! let options = CopyOptions::default()
//!     .with_parallel(8)
//!     .with_skip_same_looking()
//!     .with_copy_permissions();
//!
//! let mut copier = Copier::new("src", "dst", options).with_sink(Arc::new(SilentSink));
//! let progress = copier.progress();
//! let summary = copier.execute()?;
//! assert_eq!(progress.copied_bytes(), summary.bytes_copied);
//! # Ok::<(), bulkcopy::Error>(())
//! ```
//!
//! ## Error Policy
//!
//! Per-file copy and metadata errors, directory creation errors and walk
//! errors can be downgraded to warnings with
//! [`CopyOptions::with_ignore_errors`]. Purge and source-removal failures are
//! always reported. See [`Error`] for the full table.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Spinner progress sink with indicatif |
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and [`RunSummary`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod options;
mod pool;
mod progress;
mod summary;
mod utils;
pub mod walk;

pub use builder::CopyBuilder;
pub use copy::Copier;
pub use error::{Error, JobFailure, Result};
pub use options::CopyOptions;
pub use progress::{ConsoleSink, ProgressAggregator, ProgressSink, SilentSink, SpeedSample};
pub use summary::RunSummary;
pub use utils::size::{format_bytes, format_rate};
pub use walk::{DirListing, TreeWalker};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{SpinnerSink, create_speed_spinner};
