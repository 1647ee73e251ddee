//! Single file copy job.
//!
//! A copy job either skips a same-looking destination or streams the source
//! into the destination in fixed-size chunks, flushing byte counts into the
//! shared [`ProgressAggregator`] at most once per reporting interval.

use crate::error::{Error, Result};
use crate::options::CopyOptions;
use crate::progress::ProgressAggregator;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;

use super::utils::{copy_metadata, same_looking};

/// Outcome of a single file copy (internal use)
#[derive(Debug)]
pub(crate) enum FileOutcome {
    /// Contents were written (0 bytes in zero-length mode)
    Copied {
        /// Bytes streamed into the destination
        bytes: u64,
    },
    /// Destination already looked identical
    Skipped,
    /// A gated failure was downgraded by `ignore_errors`
    Ignored(Error),
}

/// Byte counter that flushes into the aggregator on a time budget.
struct PendingBytes<'a> {
    progress: &'a ProgressAggregator,
    options: &'a CopyOptions,
    next_flush: Instant,
    unflushed: u64,
    total: u64,
}

impl<'a> PendingBytes<'a> {
    fn new(progress: &'a ProgressAggregator, options: &'a CopyOptions) -> Self {
        Self {
            progress,
            options,
            next_flush: Instant::now() + options.report_interval,
            unflushed: 0,
            total: 0,
        }
    }

    fn add(&mut self, bytes: u64) {
        self.unflushed += bytes;
        self.total += bytes;
        if Instant::now() >= self.next_flush {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.unflushed > 0 {
            self.progress.add_copied_bytes(self.unflushed);
            self.unflushed = 0;
        }
        self.next_flush = Instant::now() + self.options.report_interval;
    }
}

/// Copy (or skip) one file according to `options`.
///
/// # Errors
///
/// Returns [`Error::Copy`] or [`Error::Metadata`] when `ignore_errors` is
/// off, and [`Error::RemoveSource`] if a moved source cannot be deleted.
/// With `ignore_errors` on, copy and metadata failures come back as
/// [`FileOutcome::Ignored`] instead.
pub(crate) fn copy_one(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    progress: &ProgressAggregator,
) -> Result<FileOutcome> {
    if options.skip_same_looking {
        match check_same_looking(src, dst, options) {
            Ok(true) => {
                progress.add_skipped_copies(1);
                return Ok(FileOutcome::Skipped);
            }
            Ok(false) => {}
            Err(e) => return gate(e, options),
        }
    }

    let mut pending = PendingBytes::new(progress, options);
    let streamed = stream_contents(src, dst, options, &mut pending);
    if let Err(e) = streamed {
        if options.ignore_errors {
            pending.flush();
            return Ok(FileOutcome::Ignored(e));
        }
        return Err(e);
    }
    pending.flush();

    if options.copy_permissions {
        if let Err(source) = copy_metadata(src, dst) {
            let error = Error::Metadata {
                path: dst.to_path_buf(),
                source,
            };
            return gate(error, options);
        }
    }

    if options.move_files {
        fs::remove_file(src).map_err(|source| Error::RemoveSource {
            path: src.to_path_buf(),
            source,
        })?;
    }

    Ok(FileOutcome::Copied {
        bytes: pending.total,
    })
}

fn gate(error: Error, options: &CopyOptions) -> Result<FileOutcome> {
    if options.ignore_errors && error.is_ignorable() {
        Ok(FileOutcome::Ignored(error))
    } else {
        Err(error)
    }
}

/// Returns `Ok(false)` whenever the destination is absent or unreadable.
fn check_same_looking(src: &Path, dst: &Path, options: &CopyOptions) -> Result<bool> {
    let Ok(dst_meta) = fs::metadata(dst) else {
        return Ok(false);
    };
    let src_meta = fs::metadata(src).map_err(|source| copy_error(src, dst, source))?;
    Ok(same_looking(&src_meta, &dst_meta, options.compare_access_time))
}

fn stream_contents(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    pending: &mut PendingBytes<'_>,
) -> Result<()> {
    let err = |source| copy_error(src, dst, source);

    let mut reader = File::open(src).map_err(err)?;
    let mut writer = File::create(dst).map_err(err)?;

    if options.zero_length {
        return Ok(());
    }

    let mut buf = vec![0u8; options.buffer_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(err(e)),
        };
        writer.write_all(&buf[..n]).map_err(err)?;
        pending.add(n as u64);
    }

    writer.flush().map_err(err)
}

fn copy_error(src: &Path, dst: &Path, source: io::Error) -> Error {
    Error::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    }
}

// =============================================================================
// Tests
// =============================================================================
