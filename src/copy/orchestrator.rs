//! Run orchestration.
//!
//! [`Copier::execute`] walks the source, turns every file into a copy job and
//! every visited directory into an optional purge job, and hands them to a
//! [`WorkerPool`] built for this run only. Submission never waits on a job.
//! Once everything is queued the handles are drained in order while a
//! [`SpeedReporter`] prints throughput from its own thread.

use crate::error::{Error, JobFailure, Result};
use crate::options::CopyOptions;
use crate::pool::{JobHandle, WorkerPool};
use crate::progress::{ConsoleSink, ProgressAggregator, ProgressSink, SilentSink, SpeedReporter};
use crate::summary::RunSummary;
use crate::walk::TreeWalker;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::file::{FileOutcome, copy_one};
use super::purge::purge_directory;
use super::utils::{copy_metadata, dest_path, ensure_dir, prune_empty_dirs};

/// Typed result of one job, folded into the run tally while draining.
#[derive(Debug)]
pub(crate) enum JobOutcome {
    Copied { bytes: u64 },
    Skipped,
    Purged { removed: u64 },
    Ignored(Error),
    Failed(Error),
}

impl From<FileOutcome> for JobOutcome {
    fn from(outcome: FileOutcome) -> Self {
        match outcome {
            FileOutcome::Copied { bytes } => Self::Copied { bytes },
            FileOutcome::Skipped => Self::Skipped,
            FileOutcome::Ignored(e) => Self::Ignored(e),
        }
    }
}

struct PendingJob {
    path: PathBuf,
    handle: JobHandle<JobOutcome>,
}

enum SourceKind {
    Tree,
    File,
}

fn classify(source: &Path) -> Result<SourceKind> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => Ok(SourceKind::Tree),
        Ok(meta) if meta.is_file() => Ok(SourceKind::File),
        _ => Err(Error::InvalidSource(source.to_path_buf())),
    }
}

/// Copies (or moves) a file or directory tree into a destination.
///
/// A `Copier` can run any number of times. Each call to [`execute`] resets
/// the shared counters, builds a fresh worker pool and tears it down again
/// before returning.
///
/// [`execute`]: Copier::execute
///
/// # Example
///
/// ```no_run
/// use bulkcopy::{Copier, CopyOptions};
///
/// let options = CopyOptions::default()
///     .with_parallel(8)
///     .with_skip_same_looking()
///     .with_purge();
///
/// let mut copier = Copier::new("/data/photos", "/backup/photos", options);
/// let summary = copier.execute()?;
/// println!("{summary}");
/// # Ok::<(), bulkcopy::Error>(())
/// ```
pub struct Copier {
    source: PathBuf,
    destination: PathBuf,
    options: CopyOptions,
    progress: Arc<ProgressAggregator>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl fmt::Debug for Copier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Copier")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("options", &self.options)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Copier {
    /// Create a copier. Nothing touches the filesystem until [`Copier::execute`].
    pub fn new<S: AsRef<Path>, D: AsRef<Path>>(source: S, destination: D, options: CopyOptions) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            options,
            progress: Arc::new(ProgressAggregator::new()),
            sink: None,
        }
    }

    /// Send progress events to `sink` instead of the default.
    ///
    /// Without a sink, quiet runs are silent and all others print to stdout
    /// through [`ConsoleSink`].
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Source path
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination path
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Options used for every run
    #[must_use]
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Shared counters, readable from another thread during a run.
    #[must_use]
    pub fn progress(&self) -> Arc<ProgressAggregator> {
        Arc::clone(&self.progress)
    }

    fn sink(&self) -> Arc<dyn ProgressSink> {
        match &self.sink {
            Some(sink) => Arc::clone(sink),
            None if self.options.quiet => Arc::new(SilentSink),
            None => Arc::new(ConsoleSink),
        }
    }

    /// Run the copy.
    ///
    /// Jobs are never cancelled because a sibling failed: every submitted
    /// job runs to completion before this returns.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSource`] if the source is neither a file nor a
    ///   directory. No job is submitted.
    /// - [`Error::MoveCleanup`] if the source tree cannot be removed after a
    ///   successful move.
    /// - [`Error::JobsFailed`] if any job failed, or if a walk, directory
    ///   creation or directory metadata error was not ignored. Such an error
    ///   stops submission; jobs already queued are drained first and the
    ///   error is listed with their failures. It carries the summary of the
    ///   run.
    pub fn execute(&mut self) -> Result<RunSummary> {
        let kind = classify(&self.source)?;

        self.progress.reset();
        let started = Instant::now();
        let sink = self.sink();
        let options = Arc::new(self.options.clone());

        #[cfg(feature = "tracing")]
        tracing::info!(
            "starting run {} -> {} with {} workers",
            self.source.display(),
            self.destination.display(),
            options.parallel
        );

        sink.on_start(&self.source, &self.destination);

        let mut run = Submitter {
            pool: WorkerPool::new(options.parallel)?,
            options: Arc::clone(&options),
            progress: Arc::clone(&self.progress),
            pending: Vec::new(),
            ignored: 0,
            source_dirs: Vec::new(),
            stamp_dirs: Vec::new(),
            uncopied: 0,
        };

        let reporter = if options.quiet {
            None
        } else {
            Some(SpeedReporter::start(
                Arc::clone(&self.progress),
                Arc::clone(&sink),
                options.report_interval,
            )?)
        };

        let submitted = match kind {
            SourceKind::Tree => self.submit_tree(&mut run),
            SourceKind::File => self.submit_file(&mut run),
        };
        let total = run.pending.len();
        sink.on_submitted(total);

        let Submitter {
            pool,
            pending,
            mut ignored,
            source_dirs,
            stamp_dirs,
            uncopied,
            ..
        } = run;
        let mut tally = drain(pool, pending, &options);
        if let Some(reporter) = reporter {
            reporter.stop();
        }
        ignored += tally.ignored;

        // A step that stopped submission is reported next to the drained jobs
        let mut steps = 0;
        if let Err(error) = submitted {
            tally.record(error, &self.source);
            steps += 1;
        }

        // Directory metadata goes on last so file creation cannot disturb it
        for (src_dir, dst_dir) in stamp_dirs.iter().rev() {
            if let Err(source) = copy_metadata(src_dir, dst_dir) {
                let error = Error::Metadata {
                    path: dst_dir.clone(),
                    source,
                };
                if options.ignore_errors {
                    options.warn(&format!("Ignoring error: {error}"));
                    ignored += 1;
                } else {
                    tally.record(error, dst_dir);
                    steps += 1;
                }
            }
        }

        if options.move_files && matches!(kind, SourceKind::Tree) {
            if tally.failures.is_empty() && ignored == 0 && uncopied == 0 {
                fs::remove_dir_all(&self.source).map_err(|source| Error::MoveCleanup {
                    path: self.source.clone(),
                    source,
                })?;
            } else {
                let pruned = prune_empty_dirs(&source_dirs);
                options.warn(&format!(
                    "Source {} kept after move: {} entries were not moved ({} empty directories pruned)",
                    self.source.display(),
                    tally.failures.len() as u64 + ignored + uncopied as u64,
                    pruned
                ));
            }
        }

        let summary = RunSummary {
            elapsed: started.elapsed(),
            bytes_copied: self.progress.copied_bytes(),
            files_copied: tally.files_copied,
            files_purged: options.purge.then(|| self.progress.purged_files()),
            files_skipped: options
                .skip_same_looking
                .then(|| self.progress.skipped_copies()),
            errors_ignored: ignored,
            jobs_failed: tally.failures.len() as u64,
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            "run finished: {} files, {} bytes, {} failed",
            summary.files_copied,
            summary.bytes_copied,
            summary.jobs_failed
        );

        sink.on_finish(&summary);

        if tally.failures.is_empty() {
            Ok(summary)
        } else {
            Err(Error::JobsFailed {
                failed: tally.failures.len(),
                total: total + steps,
                failures: tally.failures,
                summary: Box::new(summary),
            })
        }
    }

    fn submit_tree(&self, run: &mut Submitter) -> Result<()> {
        let walker = TreeWalker::new(&self.source).with_warn_handler(self.options.warn_handler);

        for listing in walker {
            let listing = match listing {
                Ok(listing) => listing,
                Err(e) => {
                    run.gate(e)?;
                    continue;
                }
            };

            run.source_dirs.push(listing.path.clone());
            run.uncopied += listing.other.len();
            let dst_dir = dest_path(&self.destination, &listing.relative);

            if self.options.purge {
                let retained = listing.entry_names().cloned().collect();
                run.purge(dst_dir.clone(), retained);
            }

            if self.options.ignore_empty_dirs && listing.is_empty() {
                continue;
            }

            if let Err(source) = ensure_dir(&dst_dir) {
                run.gate(Error::CreateDirectory {
                    path: dst_dir,
                    source,
                })?;
                continue;
            }

            if self.options.copy_permissions {
                run.stamp_dirs.push((listing.path.clone(), dst_dir.clone()));
            }

            for name in &listing.files {
                run.copy(listing.path.join(name), dst_dir.join(name));
            }
        }

        Ok(())
    }

    fn submit_file(&self, run: &mut Submitter) -> Result<()> {
        let target = if self.destination.is_dir() {
            let name = self
                .source
                .file_name()
                .ok_or_else(|| Error::InvalidSource(self.source.clone()))?;
            self.destination.join(name)
        } else {
            self.destination.clone()
        };

        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if let Err(source) = ensure_dir(&parent) {
            return run.gate(Error::CreateDirectory {
                path: parent,
                source,
            });
        }

        run.copy(self.source.clone(), target.clone());

        if self.options.purge {
            let retained = target.file_name().map(OsString::from).into_iter().collect();
            run.purge(parent, retained);
        }

        Ok(())
    }
}

/// Submission state for one run.
struct Submitter {
    pool: WorkerPool,
    options: Arc<CopyOptions>,
    progress: Arc<ProgressAggregator>,
    pending: Vec<PendingJob>,
    ignored: u64,
    /// Every visited source directory, top-down
    source_dirs: Vec<PathBuf>,
    /// (source, destination) directories whose permissions are copied after draining
    stamp_dirs: Vec<(PathBuf, PathBuf)>,
    /// Source entries that are never copied (linked dirs, broken links, specials)
    uncopied: usize,
}

impl Submitter {
    fn copy(&mut self, src: PathBuf, dst: PathBuf) {
        let options = Arc::clone(&self.options);
        let progress = Arc::clone(&self.progress);
        let path = src.clone();
        let handle = self.pool.submit(move || match copy_one(&src, &dst, &options, &progress) {
            Ok(outcome) => JobOutcome::from(outcome),
            Err(e) => JobOutcome::Failed(e),
        });
        self.pending.push(PendingJob { path, handle });
    }

    fn purge(&mut self, dir: PathBuf, retained: HashSet<OsString>) {
        let progress = Arc::clone(&self.progress);
        let path = dir.clone();
        let handle = self.pool.submit(move || match purge_directory(&dir, &retained, &progress) {
            Ok(removed) => JobOutcome::Purged { removed },
            Err(e) => JobOutcome::Failed(e),
        });
        self.pending.push(PendingJob { path, handle });
    }

    /// Downgrade `error` to a warning if the policy allows it.
    fn gate(&mut self, error: Error) -> Result<()> {
        if self.options.ignore_errors && error.is_ignorable() {
            self.options.warn(&format!("Ignoring error: {error}"));
            self.ignored += 1;
            Ok(())
        } else {
            Err(error)
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    files_copied: u64,
    ignored: u64,
    failures: Vec<JobFailure>,
}

impl Tally {
    /// Record a failure raised outside a job, keyed by the path it names.
    fn record(&mut self, error: Error, fallback: &Path) {
        let path = error.path().unwrap_or(fallback).to_path_buf();
        #[cfg(feature = "tracing")]
        tracing::error!("{}: {}", path.display(), error);
        self.failures.push(JobFailure { path, error });
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn drain(pool: WorkerPool, pending: Vec<PendingJob>, options: &CopyOptions) -> Tally {
    let (paths, handles): (Vec<_>, Vec<_>) =
        pending.into_iter().map(|job| (job.path, job.handle)).unzip();

    let mut tally = Tally::default();
    for (path, outcome) in paths.into_iter().zip(pool.drain(handles)) {
        match outcome {
            Some(JobOutcome::Copied { bytes }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("copied {} ({} bytes)", path.display(), bytes);
                tally.files_copied += 1;
            }
            Some(JobOutcome::Skipped) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("skipped {}", path.display());
            }
            Some(JobOutcome::Purged { removed }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("purged {} entries under {}", removed, path.display());
            }
            Some(JobOutcome::Ignored(error)) => {
                options.warn(&format!("Ignoring error: {error}"));
                tally.ignored += 1;
            }
            Some(JobOutcome::Failed(error)) => {
                #[cfg(feature = "tracing")]
                tracing::error!("{}: {}", path.display(), error);
                tally.failures.push(JobFailure { path, error });
            }
            None => {
                let error = Error::JobPanicked(path.clone());
                tally.failures.push(JobFailure { path, error });
            }
        }
    }
    tally
}

// =============================================================================
// Tests
// =============================================================================
