//! Progress accounting and throughput reporting.
//!
//! Workers update a shared [`ProgressAggregator`] with atomic adds. A
//! dedicated reporter thread samples it on a timer and hands a
//! [`SpeedSample`] to the active [`ProgressSink`], so waiting for jobs and
//! printing progress never block each other.

use crate::summary::RunSummary;
use crate::utils::size::format_rate;
use crossbeam_channel::{Sender, bounded, select, tick};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Thread-safe run counters.
///
/// Counters only grow during a run and are reset at the start of each
/// [`Copier::execute`](crate::Copier::execute). They can be read at any
/// time, including from another thread while a run is in flight.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    bytes_copied: AtomicU64,
    files_purged: AtomicU64,
    copies_skipped: AtomicU64,
}

impl ProgressAggregator {
    /// Create a zeroed aggregator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&self) {
        self.bytes_copied.store(0, Ordering::Relaxed);
        self.files_purged.store(0, Ordering::Relaxed);
        self.copies_skipped.store(0, Ordering::Relaxed);
    }

    pub(crate) fn add_copied_bytes(&self, bytes: u64) {
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn add_purged_files(&self, count: u64) {
        self.files_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_skipped_copies(&self, count: u64) {
        self.copies_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Bytes copied so far
    #[must_use]
    pub fn copied_bytes(&self) -> u64 {
        self.bytes_copied.load(Ordering::Relaxed)
    }

    /// Destination files purged so far
    #[must_use]
    pub fn purged_files(&self) -> u64 {
        self.files_purged.load(Ordering::Relaxed)
    }

    /// Copies skipped as same-looking so far
    #[must_use]
    pub fn skipped_copies(&self) -> u64 {
        self.copies_skipped.load(Ordering::Relaxed)
    }
}

/// One throughput measurement taken by the reporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    /// Bytes per second since the previous sample
    pub bytes_per_sec: f64,
    /// Total bytes copied so far
    pub total_bytes: u64,
}

/// Reporter-owned state: when the last report happened and what it saw.
#[derive(Debug)]
pub(crate) struct ProgressState {
    last_report: Instant,
    reported_bytes: u64,
}

impl ProgressState {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            last_report: now,
            reported_bytes: 0,
        }
    }

    /// Compute the rate since the previous sample and advance the snapshot.
    pub(crate) fn sample(&mut self, total_bytes: u64, now: Instant) -> SpeedSample {
        let delta = total_bytes.saturating_sub(self.reported_bytes);
        let secs = now.saturating_duration_since(self.last_report).as_secs_f64();
        let bytes_per_sec = if secs > 0.0 { delta as f64 / secs } else { 0.0 };
        self.reported_bytes = total_bytes;
        self.last_report = now;
        SpeedSample {
            bytes_per_sec,
            total_bytes,
        }
    }
}

/// Receiver of run lifecycle and progress events.
///
/// All methods default to no-ops. Implementations must be cheap: `on_speed`
/// is called from the reporter thread on every tick.
pub trait ProgressSink: Send + Sync {
    /// Called before any job is submitted
    fn on_start(&self, _source: &Path, _destination: &Path) {}
    /// Called once every job has been submitted
    fn on_submitted(&self, _jobs: usize) {}
    /// Called on each reporter tick
    fn on_speed(&self, _sample: &SpeedSample) {}
    /// Called with the final summary
    fn on_finish(&self, _summary: &RunSummary) {}
}

/// Sink that produces no output. Used for quiet runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ProgressSink for SilentSink {}

/// Sink that writes progress lines and the summary to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_start(&self, source: &Path, destination: &Path) {
        let mut out = io::stdout().lock();
        let _ = writeln!(
            out,
            "Submitting operations for {} -> {}",
            source.display(),
            destination.display()
        );
    }

    fn on_submitted(&self, jobs: usize) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\r{:<50}", format!("Operation submission complete! ({jobs} jobs)"));
        let _ = out.flush();
    }

    fn on_speed(&self, sample: &SpeedSample) {
        let mut out = io::stdout().lock();
        let line = format!("Speed: ~{} per second", format_rate(sample.bytes_per_sec));
        let _ = write!(out, "\r{line:<50}");
        let _ = out.flush();
    }

    fn on_finish(&self, summary: &RunSummary) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out);
        let _ = writeln!(out, "{summary}");
    }
}

/// Sink that drives an indicatif spinner (requires `progress` feature)
#[cfg(feature = "progress")]
pub struct SpinnerSink {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "progress")]
impl SpinnerSink {
    /// Create a spinner that ticks on its own every 100ms
    #[must_use]
    pub fn new() -> Self {
        Self {
            bar: create_speed_spinner(),
        }
    }
}

#[cfg(feature = "progress")]
impl Default for SpinnerSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ProgressSink for SpinnerSink {
    fn on_start(&self, source: &Path, destination: &Path) {
        self.bar.set_message(format!(
            "Submitting {} -> {}",
            source.display(),
            destination.display()
        ));
    }

    fn on_submitted(&self, jobs: usize) {
        self.bar.set_message(format!("{jobs} jobs submitted"));
    }

    fn on_speed(&self, sample: &SpeedSample) {
        self.bar.set_message(format!(
            "~{} per second ({} copied)",
            format_rate(sample.bytes_per_sec),
            crate::utils::size::format_bytes(sample.total_bytes)
        ));
    }

    fn on_finish(&self, summary: &RunSummary) {
        self.bar.finish_and_clear();
        println!("{summary}");
    }
}

/// Create the spinner used by [`SpinnerSink`]
#[cfg(feature = "progress")]
#[must_use]
pub fn create_speed_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Background thread that samples the aggregator on a fixed interval.
///
/// Dropping the reporter stops the thread and joins it.
pub(crate) struct SpeedReporter {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SpeedReporter {
    pub(crate) fn start(
        progress: Arc<ProgressAggregator>,
        sink: Arc<dyn ProgressSink>,
        interval: Duration,
    ) -> io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let thread = thread::Builder::new()
            .name("bulkcopy-progress".to_owned())
            .spawn(move || {
                let ticker = tick(interval);
                let mut state = ProgressState::new(Instant::now());
                loop {
                    select! {
                        recv(ticker) -> now => {
                            let now = now.unwrap_or_else(|_| Instant::now());
                            let sample = state.sample(progress.copied_bytes(), now);
                            sink.on_speed(&sample);
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the channel wakes the select above.
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SpeedReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
