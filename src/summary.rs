//! Run summary record and its human-readable rendering.

use crate::utils::size::{format_bytes, format_rate};
use std::fmt;
use std::time::Duration;

/// Statistics from a completed [`Copier::execute`](crate::Copier::execute) run.
///
/// The [`Display`](fmt::Display) implementation renders the console report:
///
/// ```text
/// --------------------
/// Total Runtime:       0.42 seconds
/// Total Data Copied:   12.00 MB
/// Avg Speed:           28.57 MB per second
/// Files Copied:        118
/// Purged File Count:   3
/// Skipped Copy Count:  7
/// ```
///
/// The purge and skip lines only appear when those policies were enabled.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Bytes streamed into destination files
    pub bytes_copied: u64,
    /// Files whose copy job completed
    pub files_copied: u64,
    /// Destination files removed by purge jobs (`None` if purge was off)
    pub files_purged: Option<u64>,
    /// Copies skipped as same-looking (`None` if the check was off)
    pub files_skipped: Option<u64>,
    /// Failures downgraded to warnings by `ignore_errors`
    pub errors_ignored: u64,
    /// Jobs that failed
    pub jobs_failed: u64,
}

impl RunSummary {
    /// Average throughput in bytes per second over the whole run.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_copied as f64 / secs
        } else {
            0.0
        }
    }

    /// Whether every submitted job completed without a propagated failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.jobs_failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(20))?;
        writeln!(f, "Total Runtime:       {:.2} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "Total Data Copied:   {}", format_bytes(self.bytes_copied))?;
        writeln!(f, "Avg Speed:           {} per second", format_rate(self.throughput()))?;
        write!(f, "Files Copied:        {}", self.files_copied)?;
        if let Some(purged) = self.files_purged {
            write!(f, "\nPurged File Count:   {purged}")?;
        }
        if let Some(skipped) = self.files_skipped {
            write!(f, "\nSkipped Copy Count:  {skipped}")?;
        }
        if self.errors_ignored > 0 {
            write!(f, "\nIgnored Errors:      {}", self.errors_ignored)?;
        }
        if self.jobs_failed > 0 {
            write!(f, "\nFailed Jobs:         {}", self.jobs_failed)?;
        }
        Ok(())
    }
}
