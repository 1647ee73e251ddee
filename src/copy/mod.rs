//! Core copy operations.
//!
//! Per-file copying, destination purging and the run orchestration that
//! schedules both onto the worker pool.

mod file;
mod orchestrator;
mod purge;
mod utils;

pub use orchestrator::Copier;
