//! Bounded worker pool with per-job completion handles.
//!
//! Each run owns exactly one [`WorkerPool`]: it is built when the run starts
//! and dropped when the run ends, on every exit path. Jobs are submitted
//! without waiting and resolve through a [`JobHandle`].

use crate::error::Result;
use crossbeam_channel::{Receiver, bounded};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A fixed-size pool of worker threads backed by rayon.
pub(crate) struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `workers` threads (at least one).
    pub(crate) fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bulkcopy-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Queue a job and return immediately.
    ///
    /// A panicking job resolves its handle to `None` instead of tearing
    /// down the worker.
    pub(crate) fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.pool.spawn(move || {
            if let Ok(value) = catch_unwind(AssertUnwindSafe(job)) {
                // The receiver may already be gone if the caller gave up on the handle.
                let _ = tx.send(value);
            }
        });
        JobHandle { rx }
    }

    /// Wait for every handle in submission order, then release the pool.
    pub(crate) fn drain<T, I>(self, handles: I) -> Vec<Option<T>>
    where
        I: IntoIterator<Item = JobHandle<T>>,
    {
        let results = handles.into_iter().map(JobHandle::join).collect();
        drop(self);
        results
    }
}

/// Completion handle for a submitted job.
#[derive(Debug)]
pub(crate) struct JobHandle<T> {
    rx: Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Block until the job has run. `None` means the job panicked.
    pub(crate) fn join(self) -> Option<T> {
        self.rx.recv().ok()
    }
}
