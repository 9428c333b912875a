// ============================================================================
// imgpress-core/src/pool.rs
// ============================================================================
//
// WORKER POOL: Fixed-Size Execution of Conversion Jobs
//
// This module owns the worker threads that run conversion jobs. The number
// of threads is fixed when the pool is built. Jobs are queued as they are
// submitted (no admission control beyond the worker count) and each job
// sends exactly one JobOutcome into a completion channel, which the caller
// drains in completion order.
//
// KEY COMPONENTS:
// - WorkerPool: Accepts jobs and hands out finished outcomes
// - Completions: Blocking iterator over the outcomes still outstanding
//
// GUARANTEES:
// - At most `worker_count` jobs run at once
// - Every submitted descriptor yields exactly one outcome, even if the job
//   panics (the panic becomes a failed outcome)
// - Completions::next() blocks until all submitted jobs have reported

// ---- Internal crate imports ----
use crate::conversion::panic_message;
use crate::error::{CoreError, CoreResult};
use crate::job::{JobDescriptor, JobOutcome};

// ---- External crate imports ----
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

// ---- Standard library imports ----
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Bounded pool running conversion jobs on dedicated worker threads.
pub struct WorkerPool {
    pool: ThreadPool,
    sender: Sender<JobOutcome>,
    receiver: Receiver<JobOutcome>,
    worker_count: usize,
    submitted: usize,
    received: usize,
}

impl WorkerPool {
    /// Builds a pool with `worker_count` threads.
    pub fn new(worker_count: usize) -> CoreResult<Self> {
        if worker_count == 0 {
            return Err(CoreError::Config("worker count must be at least 1".to_string()));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|index| format!("imgpress-worker-{index}"))
            .build()
            .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize thread pool: {e}")))?;

        let (sender, receiver) = mpsc::channel();
        debug!("Worker pool started with {worker_count} threads");

        Ok(Self {
            pool,
            sender,
            receiver,
            worker_count,
            submitted: 0,
            received: 0,
        })
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of jobs submitted so far.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Number of submitted jobs whose outcome has not been handed out yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.submitted - self.received
    }

    /// Queues a job. It starts as soon as a worker is free.
    pub fn submit<F>(&mut self, descriptor: JobDescriptor, job: F)
    where
        F: FnOnce(JobDescriptor) -> JobOutcome + Send + 'static,
    {
        let sender = self.sender.clone();
        self.submitted += 1;

        self.pool.spawn(move || {
            let fallback = descriptor.clone();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(descriptor)))
                .unwrap_or_else(|payload| {
                    JobOutcome::failure(fallback, CoreError::JobPanicked(panic_message(payload.as_ref())))
                });
            // The receiver lives as long as the pool, so this only fails if
            // the caller dropped the pool without draining it.
            if sender.send(outcome).is_err() {
                debug!("Completion dropped: pool receiver is gone");
            }
        });
    }

    /// Returns an already finished outcome without blocking, if any.
    pub fn try_next_completed(&mut self) -> Option<JobOutcome> {
        if self.pending() == 0 {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.received += 1;
                Some(outcome)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stops accepting jobs and returns the outstanding outcomes. Iterating
    /// the result to the end waits for every in-flight job.
    pub fn finish(self) -> Completions {
        let remaining = self.pending();
        drop(self.sender);
        Completions {
            _pool: self.pool,
            receiver: self.receiver,
            remaining,
        }
    }
}

/// Outcomes of jobs still running when the pool was finished, in
/// completion order.
pub struct Completions {
    _pool: ThreadPool,
    receiver: Receiver<JobOutcome>,
    remaining: usize,
}

impl Completions {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for Completions {
    type Item = JobOutcome;

    fn next(&mut self) -> Option<JobOutcome> {
        if self.remaining == 0 {
            return None;
        }
        let outcome = self.receiver.recv().ok()?;
        self.remaining -= 1;
        Some(outcome)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetFormat;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn descriptor(i: usize) -> JobDescriptor {
        JobDescriptor {
            source_path: PathBuf::from(format!("/in/{i}.png")),
            dest_path: PathBuf::from(format!("/out/{i}.jpg")),
            target_format: TargetFormat::Jpg,
            source_extension: ".png".to_string(),
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(WorkerPool::new(0).is_err());
    }

    #[test]
    fn test_every_job_reports_exactly_once() {
        let mut pool = WorkerPool::new(3).unwrap();
        for i in 0..25 {
            pool.submit(descriptor(i), |d| {
                thread::sleep(Duration::from_millis(2));
                JobOutcome::success(d)
            });
        }
        assert_eq!(pool.submitted(), 25);

        let outcomes: Vec<JobOutcome> = pool.finish().collect();
        assert_eq!(outcomes.len(), 25);
        let unique: HashSet<PathBuf> = outcomes.iter().map(|o| o.descriptor.source_path.clone()).collect();
        assert_eq!(unique.len(), 25);
        assert!(outcomes.iter().all(JobOutcome::is_success));
    }

    #[test]
    fn test_concurrency_never_exceeds_worker_count() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(2).unwrap();

        for i in 0..12 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(descriptor(i), move |d| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                running.fetch_sub(1, Ordering::SeqCst);
                JobOutcome::success(d)
            });
        }

        assert_eq!(pool.finish().count(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_job_becomes_failed_outcome() {
        let mut pool = WorkerPool::new(2).unwrap();
        pool.submit(descriptor(0), |_| panic!("boom"));
        pool.submit(descriptor(1), JobOutcome::success);

        let outcomes: Vec<JobOutcome> = pool.finish().collect();
        assert_eq!(outcomes.len(), 2);
        let failed: Vec<&JobOutcome> = outcomes.iter().filter(|o| !o.is_success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].descriptor, descriptor(0));
        assert!(matches!(failed[0].error(), Some(CoreError::JobPanicked(msg)) if msg == "boom"));
    }

    #[test]
    fn test_try_next_completed_then_finish_accounts_for_all() {
        let mut pool = WorkerPool::new(2).unwrap();
        assert!(pool.try_next_completed().is_none());
        for i in 0..6 {
            pool.submit(descriptor(i), JobOutcome::success);
        }

        let mut seen = 0;
        thread::sleep(Duration::from_millis(50));
        while pool.try_next_completed().is_some() {
            seen += 1;
        }
        let rest = pool.finish();
        let remaining = rest.remaining();
        assert_eq!(seen + rest.count(), 6);
        assert_eq!(seen + remaining, 6);
    }
}
