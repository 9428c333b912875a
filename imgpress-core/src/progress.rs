// ============================================================================
// imgpress-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Completion Counting and Milestone Summaries
//
// The reporter owns the run's counters. Every processed file (converted,
// failed, skipped or copied) is recorded once; every Nth record emits a
// milestone summary with the time since the previous milestone and since
// the start of the run. The milestone check happens under the same lock as
// the increment, so concurrent recorders can neither miss nor duplicate a
// milestone.
//
// KEY COMPONENTS:
// - ProgressReporter: Thread-safe counter with milestone callbacks
// - Completion: How a file finished
// - Milestone: Snapshot emitted every N completions
// - RunSummary: Final totals for one run

// ---- External crate imports ----
use log::info;

// ---- Standard library imports ----
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::utils::format_duration;

/// How a discovered file was accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A conversion job published its output.
    Converted,
    /// A conversion job (or a copy) failed.
    Failed,
    /// Converted output already existed.
    Skipped,
    /// Non-convertible file copied through.
    Copied,
}

/// Periodic progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub processed: usize,
    pub total: usize,
    pub since_last: Duration,
    pub since_start: Duration,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} / {}, current epoch used {} seconds, total used {} seconds.",
            self.processed,
            self.total,
            self.since_last.as_secs(),
            self.since_start.as_secs()
        )
    }
}

/// Final totals of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub copied: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} / {} ({} converted, {} skipped, {} copied, {} failed) in {}",
            self.processed,
            self.total,
            self.converted,
            self.skipped,
            self.copied,
            self.failed,
            format_duration(self.elapsed)
        )
    }
}

/// Mutable counters of one run. Only touched under the reporter's lock.
#[derive(Debug)]
struct ProgressState {
    processed: usize,
    converted: usize,
    failed: usize,
    skipped: usize,
    copied: usize,
    epoch_start: Instant,
    last_milestone: Instant,
}

type MilestoneCallback = Box<dyn Fn(&Milestone) + Send + Sync>;

/// Aggregates completions and emits milestone summaries.
pub struct ProgressReporter {
    total_files: usize,
    milestone_interval: usize,
    state: Mutex<ProgressState>,
    on_milestone: Option<MilestoneCallback>,
}

impl ProgressReporter {
    /// Creates a reporter for a run with a known number of files.
    /// A zero interval is treated as 1.
    pub fn new(total_files: usize, milestone_interval: usize) -> Self {
        let now = Instant::now();
        Self {
            total_files,
            milestone_interval: milestone_interval.max(1),
            state: Mutex::new(ProgressState {
                processed: 0,
                converted: 0,
                failed: 0,
                skipped: 0,
                copied: 0,
                epoch_start: now,
                last_milestone: now,
            }),
            on_milestone: None,
        }
    }

    /// Registers a callback invoked with every milestone, in addition to logging.
    pub fn with_milestone_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Milestone) + Send + Sync + 'static,
    {
        self.on_milestone = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Records one finished file. Returns the milestone if this record hit one.
    pub fn record(&self, completion: Completion) -> Option<Milestone> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.processed += 1;
        match completion {
            Completion::Converted => state.converted += 1,
            Completion::Failed => state.failed += 1,
            Completion::Skipped => state.skipped += 1,
            Completion::Copied => state.copied += 1,
        }

        if state.processed % self.milestone_interval != 0 {
            return None;
        }

        let now = Instant::now();
        let milestone = Milestone {
            processed: state.processed,
            total: self.total_files,
            since_last: now.duration_since(state.last_milestone),
            since_start: now.duration_since(state.epoch_start),
        };
        state.last_milestone = now;

        info!("{milestone}");
        if let Some(callback) = &self.on_milestone {
            callback(&milestone);
        }
        Some(milestone)
    }

    /// Number of files recorded so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).processed
    }

    /// Final totals. Logs the closing summary line.
    pub fn finish(&self) -> RunSummary {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let summary = RunSummary {
            processed: state.processed,
            total: self.total_files,
            converted: state.converted,
            failed: state.failed,
            skipped: state.skipped,
            copied: state.copied,
            elapsed: state.epoch_start.elapsed(),
        };
        info!("{summary}");
        summary
    }
}
