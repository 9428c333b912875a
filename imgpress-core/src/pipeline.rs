// ============================================================================
// imgpress-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Orchestration of One Conversion Run
//
// This module wires the components of a run together:
//
// 1. Validate the configuration and create the output root
// 2. Pre-scan the input tree so progress has a stable denominator
// 3. Walk the tree on the calling thread, classifying each file:
//    - convertible, output missing  -> submit a job to the worker pool
//    - convertible, output present  -> count as skipped
//    - anything else                -> copy inline
// 4. Feed every job outcome to the progress reporter as it arrives, and
//    record failures in the error log
// 5. Wait for all in-flight jobs, then return the run summary
//
// All per-run state lives in a PipelineContext created for that run, so
// several runs can happen in one process without sharing counters.

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::conversion::run_conversion_job;
use crate::discovery::{
    DestinationClaims, FileAction, InputTree, classify, copy_preserving_metadata, ensure_parent_dir,
};
use crate::error::{CoreError, CoreResult, path_io_error};
use crate::error_log::ErrorLog;
use crate::external::ToolRunner;
use crate::job::JobOutcome;
use crate::pool::WorkerPool;
use crate::progress::{Completion, Milestone, ProgressReporter, RunSummary};

// ---- External crate imports ----
use log::{debug, error, info, warn};

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration and mutable state of a single run.
pub struct PipelineContext {
    pub config: Arc<CoreConfig>,
    pub reporter: ProgressReporter,
    pub error_log: ErrorLog,
}

impl PipelineContext {
    pub fn new(config: CoreConfig, total_files: usize) -> Self {
        let reporter = ProgressReporter::new(total_files, config.milestone_interval);
        let error_log = ErrorLog::new(config.error_log_path());
        Self {
            config: Arc::new(config),
            reporter,
            error_log,
        }
    }

    /// Records a failed file: console, error log and progress counters.
    fn record_failure(&self, source: &Path, err: &CoreError) {
        match err {
            CoreError::JobPanicked(_) => {
                error!("Unexpected fault while processing {}: {err}", source.display());
            }
            _ => error!("Failed to process {}: {err}", source.display()),
        }
        self.error_log.record(source, &err.to_string());
        self.reporter.record(Completion::Failed);
    }
}

/// A prepared run: configuration validated, output root created and the
/// input tree pre-scanned.
pub struct Pipeline<R: ToolRunner + ?Sized + 'static> {
    context: PipelineContext,
    tree: InputTree,
    runner: Arc<R>,
}

impl<R: ToolRunner + ?Sized + 'static> Pipeline<R> {
    /// Validates `config`, creates the output root and counts the input files.
    pub fn prepare(config: CoreConfig, runner: Arc<R>) -> CoreResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| path_io_error("create output directory", &config.output_dir, e))?;

        let tree = InputTree::open(&config)?;
        let total_files = tree.count_files();
        info!(
            "Found {total_files} file(s) under {} (target: {}, workers: {})",
            tree.root().display(),
            config.target_format,
            config.worker_count
        );

        Ok(Self {
            context: PipelineContext::new(config, total_files),
            tree,
            runner,
        })
    }

    /// Number of files found by the pre-scan.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.context.reporter.total_files()
    }

    /// Registers a callback invoked at each progress milestone.
    pub fn on_milestone<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Milestone) + Send + Sync + 'static,
    {
        let total = self.context.reporter.total_files();
        let interval = self.context.config.milestone_interval;
        self.context.reporter = ProgressReporter::new(total, interval).with_milestone_callback(callback);
        self
    }

    /// Runs to completion. Individual file failures are recorded, not returned.
    pub fn run(self) -> CoreResult<RunSummary> {
        let Self {
            context,
            tree,
            runner,
        } = self;

        let mut pool = WorkerPool::new(context.config.worker_count)?;
        let mut claims = DestinationClaims::new();
        // The error log shares the output root; no source may be mirrored onto it.
        claims.claim(context.error_log.path(), context.error_log.path())?;

        for entry in tree.files() {
            match entry {
                Ok(source) => dispatch(&context, tree.root(), &runner, &mut pool, &mut claims, source),
                Err(e) => {
                    let path = walk_error_path(&e).unwrap_or_else(|| tree.root().to_path_buf());
                    warn!("Skipping unreadable entry {}: {e}", path.display());
                    context.error_log.record(&path, &e.to_string());
                }
            }

            while let Some(outcome) = pool.try_next_completed() {
                handle_outcome(&context, outcome);
            }
        }

        debug!("Traversal finished; waiting for {} job(s)", pool.pending());
        for outcome in pool.finish() {
            handle_outcome(&context, outcome);
        }

        Ok(context.reporter.finish())
    }
}

/// Runs the whole pipeline for `config` with the given tool runner.
pub fn run_pipeline<R: ToolRunner + ?Sized + 'static>(config: CoreConfig, runner: Arc<R>) -> CoreResult<RunSummary> {
    Pipeline::prepare(config, runner)?.run()
}

fn dispatch<R: ToolRunner + ?Sized + 'static>(
    context: &PipelineContext,
    input_root: &Path,
    runner: &Arc<R>,
    pool: &mut WorkerPool,
    claims: &mut DestinationClaims,
    source: PathBuf,
) {
    let action = match classify(&context.config, input_root, &source) {
        Ok(action) => action,
        Err(e) => return context.record_failure(&source, &e),
    };
    if let Err(e) = claims.claim_all(&action.reserved_paths(), &source) {
        return context.record_failure(&source, &e);
    }

    match action {
        FileAction::SkipExisting { dest_path } => {
            debug!("Skipping {}: {} exists", source.display(), dest_path.display());
            context.reporter.record(Completion::Skipped);
        }
        FileAction::Copy {
            source_path,
            dest_path,
        } => {
            let copied = ensure_parent_dir(&dest_path)
                .and_then(|()| copy_preserving_metadata(&source_path, &dest_path));
            match copied {
                Ok(bytes) => {
                    debug!("Copied {} ({bytes} bytes)", source_path.display());
                    context.reporter.record(Completion::Copied);
                }
                Err(e) => context.record_failure(&source_path, &e),
            }
        }
        FileAction::Convert(job) => {
            if let Err(e) = ensure_parent_dir(&job.dest_path) {
                return context.record_failure(&source, &e);
            }
            let runner = Arc::clone(runner);
            let config = Arc::clone(&context.config);
            pool.submit(job, move |descriptor| {
                run_conversion_job(runner.as_ref(), &config, descriptor)
            });
        }
    }
}

fn handle_outcome(context: &PipelineContext, outcome: JobOutcome) {
    match &outcome.result {
        Ok(()) => {
            debug!("Converted {}", outcome.descriptor.source_path.display());
            context.reporter.record(Completion::Converted);
        }
        Err(e) => context.record_failure(&outcome.descriptor.source_path, e),
    }
}

fn walk_error_path(err: &CoreError) -> Option<PathBuf> {
    match err {
        CoreError::Walkdir(e) => e.path().map(Path::to_path_buf),
        _ => None,
    }
}
