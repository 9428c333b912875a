//! Core library for batch image conversion using external encoders.
//!
//! This crate walks an input directory tree, converts every image with a
//! convertible extension into a single target format (JPEG, WebP or AVIF)
//! on a fixed-size worker pool, copies everything else through unchanged,
//! and mirrors the directory structure under an output root. Existing
//! outputs are skipped, so re-running over the same trees only does the
//! work that is still missing.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use imgpress_core::{CoreConfigBuilder, ProcessRunner, TargetFormat, run_pipeline};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let config = CoreConfigBuilder::new()
//!     .input_dir(PathBuf::from("/path/to/photos"))
//!     .output_dir(PathBuf::from("/path/to/compressed"))
//!     .target_format(TargetFormat::Webp)
//!     .worker_count(4)
//!     .build()
//!     .unwrap();
//!
//! let summary = run_pipeline(config, Arc::new(ProcessRunner)).unwrap();
//! println!("{summary}");
//! ```

pub mod config;
pub mod conversion;
pub mod discovery;
pub mod error;
pub mod error_log;
pub mod external;
pub mod job;
pub mod pipeline;
pub mod pool;
pub mod progress;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, TargetFormat, ToolPaths};
pub use conversion::run_conversion_job;
pub use discovery::{FileAction, InputTree};
pub use error::{CoreError, CoreResult};
pub use error_log::ErrorLog;
pub use external::{ProcessRunner, ToolRunner, ToolStep, check_dependency};
pub use job::{JobDescriptor, JobOutcome};
pub use pipeline::{Pipeline, PipelineContext, run_pipeline};
pub use pool::WorkerPool;
pub use progress::{Completion, Milestone, ProgressReporter, RunSummary};
pub use utils::format_duration;
