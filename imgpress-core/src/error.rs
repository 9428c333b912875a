// ============================================================================
// imgpress-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for imgpress-core
//
// This module defines the error type shared by every stage of the pipeline.
// External tool failures, filesystem failures and unexpected job faults are
// all carried as values so that a failing job can be turned into a failed
// outcome instead of tearing down the worker pool.
//
// KEY COMPONENTS:
// - CoreError: Main error enum for the library
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper functions for building command errors

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced by imgpress-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An external tool ran but exited with a non-zero status.
    #[error("'{tool}' failed ({status}) with arguments [{}]", .args.join(" "))]
    ExternalTool {
        tool: String,
        args: Vec<String>,
        status: String,
    },

    /// An external tool could not be spawned or waited on.
    #[error("Failed to run '{tool}': {source}")]
    CommandStart {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A filesystem operation failed on a known path.
    #[error("{operation} failed for {}: {source}", .path.display())]
    PathIo {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directory traversal error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required tool not found: {0}")]
    DependencyNotFound(String),

    /// A job faulted in a way none of the other variants describe.
    #[error("Job panicked: {0}")]
    JobPanicked(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl CoreError {
    /// Whether the error came from an external tool invocation.
    #[must_use]
    pub fn is_external_tool_failure(&self) -> bool {
        matches!(
            self,
            CoreError::ExternalTool { .. } | CoreError::CommandStart { .. }
        )
    }

    /// Whether the error came from a filesystem operation.
    #[must_use]
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Io(_) | CoreError::PathIo { .. } | CoreError::Walkdir(_)
        )
    }
}

/// Result type for imgpress-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a tool that exited unsuccessfully.
pub fn command_failed_error(tool: &str, args: &[String], status: ExitStatus) -> CoreError {
    let status = match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    };
    CoreError::ExternalTool {
        tool: tool.to_string(),
        args: args.to_vec(),
        status,
    }
}

/// Builds the error for a tool that could not be started.
pub fn command_start_error(tool: &str, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        tool: tool.to_string(),
        source,
    }
}

/// Attaches a path and operation name to an I/O error.
pub fn path_io_error(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> CoreError {
    CoreError::PathIo {
        operation,
        path: path.into(),
        source,
    }
}
