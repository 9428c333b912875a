// ============================================================================
// imgpress-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Invocation of the Converter and Metadata Tools
//
// This module encapsulates every interaction with external command-line
// tools (cjpegli, cwebp, avifenc, exiftool). A step is described as a plain
// value (ToolStep) and executed through the ToolRunner trait, so the
// conversion job can be exercised in tests with a stub runner.
//
// KEY COMPONENTS:
// - ToolStep: Program plus arguments for one invocation
// - ToolRunner: Trait for executing a step and reporting success/failure
// - ProcessRunner: Concrete implementation using std::process
// - check_dependency: Verifies a tool can be spawned before a run
//
// CONTRACT:
// A step succeeds when the process exits with status zero. Its stdout and
// stderr are discarded. Failures are returned as CoreError values and never
// escape as panics.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};

// ---- External crate imports ----
use log::debug;

// ---- Standard library imports ----
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

/// Builders for the concrete converter and metadata steps
pub mod commands;

pub use commands::{convert_step, strip_metadata_step, tag_step};

// ============================================================================
// TOOL STEP
// ============================================================================

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStep {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolStep {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Arguments rendered lossily, for logs and error messages.
    #[must_use]
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.display_args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ============================================================================
// RUNNER ABSTRACTION
// ============================================================================

/// Something that can execute a [`ToolStep`].
///
/// Implementations are shared by every worker thread.
pub trait ToolRunner: Send + Sync {
    /// Runs the step to completion. `Ok(())` means a zero exit status.
    fn run(&self, step: &ToolStep) -> CoreResult<()>;
}

/// Runs steps as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, step: &ToolStep) -> CoreResult<()> {
        debug!("Running: {step}");

        let status = Command::new(&step.program)
            .args(&step.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| command_start_error(&step.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(command_failed_error(&step.program, &step.display_args(), status))
        }
    }
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that a required external command can be spawned.
///
/// The command is run once with `check_arg` (typically a version flag) and
/// its exit status is ignored; only a failure to start it counts.
pub fn check_dependency(cmd_name: &str, check_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(check_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(command_start_error(cmd_name, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_step_display() {
        let step = ToolStep::new("exiftool")
            .arg("-overwrite_original")
            .arg("-all=")
            .arg("photo.jpg");
        assert_eq!(step.to_string(), "exiftool -overwrite_original -all= photo.jpg");
        assert_eq!(step.display_args().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_exit_status() {
        assert!(ProcessRunner.run(&ToolStep::new("true")).is_ok());

        let err = ProcessRunner.run(&ToolStep::new("false").arg("x")).unwrap_err();
        match err {
            CoreError::ExternalTool { tool, args, status } => {
                assert_eq!(tool, "false");
                assert_eq!(args, vec!["x".to_string()]);
                assert_eq!(status, "exit code 1");
            }
            other => panic!("Unexpected error type: {other:?}"),
        }
    }

    #[test]
    fn test_process_runner_missing_program() {
        let err = ProcessRunner
            .run(&ToolStep::new("surely-not-an-installed-tool-42"))
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandStart { .. }));
    }

    #[test]
    fn test_check_dependency_not_found() {
        let result = check_dependency("surely-not-an-installed-tool-42", "--version");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }
}
