// ============================================================================
// imgpress-core/src/conversion.rs
// ============================================================================
//
// CONVERSION JOB: One Source File In, One Published Output Out
//
// This module turns a JobDescriptor into exactly one JobOutcome by running
// the external steps in order:
//
// 1. Remove a stale temporary file left by an earlier failed attempt
// 2. Strip metadata from the source (best effort, skipped for PNG)
// 3. Convert the source into the temporary sibling of the destination
// 4. Tag the temporary file, then rename it onto the destination
//
// The rename is the publish point: the destination name never refers to a
// partially written file. When step 3 or 4 fails the temporary file is
// removed and the error is carried in the outcome.

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, path_io_error};
use crate::external::{ToolRunner, convert_step, strip_metadata_step, tag_step};
use crate::job::{JobDescriptor, JobOutcome};

// ---- External crate imports ----
use log::debug;

// ---- Standard library imports ----
use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Source extensions whose files carry no metadata worth stripping.
const NO_STRIP_EXTENSIONS: [&str; 1] = [".png"];

/// Runs one conversion job. Never panics and never returns early without
/// an outcome; an unexpected fault inside the job becomes a failed outcome.
pub fn run_conversion_job<R>(runner: &R, config: &CoreConfig, descriptor: JobDescriptor) -> JobOutcome
where
    R: ToolRunner + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| convert(runner, config, &descriptor)))
        .unwrap_or_else(|payload| Err(CoreError::JobPanicked(panic_message(payload.as_ref()))));

    match result {
        Ok(()) => JobOutcome::success(descriptor),
        Err(e) => {
            // The temp file may survive a panic between convert and publish.
            if let Err(cleanup) = remove_if_exists(&descriptor.temp_path()) {
                debug!("Could not remove temp file after failure: {cleanup}");
            }
            JobOutcome::failure(descriptor, e)
        }
    }
}

fn convert<R>(runner: &R, config: &CoreConfig, descriptor: &JobDescriptor) -> CoreResult<()>
where
    R: ToolRunner + ?Sized,
{
    let temp_path = descriptor.temp_path();
    remove_if_exists(&temp_path)?;

    if should_strip_metadata(&descriptor.source_extension) {
        let step = strip_metadata_step(config, &descriptor.source_path);
        if let Err(e) = runner.run(&step) {
            debug!(
                "Metadata strip skipped for {}: {e}",
                descriptor.source_path.display()
            );
        }
    }

    runner.run(&convert_step(
        config,
        descriptor.target_format,
        &descriptor.source_path,
        &temp_path,
    ))?;
    runner.run(&tag_step(config, &temp_path))?;

    fs::rename(&temp_path, &descriptor.dest_path)
        .map_err(|e| path_io_error("rename", &temp_path, e))?;

    debug!(
        "Published {} -> {}",
        descriptor.source_path.display(),
        descriptor.dest_path.display()
    );
    Ok(())
}

/// Whether the best-effort strip step runs for a source extension.
#[must_use]
pub fn should_strip_metadata(source_extension: &str) -> bool {
    !NO_STRIP_EXTENSIONS.contains(&source_extension)
}

fn remove_if_exists(path: &Path) -> CoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(path_io_error("remove", path, e)),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
