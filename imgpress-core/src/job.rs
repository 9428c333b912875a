//! Job values passed between the classifier, the worker pool and the
//! progress reporter.

use std::path::PathBuf;

use crate::config::TargetFormat;
use crate::error::CoreError;

/// One unit of conversion work. Immutable once created by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub source_path: PathBuf,
    /// Final published location, already carrying the target extension.
    pub dest_path: PathBuf,
    pub target_format: TargetFormat,
    /// Lowercased source extension including the leading dot.
    pub source_extension: String,
}

impl JobDescriptor {
    /// Sibling of `dest_path` the converter writes to before publishing.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.dest_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Result of running one job. Exactly one is produced per submitted descriptor.
#[derive(Debug)]
pub struct JobOutcome {
    pub descriptor: JobDescriptor,
    pub result: Result<(), CoreError>,
}

impl JobOutcome {
    pub fn success(descriptor: JobDescriptor) -> Self {
        Self {
            descriptor,
            result: Ok(()),
        }
    }

    pub fn failure(descriptor: JobDescriptor, error: CoreError) -> Self {
        Self {
            descriptor,
            result: Err(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&CoreError> {
        self.result.as_ref().err()
    }
}
