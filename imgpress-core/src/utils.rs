//! Utility functions for formatting and path handling.

use std::path::Path;
use std::time::Duration;

/// Formats a duration as HH:MM:SS (e.g. 3725s -> "01:02:05").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Returns the lowercased extension of `path` with a leading dot, or `None`
/// when the file name has no extension.
#[must_use]
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
