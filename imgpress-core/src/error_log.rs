//! Append-only log of per-file failures, kept under the output root.
//!
//! The file is opened on the first failure, so a run without failures
//! leaves nothing behind. Each entry is a single `write_all` of a complete
//! line under a mutex, so concurrent appends never interleave.

use crate::error::{CoreResult, path_io_error};

use log::warn;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl ErrorLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line recording that `source` failed with `message`.
    pub fn append(&self, source: &Path, message: &str) -> CoreResult<()> {
        let line = format!(
            "{} {}: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            source.display(),
            single_line(message)
        );

        let mut guard = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| path_io_error("open error log", &self.path, e))?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes())
                .and_then(|()| file.flush())
                .map_err(|e| path_io_error("append to error log", &self.path, e))?;
        }
        Ok(())
    }

    /// Like [`append`](Self::append), but a failure to write the log is only
    /// reported as a warning.
    pub fn record(&self, source: &Path, message: &str) {
        if let Err(e) = self.append(source, message) {
            warn!("Could not record failure for {}: {e}", source.display());
        }
    }
}

fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_no_file_until_first_failure() {
        let dir = tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error_log.txt"));
        assert!(!log.path().exists());

        log.append(Path::new("/in/a.png"), "cjpegli failed\nwith detail").unwrap();
        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("/in/a.png: cjpegli failed with detail"));
    }

    #[test]
    fn test_appends_never_truncate_existing_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("error_log.txt");
        fs::write(&path, "earlier run entry\n").unwrap();

        let log = ErrorLog::new(path.clone());
        log.append(Path::new("b.bmp"), "boom").unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("earlier run entry\n"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_appends_produce_whole_lines() {
        let dir = tempdir().unwrap();
        let log = Arc::new(ErrorLog::new(dir.path().join("error_log.txt")));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..50 {
                        log.record(Path::new(&format!("/in/{t}/{i}.png")), "failed");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.lines().count(), 200);
        assert!(contents.lines().all(|line| line.ends_with(".png: failed")));
    }
}
