// imgpress-core/tests/common/mod.rs
//
// Shared fixtures for the pipeline integration tests.

#![allow(dead_code)]

use imgpress_core::{CoreError, CoreResult, ToolRunner, ToolStep};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

const ENCODERS: [&str; 3] = ["cjpegli", "cwebp", "avifenc"];

/// Stands in for the real encoders and exiftool.
///
/// Encoder steps write a small file to the `.tmp` output argument. Any step
/// whose arguments mention a source containing `fail_marker` exits non-zero.
pub struct StubRunner {
    fail_marker: Option<String>,
    delay: Duration,
    calls: Mutex<Vec<ToolStep>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl StubRunner {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of encoder invocations seen so far.
    pub fn encoder_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|step| ENCODERS.contains(&step.program.as_str()))
            .count()
    }

    /// Highest number of steps observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl ToolRunner for StubRunner {
    fn run(&self, step: &ToolStep) -> CoreResult<()> {
        self.calls.lock().unwrap().push(step.clone());
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        let result = self.execute(step);
        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl StubRunner {
    fn execute(&self, step: &ToolStep) -> CoreResult<()> {
        let args = step.display_args();
        if let Some(marker) = &self.fail_marker {
            if args.iter().any(|arg| arg.contains(marker.as_str())) {
                return Err(CoreError::ExternalTool {
                    tool: step.program.clone(),
                    args,
                    status: "exit code 1".to_string(),
                });
            }
        }
        if ENCODERS.contains(&step.program.as_str()) {
            if let Some(output) = args.iter().find(|arg| arg.ends_with(".tmp")) {
                fs::write(output, b"encoded")?;
            }
        }
        Ok(())
    }
}

/// Creates `relative` under `root` (with parents) holding `contents`.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Lines currently in the error log, or none if it was never created.
pub fn error_log_lines(output_root: &Path) -> Vec<String> {
    match fs::read_to_string(output_root.join("error_log.txt")) {
        Ok(contents) => contents.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

/// Every file path under `root`, relative to it, sorted.
pub fn relative_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
