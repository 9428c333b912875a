//! Configuration structures and constants for the imgpress-core library.
//!
//! A `CoreConfig` is created once per run by the consumer (e.g. imgpress-cli)
//! and passed by reference to every pipeline component. Nothing in the library
//! reads configuration from global state.

mod builder;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Number of concurrent conversion jobs.
pub const DEFAULT_WORKER_COUNT: usize = 6;

/// A progress summary is emitted every this many processed files.
pub const DEFAULT_MILESTONE_INTERVAL: usize = 10;

/// Encoder quality passed to every converter (1-100).
pub const DEFAULT_QUALITY: u8 = 90;

/// Chroma subsampling passed to converters that accept it.
pub const DEFAULT_CHROMA_SUBSAMPLING: &str = "444";

/// Source extensions routed to the converter. Everything else is copied.
pub const DEFAULT_CONVERTIBLE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".bmp"];

/// File name of the append-only failure log, created under the output root.
pub const DEFAULT_ERROR_LOG_NAME: &str = "error_log.txt";

/// Tag written onto every converted file to mark it as processed.
pub const DEFAULT_METADATA_TAG: &str = "-xmp:description=compressed";

/// Default executable names of the external tools.
pub const DEFAULT_JPEG_ENCODER: &str = "cjpegli";
pub const DEFAULT_WEBP_ENCODER: &str = "cwebp";
pub const DEFAULT_AVIF_ENCODER: &str = "avifenc";
pub const DEFAULT_EXIFTOOL: &str = "exiftool";

/// Output image format produced by the converter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetFormat {
    #[default]
    Jpg,
    Webp,
    Avif,
}

impl TargetFormat {
    /// Extension including the leading dot, e.g. `.jpg`.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpg => ".jpg",
            TargetFormat::Webp => ".webp",
            TargetFormat::Avif => ".avif",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension()[1..])
    }
}

impl FromStr for TargetFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(TargetFormat::Jpg),
            "webp" => Ok(TargetFormat::Webp),
            "avif" => Ok(TargetFormat::Avif),
            other => Err(CoreError::Config(format!(
                "Unsupported target format '{other}' (expected jpg, webp or avif)"
            ))),
        }
    }
}

/// Executable names for the external tools. Overridable so that installs
/// outside `PATH` (or stubs) can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub jpeg_encoder: String,
    pub webp_encoder: String,
    pub avif_encoder: String,
    pub exiftool: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            jpeg_encoder: DEFAULT_JPEG_ENCODER.to_string(),
            webp_encoder: DEFAULT_WEBP_ENCODER.to_string(),
            avif_encoder: DEFAULT_AVIF_ENCODER.to_string(),
            exiftool: DEFAULT_EXIFTOOL.to_string(),
        }
    }
}

impl ToolPaths {
    /// The converter executable used for `format`.
    #[must_use]
    pub fn encoder_for(&self, format: TargetFormat) -> &str {
        match format {
            TargetFormat::Jpg => &self.jpeg_encoder,
            TargetFormat::Webp => &self.webp_encoder,
            TargetFormat::Avif => &self.avif_encoder,
        }
    }
}

/// Main configuration structure for the imgpress-core library.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root of the tree to convert
    pub input_dir: PathBuf,

    /// Root of the mirrored output tree
    pub output_dir: PathBuf,

    /// Format convertible files are converted to
    pub target_format: TargetFormat,

    /// Fixed number of concurrent conversion jobs
    pub worker_count: usize,

    /// Lowercased extensions (with leading dot) that are converted
    pub convertible_extensions: BTreeSet<String>,

    /// Emit a progress summary every N processed files
    pub milestone_interval: usize,

    /// Converter quality (1-100)
    pub quality: u8,

    /// Converter chroma subsampling, e.g. "444"
    pub chroma_subsampling: String,

    /// Name of the failure log file under `output_dir`
    pub error_log_name: String,

    /// exiftool tag assignment written to each converted file
    pub metadata_tag: String,

    /// External tool executables
    pub tools: ToolPaths,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("out"),
            target_format: TargetFormat::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            convertible_extensions: DEFAULT_CONVERTIBLE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            quality: DEFAULT_QUALITY,
            chroma_subsampling: DEFAULT_CHROMA_SUBSAMPLING.to_string(),
            error_log_name: DEFAULT_ERROR_LOG_NAME.to_string(),
            metadata_tag: DEFAULT_METADATA_TAG.to_string(),
            tools: ToolPaths::default(),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with default settings for the given roots.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            ..Self::default()
        }
    }

    /// Path of the append-only failure log.
    #[must_use]
    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.error_log_name)
    }

    /// Whether a lowercased, dot-prefixed extension is routed to the converter.
    #[must_use]
    pub fn is_convertible(&self, extension: &str) -> bool {
        self.convertible_extensions.contains(extension)
    }

    /// Validates the configuration before a run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.worker_count == 0 {
            return Err(CoreError::Config("worker count must be at least 1".to_string()));
        }
        if self.milestone_interval == 0 {
            return Err(CoreError::Config(
                "milestone interval must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(CoreError::Config(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if self.convertible_extensions.is_empty() {
            return Err(CoreError::Config(
                "at least one convertible extension is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .convertible_extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2 || *ext != &ext.to_ascii_lowercase())
        {
            return Err(CoreError::Config(format!(
                "convertible extension '{bad}' must be lowercase and start with '.'"
            )));
        }
        if self.error_log_name.is_empty() || Path::new(&self.error_log_name).components().count() != 1 {
            return Err(CoreError::Config(format!(
                "error log name '{}' must be a plain file name",
                self.error_log_name
            )));
        }
        if !self.input_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "input directory '{}' does not exist or is not a directory",
                self.input_dir.display()
            )));
        }
        if same_location(&self.input_dir, &self.output_dir) {
            return Err(CoreError::Config(format!(
                "output directory '{}' must differ from the input directory",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

/// Normalizes a user-supplied extension to the lowercase, dot-prefixed form.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
