// ============================================================================
// imgpress-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating and configuring CoreConfig instances.
// Unset optional values fall back to the defaults in the parent module.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CoreConfig, TargetFormat, ToolPaths, normalize_extension};
use crate::error::{CoreError, CoreResult};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use imgpress_core::config::{CoreConfigBuilder, TargetFormat};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/pictures"))
///     .output_dir(PathBuf::from("/path/to/pictures-out"))
///     .target_format(TargetFormat::Webp)
///     .worker_count(4)
///     .convertible_extensions(["png", ".TIFF"])
///     .build()
///     .unwrap();
///
/// assert_eq!(config.worker_count, 4);
/// assert!(config.is_convertible(".tiff"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    // Required fields
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,

    // Optional fields, defaults applied in build()
    target_format: Option<TargetFormat>,
    worker_count: Option<usize>,
    convertible_extensions: Option<Vec<String>>,
    milestone_interval: Option<usize>,
    quality: Option<u8>,
    chroma_subsampling: Option<String>,
    error_log_name: Option<String>,
    metadata_tag: Option<String>,
    tools: Option<ToolPaths>,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input root.
    pub fn input_dir(mut self, dir: PathBuf) -> Self {
        self.input_dir = Some(dir);
        self
    }

    /// Sets the output root.
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn target_format(mut self, format: TargetFormat) -> Self {
        self.target_format = Some(format);
        self
    }

    /// Sets the number of concurrent conversion jobs.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = Some(count);
        self
    }

    /// Replaces the convertible extension set. Values are lowercased and
    /// given a leading dot if missing.
    pub fn convertible_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.convertible_extensions = Some(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        );
        self
    }

    pub fn milestone_interval(mut self, interval: usize) -> Self {
        self.milestone_interval = Some(interval);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn chroma_subsampling(mut self, subsampling: impl Into<String>) -> Self {
        self.chroma_subsampling = Some(subsampling.into());
        self
    }

    pub fn error_log_name(mut self, name: impl Into<String>) -> Self {
        self.error_log_name = Some(name.into());
        self
    }

    pub fn metadata_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata_tag = Some(tag.into());
        self
    }

    /// Overrides the external tool executables.
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Builds the CoreConfig. Fails if a required root is missing.
    ///
    /// Value validation (ranges, directory existence) is left to
    /// [`CoreConfig::validate`], which the pipeline runs before starting.
    pub fn build(self) -> CoreResult<CoreConfig> {
        let input_dir = self
            .input_dir
            .ok_or_else(|| CoreError::Config("input directory is required".to_string()))?;
        let output_dir = self
            .output_dir
            .ok_or_else(|| CoreError::Config("output directory is required".to_string()))?;

        let mut config = CoreConfig::new(input_dir, output_dir);
        if let Some(format) = self.target_format {
            config.target_format = format;
        }
        if let Some(count) = self.worker_count {
            config.worker_count = count;
        }
        if let Some(extensions) = self.convertible_extensions {
            config.convertible_extensions = extensions.into_iter().collect();
        }
        if let Some(interval) = self.milestone_interval {
            config.milestone_interval = interval;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(subsampling) = self.chroma_subsampling {
            config.chroma_subsampling = subsampling;
        }
        if let Some(name) = self.error_log_name {
            config.error_log_name = name;
        }
        if let Some(tag) = self.metadata_tag {
            config.metadata_tag = tag;
        }
        if let Some(tools) = self.tools {
            config.tools = tools;
        }
        Ok(config)
    }
}
