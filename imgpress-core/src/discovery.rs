//! Input tree traversal and per-file classification.
//!
//! The input root is walked recursively. Each regular file is either routed
//! to the converter (its extension is in the convertible set), skipped
//! (its converted output already exists), or copied through unchanged.
//! Destinations mirror the relative path under the output root, with the
//! extension rewritten for converted files.
//!
//! When the output root lives inside the input root it is pruned from the
//! walk so that outputs are never rediscovered as inputs.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, path_io_error};
use crate::job::JobDescriptor;
use crate::utils::lowercase_extension;

use log::debug;
use walkdir::{DirEntry, WalkDir};

use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

/// What to do with one discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Submit a conversion job.
    Convert(JobDescriptor),
    /// Converted output already exists; nothing to do.
    SkipExisting { dest_path: PathBuf },
    /// Copy the file through unchanged.
    Copy { source_path: PathBuf, dest_path: PathBuf },
}

impl FileAction {
    /// Destination the action writes to (or found already present).
    #[must_use]
    pub fn dest_path(&self) -> &Path {
        match self {
            FileAction::Convert(job) => &job.dest_path,
            FileAction::SkipExisting { dest_path } => dest_path,
            FileAction::Copy { dest_path, .. } => dest_path,
        }
    }

    /// Every output path the action reserves: the destination, plus the
    /// temporary sibling a conversion writes before publishing.
    #[must_use]
    pub fn reserved_paths(&self) -> Vec<PathBuf> {
        match self {
            FileAction::Convert(job) => vec![job.dest_path.clone(), job.temp_path()],
            other => vec![other.dest_path().to_path_buf()],
        }
    }
}

/// The input tree of one run, with the output root pruned if nested.
#[derive(Debug, Clone)]
pub struct InputTree {
    root: PathBuf,
    pruned: Option<PathBuf>,
}

impl InputTree {
    /// Resolves the input and output roots. The output root must already exist
    /// for nesting to be detected.
    pub fn open(config: &CoreConfig) -> CoreResult<Self> {
        let root = config
            .input_dir
            .canonicalize()
            .map_err(|e| path_io_error("resolve input directory", &config.input_dir, e))?;
        let pruned = config
            .output_dir
            .canonicalize()
            .ok()
            .filter(|out| out.starts_with(&root));
        if let Some(out) = &pruned {
            debug!("Output root {} is inside the input tree; pruning it", out.display());
        }
        Ok(Self { root, pruned })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walks the tree, yielding regular files (and symlinks to files).
    ///
    /// Single pass over the tree as it exists when iteration reaches each
    /// directory. Unreadable entries are yielded as errors and iteration
    /// continues.
    pub fn files(&self) -> impl Iterator<Item = CoreResult<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_pruned(entry))
            .filter_map(|entry| match entry {
                Ok(entry) if is_file(&entry) => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(CoreError::from(e))),
            })
    }

    /// Full pre-scan counting the files a walk will yield.
    #[must_use]
    pub fn count_files(&self) -> usize {
        self.files().filter(Result::is_ok).count()
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        self.pruned
            .as_deref()
            .is_some_and(|pruned| entry.file_type().is_dir() && entry.path() == pruned)
    }
}

fn is_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Mirrors `source` (under `input_root`) onto the output root.
pub fn destination_for(config: &CoreConfig, input_root: &Path, source: &Path) -> CoreResult<PathBuf> {
    let relative = source.strip_prefix(input_root).map_err(|_| {
        CoreError::PathError(format!(
            "{} is not inside the input directory {}",
            source.display(),
            input_root.display()
        ))
    })?;
    Ok(config.output_dir.join(relative))
}

/// Decides the action for one source file.
pub fn classify(config: &CoreConfig, input_root: &Path, source: &Path) -> CoreResult<FileAction> {
    let mirrored = destination_for(config, input_root, source)?;
    let extension = lowercase_extension(source);

    match extension {
        Some(ext) if config.is_convertible(&ext) => {
            let target = config.target_format.extension();
            let dest_path = mirrored.with_extension(&target[1..]);
            if dest_path.exists() {
                Ok(FileAction::SkipExisting { dest_path })
            } else {
                Ok(FileAction::Convert(JobDescriptor {
                    source_path: source.to_path_buf(),
                    dest_path,
                    target_format: config.target_format,
                    source_extension: ext,
                }))
            }
        }
        _ => Ok(FileAction::Copy {
            source_path: source.to_path_buf(),
            dest_path: mirrored,
        }),
    }
}

/// Tracks which output paths this run has already assigned, so two sources
/// never write the same file (e.g. `a.png` and `a.bmp` both becoming `a.jpg`,
/// or an input `a.jpg.tmp` copied onto the temp file of the `a.jpg` job).
#[derive(Debug, Default)]
pub struct DestinationClaims {
    claimed: HashMap<PathBuf, PathBuf>,
}

impl DestinationClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `dest` for `source`, failing if another source already holds it.
    pub fn claim(&mut self, dest: &Path, source: &Path) -> CoreResult<()> {
        self.claim_all(&[dest.to_path_buf()], source)
    }

    /// Claims every path in `dests` for `source`, or none of them if any is
    /// already held.
    pub fn claim_all(&mut self, dests: &[PathBuf], source: &Path) -> CoreResult<()> {
        for dest in dests {
            if let Some(owner) = self.claimed.get(dest) {
                return Err(CoreError::PathError(format!(
                    "destination {} is already produced from {}",
                    dest.display(),
                    owner.display()
                )));
            }
        }
        for dest in dests {
            self.claimed.insert(dest.clone(), source.to_path_buf());
        }
        Ok(())
    }
}

/// Creates the parent directory of `dest` if it is missing. Safe to race.
pub fn ensure_parent_dir(dest: &Path) -> CoreResult<()> {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| path_io_error("create directory", parent, e))
        }
        _ => Ok(()),
    }
}

/// Copies a file, carrying over permissions and access/modification times.
///
/// Timestamp preservation is best effort: a destination that cannot be
/// reopened for writing keeps the copy time.
pub fn copy_preserving_metadata(source: &Path, dest: &Path) -> CoreResult<u64> {
    let bytes = fs::copy(source, dest).map_err(|e| path_io_error("copy", source, e))?;

    let metadata = fs::metadata(source).map_err(|e| path_io_error("read metadata", source, e))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    match File::options().write(true).open(dest) {
        Ok(file) => {
            if let Err(e) = file.set_times(times) {
                debug!("Could not preserve timestamps on {}: {e}", dest.display());
            }
        }
        Err(e) => debug!("Could not preserve timestamps on {}: {e}", dest.display()),
    }

    Ok(bytes)
}
