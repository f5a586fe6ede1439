//! Input discovery: turn command-line paths into [`SourceImage`]s.
//!
//! Files named on the command line are taken in argument order. Directories
//! are expanded with `walkdir`, sorted by file name so runs are reproducible;
//! only their direct children are read unless `recursive` is set.
//!
//! Files whose extension is not JPEG, PNG or WebP are not errors: they are
//! returned in [`Collected::skipped`] so the caller can say which inputs were
//! ignored. Files that cannot be read and directory entries the walk cannot
//! visit (broken symlinks, unreadable subdirectories) land there too, with the
//! I/O error as the reason. Only a command-line path that does not exist at
//! all is an error.

use crate::types::{SourceFormat, SourceImage};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Message shown for inputs that are not an accepted image type.
pub const UNSUPPORTED_TYPE: &str = "Only JPG, PNG, and WebP files are supported.";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

/// An input that was not loaded, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

impl Skipped {
    fn new(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }
}

/// Result of expanding the command-line inputs.
#[derive(Debug, Default)]
pub struct Collected {
    pub images: Vec<SourceImage>,
    pub skipped: Vec<Skipped>,
}

/// Display name of a path: its final component.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one file as a [`SourceImage`], using the extension as declared type.
///
/// Returns `Ok(None)` for unsupported extensions.
pub fn load_source(path: &Path) -> Result<Option<SourceImage>, SourceError> {
    let Some(format) = SourceFormat::from_path(path) else {
        return Ok(None);
    };
    let data = fs::read(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(SourceImage::new(display_name(path), format, data)))
}

/// Files under `dir`, sorted by name. Only direct children unless `recursive`.
///
/// Symlinks are followed; entries the walk fails on are recorded in `skipped`.
fn directory_files(dir: &Path, recursive: bool, skipped: &mut Vec<Skipped>) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }
    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                skipped.push(Skipped::new(path, format!("Could not read: {e}")));
            }
        }
    }
    files
}

/// Expand `inputs` into loaded images plus the list of skipped files.
pub fn collect_sources(inputs: &[PathBuf], recursive: bool) -> Result<Collected, SourceError> {
    let mut collected = Collected::default();

    for input in inputs {
        if !input.exists() {
            return Err(SourceError::NotFound(input.clone()));
        }
        let files = if input.is_dir() {
            directory_files(input, recursive, &mut collected.skipped)
        } else {
            vec![input.clone()]
        };
        for file in files {
            match load_source(&file) {
                Ok(Some(image)) => collected.images.push(image),
                Ok(None) => collected
                    .skipped
                    .push(Skipped::new(file, UNSUPPORTED_TYPE)),
                Err(SourceError::Io { path, source }) => collected
                    .skipped
                    .push(Skipped::new(path, format!("Could not read: {source}"))),
                Err(e) => return Err(e),
            }
        }
    }

    Ok(collected)
}
