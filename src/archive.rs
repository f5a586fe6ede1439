//! Writing results to disk: one file per image, or one ZIP for the batch.
//!
//! Both paths use the same derived names (`compressed_<name>`, deduplicated
//! by [`unique_names`]) so a file written individually and the same file
//! inside the archive always agree.
//!
//! Archive entries are *stored*, not deflated. The payloads are JPEG and PNG
//! streams; a second round of DEFLATE costs time and saves nothing.

use crate::naming::unique_names;
use crate::types::CompressedResult;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default filename for the batch archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "compressed_images.zip";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Output filenames for `results`, in order, with collisions resolved.
pub fn output_names(results: &[CompressedResult]) -> Vec<String> {
    unique_names(results.iter().map(|r| r.download_name()))
}

/// Write each result to `dir` under its derived name. Returns the paths written.
pub fn write_files(
    results: &[CompressedResult],
    dir: &Path,
) -> Result<Vec<PathBuf>, ArchiveError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(results.len());
    for (result, name) in results.iter().zip(output_names(results)) {
        let path = dir.join(name);
        fs::write(&path, result.data())?;
        written.push(path);
    }
    Ok(written)
}

/// Bundle all results into a ZIP written to `writer`. Returns the writer.
pub fn write_archive<W: Write + Seek>(
    results: &[CompressedResult],
    writer: W,
) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (result, name) in results.iter().zip(output_names(results)) {
        zip.start_file(name, options)?;
        zip.write_all(result.data())?;
    }
    Ok(zip.finish()?)
}

/// Bundle all results into an in-memory ZIP.
pub fn archive_bytes(results: &[CompressedResult]) -> Result<Vec<u8>, ArchiveError> {
    let cursor = write_archive(results, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Write the batch archive to `path`, creating parent directories.
pub fn write_archive_file(
    results: &[CompressedResult],
    path: &Path,
) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_archive(results, std::io::BufWriter::new(file))?.flush()?;
    Ok(())
}
