//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its positional index and name first, with sizes,
//! qualities and errors as indented context lines. The batch ends with a
//! summary block mirroring [`BatchSummary`].
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! Compressing 3 images
//! 001 dawn.jpg
//!     2.4 MB → 612.7 KB (75% smaller)
//!     1920x1080, JPEG q80
//! 002 notes.png
//!     Failed: Unsupported or corrupt image notes.png: ...
//! 003 logo.png
//!     14.2 KB → 13.1 KB (8% smaller)
//!     256x256, JPEG q80 → q56 (retried)
//!
//! Compressed 2 of 3 images
//!     Average reduction: 42%
//!     Total saved: 1.8 MB
//!     2.42 MB → 625.8 KB
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 dawn.jpg
//!     JPEG, 2.4 MB, 1920x1080
//! 002 broken.png
//!     PNG, 12 Bytes, unreadable: ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::calculations::compression_ratio;
use crate::imaging::{Dimensions, OutputFormat, Quality};
use crate::source::Skipped;
use crate::types::SourceFormat;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count: base 1024, at most two decimals, trailing
/// zeros dropped.
///
/// ```text
/// 0        → 0 Bytes
/// 1536     → 1.5 KB
/// 1048576  → 1 MB
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    let mut scale = 1u64;
    while exponent < SIZE_UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / scale as f64;
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[exponent])
}

/// Like [`format_file_size`], with a leading `-` for negative values.
pub fn format_signed_size(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_file_size(bytes.unsigned_abs()))
    } else {
        format_file_size(bytes as u64)
    }
}

/// Round a percentage to whole units, halves rounding up.
fn round_percent(ratio: f64) -> i64 {
    (ratio + 0.5).floor() as i64
}

/// `75% smaller` or `12% larger`.
fn format_ratio(ratio: f64) -> String {
    let rounded = round_percent(ratio);
    if rounded < 0 {
        format!("{}% larger", -rounded)
    } else {
        format!("{}% smaller", rounded)
    }
}

/// `q80`, or `q80 → q56 (retried)` when more than one attempt ran.
fn format_qualities(qualities: &[Quality]) -> String {
    let joined: Vec<String> = qualities.iter().map(|q| q.to_string()).collect();
    if qualities.len() > 1 {
        format!("{} (retried)", joined.join(" → "))
    } else {
        joined.join("")
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Compress
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Compressing {} {}", total, noun)]
        }
        BatchEvent::ImageCompressed {
            index,
            name,
            original_size,
            compressed_size,
            dimensions,
            format,
            qualities,
        } => {
            let ratio = compression_ratio(*original_size, *compressed_size);
            let mut lines = vec![format!("{} {}", format_index(*index), name)];
            lines.push(format!(
                "    {} → {} ({})",
                format_file_size(*original_size),
                format_file_size(*compressed_size),
                format_ratio(ratio)
            ));
            let codec = if qualities.is_empty() || *format == OutputFormat::Png {
                format.to_string()
            } else {
                format!("{} {}", format, format_qualities(qualities))
            };
            lines.push(format!("    {}, {}", dimensions, codec));
            lines
        }
        BatchEvent::ImageFailed { index, name, error } => vec![
            format!("{} {}", format_index(*index), name),
            format!("    Failed: {}", error),
        ],
        BatchEvent::Finished { summary } => {
            let mut lines = vec![String::new()];
            lines.extend(format_summary(summary));
            lines
        }
    }
}

/// Format the aggregate statistics of a finished batch.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let attempted = summary.file_count + summary.failed_count;
    let mut lines = vec![format!(
        "Compressed {} of {} images",
        summary.file_count, attempted
    )];
    if summary.file_count == 0 {
        return lines;
    }
    lines.push(format!(
        "    Average reduction: {}%",
        round_percent(summary.average_ratio)
    ));
    lines.push(format!(
        "    Total saved: {}",
        format_signed_size(summary.total_saved)
    ));
    lines.push(format!(
        "    {} → {}",
        format_file_size(summary.total_original),
        format_file_size(summary.total_compressed)
    ));
    lines
}

/// Format inputs that were ignored before compression.
pub fn format_skipped(skipped: &[Skipped]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| format!("Skipped {}: {}", display_name(&s.path), s.reason))
        .collect()
}

/// Format the list of files written by the run.
pub fn format_written(files: &[PathBuf], archive: Option<&Path>) -> Vec<String> {
    let mut lines: Vec<String> = files
        .iter()
        .map(|p| format!("Wrote {}", p.display()))
        .collect();
    if let Some(path) = archive {
        lines.push(format!("Wrote archive {}", path.display()));
    }
    lines
}

pub fn print_skipped(skipped: &[Skipped]) {
    for line in format_skipped(skipped) {
        println!("{}", line);
    }
}

pub fn print_written(files: &[PathBuf], archive: Option<&Path>) {
    for line in format_written(files, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// One input as seen by `check`: declared type, size, and decoded dimensions
/// (or the decode error).
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedInput {
    pub name: String,
    pub format: SourceFormat,
    pub size: u64,
    pub dimensions: Result<Dimensions, String>,
}

pub fn format_check_output(inputs: &[CheckedInput], skipped: &[Skipped]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, input) in inputs.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), input.name));
        let detail = match &input.dimensions {
            Ok(dims) => dims.to_string(),
            Err(e) => format!("unreadable: {}", e),
        };
        lines.push(format!(
            "    {} ({}), {}, {}",
            input.format,
            input.format.mime(),
            format_file_size(input.size),
            detail
        ));
    }
    if !skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(format_skipped(skipped));
    }
    lines
}

pub fn print_check_output(inputs: &[CheckedInput], skipped: &[Skipped]) {
    for line in format_check_output(inputs, skipped) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
