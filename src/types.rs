//! Shared types passed between pipeline stages.
//!
//! [`SourceImage`] goes in, [`CompressedResult`] comes out. Both are
//! immutable once built: results are never patched after the encoder runs,
//! and every derived number (ratio, bytes saved) is recomputed from the
//! stored byte sizes.

use crate::imaging::calculations::compression_ratio;
use crate::imaging::{Dimensions, OutputFormat, Quality};
use crate::naming::compressed_name;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Declared type of an input file, derived from its extension.
///
/// This mirrors what a browser reports as `File.type`: it says what the file
/// claims to be. The decoder sniffs the real content independently, so a
/// mislabeled file still fails (or succeeds) on its actual bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "webp" => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn mime(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Jpeg => f.write_str("JPEG"),
            SourceFormat::Png => f.write_str("PNG"),
            SourceFormat::WebP => f.write_str("WebP"),
        }
    }
}

/// A user-supplied image: display name, declared format, raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    format: SourceFormat,
    data: Vec<u8>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, format: SourceFormat, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// One encoder run: the quality used and the blob size it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeAttempt {
    pub quality: Quality,
    pub size: u64,
}

/// Output of compressing one [`SourceImage`].
///
/// The compression ratio is not a field: it is derived from the two sizes on
/// every call so it cannot drift from the data.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedResult {
    name: String,
    original_size: u64,
    data: Vec<u8>,
    format: OutputFormat,
    dimensions: Dimensions,
    attempts: Vec<EncodeAttempt>,
}

impl CompressedResult {
    pub(crate) fn new(
        name: String,
        original_size: u64,
        data: Vec<u8>,
        format: OutputFormat,
        dimensions: Dimensions,
        attempts: Vec<EncodeAttempt>,
    ) -> Self {
        Self {
            name,
            original_size,
            data,
            format,
            dimensions,
            attempts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename offered for download: `compressed_<name>`.
    pub fn download_name(&self) -> String {
        compressed_name(&self.name)
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn compressed_size(&self) -> u64 {
        self.data.len() as u64
    }

    /// `(original − compressed) / original × 100`; negative if the file grew.
    pub fn compression_ratio(&self) -> f64 {
        compression_ratio(self.original_size, self.compressed_size())
    }

    /// Bytes removed; negative if the file grew.
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.compressed_size() as i64
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Every encode that ran, in order. The last one produced `data`.
    pub fn attempts(&self) -> &[EncodeAttempt] {
        &self.attempts
    }

    pub fn retried(&self) -> bool {
        self.attempts.len() > 1
    }

    /// Quality of the accepted encode.
    pub fn final_quality(&self) -> Quality {
        self.attempts
            .last()
            .map(|a| a.quality)
            .unwrap_or(Quality::MAX)
    }
}

/// Serializable view of a result, without the blob.
#[derive(Debug, Serialize)]
pub struct ResultReport<'a> {
    pub name: &'a str,
    pub download_name: String,
    pub format: OutputFormat,
    pub mime: &'static str,
    pub dimensions: Dimensions,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub attempts: &'a [EncodeAttempt],
}

impl<'a> From<&'a CompressedResult> for ResultReport<'a> {
    fn from(result: &'a CompressedResult) -> Self {
        Self {
            name: result.name(),
            download_name: result.download_name(),
            format: result.format(),
            mime: result.format().mime(),
            dimensions: result.dimensions(),
            original_size: result.original_size(),
            compressed_size: result.compressed_size(),
            compression_ratio: result.compression_ratio(),
            attempts: result.attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(original: u64, compressed: usize) -> CompressedResult {
        CompressedResult::new(
            "photo.jpg".to_string(),
            original,
            vec![0; compressed],
            OutputFormat::Jpeg,
            Dimensions {
                width: 10,
                height: 10,
            },
            vec![EncodeAttempt {
                quality: Quality::new(80),
                size: compressed as u64,
            }],
        )
    }

    #[test]
    fn source_format_from_extension_is_case_insensitive() {
        assert_eq!(SourceFormat::from_extension("JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("jpeg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("Png"), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_extension("webp"), Some(SourceFormat::WebP));
        assert_eq!(SourceFormat::from_extension("gif"), None);
        assert_eq!(SourceFormat::from_extension("tiff"), None);
    }

    #[test]
    fn source_format_from_path() {
        assert_eq!(
            SourceFormat::from_path(Path::new("/a/b/Shot.JPEG")),
            Some(SourceFormat::Jpeg)
        );
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn source_format_mime_types() {
        assert_eq!(SourceFormat::Jpeg.mime(), "image/jpeg");
        assert_eq!(SourceFormat::Png.mime(), "image/png");
        assert_eq!(SourceFormat::WebP.mime(), "image/webp");
    }

    #[test]
    fn source_image_size_is_byte_length() {
        let img = SourceImage::new("a.png", SourceFormat::Png, vec![1, 2, 3, 4]);
        assert_eq!(img.size(), 4);
        assert_eq!(img.name(), "a.png");
        assert_eq!(img.format(), SourceFormat::Png);
    }

    #[test]
    fn ratio_recomputed_from_sizes() {
        let r = result(2000, 500);
        assert_eq!(r.compressed_size(), 500);
        assert!((r.compression_ratio() - 75.0).abs() < 1e-9);
        assert_eq!(r.bytes_saved(), 1500);
    }

    #[test]
    fn ratio_negative_when_grown() {
        let r = result(100, 150);
        assert!(r.compression_ratio() < 0.0);
        assert_eq!(r.bytes_saved(), -50);
    }

    #[test]
    fn download_name_has_prefix() {
        assert_eq!(result(1, 1).download_name(), "compressed_photo.jpg");
    }

    #[test]
    fn single_attempt_is_not_retried() {
        let r = result(100, 50);
        assert!(!r.retried());
        assert_eq!(r.final_quality().value(), 80);
    }

    #[test]
    fn report_serializes_without_blob() {
        let r = result(2000, 1000);
        let json = serde_json::to_value(ResultReport::from(&r)).unwrap();
        assert_eq!(json["download_name"], "compressed_photo.jpg");
        assert_eq!(json["format"], "jpeg");
        assert_eq!(json["mime"], "image/jpeg");
        assert_eq!(json["compression_ratio"], 50.0);
        assert!(json.get("data").is_none());
    }
}
