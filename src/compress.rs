//! Re-encode one image, retrying once when the output did not shrink.
//!
//! ```text
//! SourceImage ─ decode ─ rasterize ─ encode(q₀) ─┬─ smaller? ──────────── accept
//!                                                ├─ lossless? ─────────── accept
//!                                                └─ encode(q₁ < q₀) ───── accept
//! ```
//!
//! The retry is a bounded loop over [`MAX_ATTEMPTS`]: the second encode is
//! accepted whatever its size. A file that cannot be made smaller is a
//! quality-of-result outcome, not an error.
//!
//! Only two things fail a file: the input does not decode, or the encoder
//! errors / returns nothing. Both come back as [`CompressError`] so the batch
//! coordinator can report them and move on.

use crate::imaging::calculations::output_dimensions;
use crate::imaging::{BackendError, EncodeParams, ImageBackend};
use crate::settings::{CompressionSettings, QualityPolicy, SettingsError};
use crate::types::{CompressedResult, EncodeAttempt, SourceImage};
use thiserror::Error;

/// Upper bound on encoder runs per image: the first try plus one retry.
pub const MAX_ATTEMPTS: usize = 2;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Unsupported or corrupt image {name}: {source}")]
    Decode { name: String, source: BackendError },
    #[error("Could not resize {name}: {source}")]
    Rasterize { name: String, source: BackendError },
    #[error("Encoder failed for {name}: {source}")]
    Encode { name: String, source: BackendError },
    #[error("Encoder produced no output for {0}")]
    EmptyOutput(String),
}

/// Compress a single image.
///
/// Settings and policy are validated first. On success the result holds
/// one or two [`EncodeAttempt`]s; the last one produced the returned blob.
pub fn compress_image<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    settings: &CompressionSettings,
    policy: &QualityPolicy,
) -> Result<CompressedResult, CompressError> {
    settings.validate()?;
    policy.validate()?;

    let name = source.name().to_string();

    let decoded = backend
        .decode(source.data())
        .map_err(|e| CompressError::Decode {
            name: name.clone(),
            source: e,
        })?;

    let source_dims = backend.dimensions(&decoded);
    let target = output_dimensions(source_dims, settings.resize);
    let surface = if target == source_dims {
        decoded
    } else {
        backend
            .rasterize(decoded, target)
            .map_err(|e| CompressError::Rasterize {
                name: name.clone(),
                source: e,
            })?
    };

    let format = settings.mode.output_format(source.format());
    let mut quality = settings
        .mode
        .effective_quality(settings.requested_quality(), policy);
    let mut attempts: Vec<EncodeAttempt> = Vec::with_capacity(MAX_ATTEMPTS);

    let mut attempt = 0;
    let blob = loop {
        attempt += 1;
        let blob = backend
            .encode(&surface, &EncodeParams { format, quality })
            .map_err(|e| CompressError::Encode {
                name: name.clone(),
                source: e,
            })?;
        if blob.is_empty() {
            return Err(CompressError::EmptyOutput(name));
        }
        let size = blob.len() as u64;
        attempts.push(EncodeAttempt { quality, size });

        if size < source.size() || settings.mode.is_lossless() || attempt >= MAX_ATTEMPTS {
            break blob;
        }
        quality = policy.retry_quality(quality);
    };

    Ok(CompressedResult::new(
        name,
        source.size(),
        blob,
        format,
        target,
        attempts,
    ))
}
