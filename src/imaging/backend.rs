//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four steps of a re-encode: decode,
//! dimensions, rasterize, and encode. The compression routine only talks to
//! this trait, so retry and batch logic can be tested without real codecs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on the
//! `image` crate. Everything is statically linked into the binary.

use super::params::EncodeParams;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded or rasterized surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// `Surface` is the backend's in-memory bitmap. It is owned by one
/// compression call at a time; `rasterize` consumes the decoded surface so
/// only one full-size bitmap is alive per image.
pub trait ImageBackend {
    type Surface;

    /// Decode an encoded image (JPEG, PNG, WebP) into a surface.
    fn decode(&self, data: &[u8]) -> Result<Self::Surface, BackendError>;

    /// Pixel dimensions of a surface.
    fn dimensions(&self, surface: &Self::Surface) -> Dimensions;

    /// Draw the surface onto a new buffer of exactly `size` pixels.
    fn rasterize(
        &self,
        surface: Self::Surface,
        size: Dimensions,
    ) -> Result<Self::Surface, BackendError>;

    /// Serialize the surface with the given codec and quality.
    fn encode(
        &self,
        surface: &Self::Surface,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError>;
}
