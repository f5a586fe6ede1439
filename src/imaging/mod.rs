//! Image processing in pure Rust, zero system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Rasterize** | `resize_exact` (Lanczos3) |
//! | **Encode → JPEG** | `JpegEncoder` at the effective quality |
//! | **Encode → PNG** | `PngEncoder`, best compression |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension, quality and ratio math (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
