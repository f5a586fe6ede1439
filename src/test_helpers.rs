//! Shared test utilities: synthetic image fixtures.
//!
//! Real photographs are not checked into the repo. Tests build the images
//! they need in memory with the `image` encoders, sized and textured for the
//! behavior under test:
//!
//! - [`noisy_jpeg`]: high-entropy content, so quality changes move the size
//! - [`solid_png`]: a flat color that compresses to almost nothing
//! - [`transparent_png`]: RGBA with a real alpha gradient
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = noisy_jpeg(640, 480, 95);
//! let source = SourceImage::new("noise.jpg", SourceFormat::Jpeg, bytes);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

// =========================================================================
// Pixel sources
// =========================================================================

/// Deterministic xorshift noise, so fixture sizes are stable across runs.
fn noise(seed: u32) -> impl FnMut() -> u8 {
    let mut state = seed.max(1);
    move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 24) as u8
    }
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// A JPEG full of per-pixel noise, encoded at `quality`.
pub fn noisy_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut next = noise(width.wrapping_mul(31).wrapping_add(height));
    let img = RgbImage::from_fn(width, height, |_, _| Rgb([next(), next(), next()]));
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// An opaque single-color PNG.
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 90]));
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// A PNG whose alpha ramps from transparent (left) to opaque (right).
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let alpha = (x * 255 / width.max(1)) as u8;
        Rgba([10, 120, 240, alpha])
    });
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buffer
}

#[test]
fn fixtures_decode_with_expected_shape() {
    let jpeg = image::load_from_memory(&noisy_jpeg(40, 30, 90)).unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (40, 30));

    let png = image::load_from_memory(&transparent_png(8, 4)).unwrap();
    assert!(png.color().has_alpha());

    let solid = image::load_from_memory(&solid_png(8, 4)).unwrap();
    assert!(!solid.color().has_alpha());
}
