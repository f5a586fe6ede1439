//! Pure calculation functions for dimensions, quality and size ratios.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Pick the output pixel size: the requested resize if any, else the source size.
///
/// Resizing is exact; the source aspect ratio is not preserved.
///
/// ```
/// # use imgpress::imaging::{Dimensions, calculations::output_dimensions};
/// let src = Dimensions { width: 4000, height: 3000 };
/// let target = Dimensions { width: 800, height: 800 };
/// assert_eq!(output_dimensions(src, Some(target)), target);
/// assert_eq!(output_dimensions(src, None), src);
/// ```
pub fn output_dimensions(source: Dimensions, resize: Option<Dimensions>) -> Dimensions {
    resize.unwrap_or(source)
}

/// Scale a quality value down by `factor`, capped at `ceiling` and floored at `min`.
///
/// The scaled value is truncated, so for `factor < 1` the result is strictly
/// below `quality` unless the floor lifts it back up.
///
/// # Examples
/// ```
/// # use imgpress::imaging::calculations::scaled_quality;
/// // 80 × 0.7 = 56, under the 60 ceiling
/// assert_eq!(scaled_quality(80, 0.7, 60, 5), 56);
/// // 100 × 0.7 = 70, capped at 60
/// assert_eq!(scaled_quality(100, 0.7, 60, 5), 60);
/// ```
pub fn scaled_quality(quality: u32, factor: f64, ceiling: u32, min: u32) -> u32 {
    let scaled = (quality as f64 * factor).floor() as u32;
    scaled.min(ceiling).max(min)
}

/// Quality for the retry attempt after `current` failed to shrink the file.
///
/// Always at least one step below `current`, never below `min`.
pub fn retry_quality(current: u32, factor: f64, min: u32) -> u32 {
    let lowered = ((current as f64 * factor).floor() as u32).min(current.saturating_sub(1));
    lowered.max(min)
}

/// Percentage of bytes removed: `(original − compressed) / original × 100`.
///
/// Negative when the output grew. An empty original yields `0.0`.
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}
