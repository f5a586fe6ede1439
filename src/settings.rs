//! Compression settings and the quality policy behind each mode.
//!
//! [`CompressionSettings`] is a plain value: the CLI and config layer build
//! one, and [`compress_image`](crate::compress::compress_image) takes it by
//! reference. There is no ambient state.
//!
//! ## Modes
//!
//! | Mode | Codec | Effective quality |
//! |---|---|---|
//! | `lossless` | PNG for PNG sources, else JPEG | 100, never retried |
//! | `balanced` | JPEG | the requested quality |
//! | `high` | JPEG | `min(q × high_factor, high_ceiling)`, floored at `min_quality` |
//!
//! The `high` constants and the retry step live in [`QualityPolicy`] so they
//! can be tuned from `imgpress.toml` instead of being baked in.

use crate::imaging::calculations::{retry_quality, scaled_quality};
use crate::imaging::{Dimensions, OutputFormat, Quality};
use crate::types::SourceFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lowest quality a user may request.
pub const MIN_USER_QUALITY: u32 = 10;
/// Highest quality a user may request.
pub const MAX_USER_QUALITY: u32 = 100;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("quality must be 10-100, got {0}")]
    QualityOutOfRange(u32),
    #[error("resize dimensions must be positive, got {0}x{1}")]
    InvalidResize(u32, u32),
    #[error("policy.{0} must be between 0 and 1 (exclusive), got {1}")]
    InvalidFactor(&'static str, f64),
    #[error("policy.{0} must be 1-100, got {1}")]
    InvalidPolicyQuality(&'static str, u32),
    #[error(
        "policy.min_quality must be below {lowest}, the lowest first-attempt quality, got {min_quality}"
    )]
    MinQualityTooHigh { min_quality: u32, lowest: u32 },
}

/// How aggressively to trade fidelity for size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// No quality loss; PNG stays PNG.
    Lossless,
    /// Good quality and size: use the requested quality as-is.
    #[default]
    Balanced,
    /// Maximum size reduction: scale the requested quality down.
    High,
}

impl CompressionMode {
    pub fn is_lossless(self) -> bool {
        matches!(self, CompressionMode::Lossless)
    }

    /// Codec for a source of the given declared format.
    pub fn output_format(self, source: SourceFormat) -> OutputFormat {
        match (self, source) {
            (CompressionMode::Lossless, SourceFormat::Png) => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }

    /// Quality of the first encode attempt.
    pub fn effective_quality(self, requested: Quality, policy: &QualityPolicy) -> Quality {
        match self {
            CompressionMode::Lossless => Quality::MAX,
            CompressionMode::Balanced => requested,
            CompressionMode::High => Quality::new(scaled_quality(
                requested.value(),
                policy.high_factor,
                policy.high_ceiling,
                policy.min_quality,
            )),
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Lossless => f.write_str("lossless"),
            CompressionMode::Balanced => f.write_str("balanced"),
            CompressionMode::High => f.write_str("high"),
        }
    }
}

/// Tuning constants for the `high` mode and the retry step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityPolicy {
    /// Multiplier applied to the requested quality in `high` mode.
    pub high_factor: f64,
    /// Upper bound on the `high` mode quality.
    pub high_ceiling: u32,
    /// Multiplier applied to the previous quality when retrying.
    pub retry_factor: f64,
    /// No encode ever runs below this quality.
    pub min_quality: u32,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            high_factor: 0.7,
            high_ceiling: 60,
            retry_factor: 0.7,
            min_quality: 5,
        }
    }
}

impl QualityPolicy {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, factor) in [
            ("high_factor", self.high_factor),
            ("retry_factor", self.retry_factor),
        ] {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(SettingsError::InvalidFactor(name, factor));
            }
        }
        for (name, q) in [
            ("high_ceiling", self.high_ceiling),
            ("min_quality", self.min_quality),
        ] {
            if !(1..=100).contains(&q) {
                return Err(SettingsError::InvalidPolicyQuality(name, q));
            }
        }
        // Every first attempt must sit above min_quality, otherwise `high`
        // can reach the requested quality and a retry can repeat the first.
        let lowest = self.lowest_first_quality();
        if self.min_quality >= lowest {
            return Err(SettingsError::MinQualityTooHigh {
                min_quality: self.min_quality,
                lowest,
            });
        }
        Ok(())
    }

    /// Lowest first-attempt quality any mode can produce, before the
    /// `min_quality` floor. `high` at the minimum user quality is the bottom.
    fn lowest_first_quality(&self) -> u32 {
        let scaled = (MIN_USER_QUALITY as f64 * self.high_factor).floor() as u32;
        scaled.min(self.high_ceiling).min(MIN_USER_QUALITY)
    }

    /// Quality for the second attempt after `previous` did not shrink the file.
    pub fn retry_quality(&self, previous: Quality) -> Quality {
        Quality::new(retry_quality(
            previous.value(),
            self.retry_factor,
            self.min_quality,
        ))
    }
}

/// Desired output for one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressionSettings {
    pub mode: CompressionMode,
    /// Requested quality, 10–100.
    pub quality: u32,
    /// Exact output size; `None` keeps the source dimensions.
    pub resize: Option<Dimensions>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            mode: CompressionMode::Balanced,
            quality: 80,
            resize: None,
        }
    }
}

impl CompressionSettings {
    /// Build and validate in one step.
    pub fn new(
        mode: CompressionMode,
        quality: u32,
        resize: Option<Dimensions>,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            mode,
            quality,
            resize,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_USER_QUALITY..=MAX_USER_QUALITY).contains(&self.quality) {
            return Err(SettingsError::QualityOutOfRange(self.quality));
        }
        if let Some(size) = self.resize {
            if size.width == 0 || size.height == 0 {
                return Err(SettingsError::InvalidResize(size.width, size.height));
            }
        }
        Ok(())
    }

    pub fn requested_quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}
