//! Tool configuration module.
//!
//! Handles loading, validating, and merging `imgpress.toml`. Stock defaults
//! are the base layer; a config file overrides any subset of them, and
//! command-line flags override both (see [`ToolConfig::with_overrides`]).
//!
//! ## Config File Location
//!
//! `imgpress.toml` in the working directory is picked up automatically.
//! `--config <FILE>` points at a different file, which must then exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! mode = "balanced"         # lossless | balanced | high
//! quality = 80              # 10-100
//!
//! [resize]
//! # width = 1920            # Both or neither; aspect ratio is not kept
//! # height = 1080
//!
//! [policy]
//! high_factor = 0.7         # High mode: quality * factor ...
//! high_ceiling = 60         # ... capped at this
//! retry_factor = 0.7        # Retry: quality * factor
//! min_quality = 5           # Floor for derived qualities
//!
//! [output]
//! directory = "."
//! write_files = true        # compressed_<name> per image
//! archive = false           # One ZIP for the whole batch
//! archive_name = "compressed_images.zip"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [compression]
//! mode = "high"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::DEFAULT_ARCHIVE_NAME;
use crate::imaging::Dimensions;
use crate::settings::{CompressionMode, CompressionSettings, QualityPolicy, SettingsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "imgpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<SettingsError> for ConfigError {
    fn from(e: SettingsError) -> Self {
        ConfigError::Validation(e.to_string())
    }
}

/// Tool configuration loaded from `imgpress.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Mode and requested quality.
    pub compression: CompressionConfig,
    /// Optional exact output size.
    pub resize: ResizeConfig,
    /// Constants behind the mode and retry qualities.
    pub policy: QualityPolicy,
    /// Where and how results are written.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub mode: CompressionMode,
    pub quality: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        let settings = CompressionSettings::default();
        Self {
            mode: settings.mode,
            quality: settings.quality,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeConfig {
    /// The resize target, if one is configured. Both dimensions or neither.
    pub fn target(&self) -> Result<Option<Dimensions>, ConfigError> {
        match (self.width, self.height) {
            (None, None) => Ok(None),
            (Some(width), Some(height)) => Ok(Some(Dimensions { width, height })),
            _ => Err(ConfigError::Validation(
                "resize.width and resize.height must be set together".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_files: bool,
    pub archive: bool,
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            write_files: true,
            archive: false,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_settings()?;
        self.policy.validate()?;
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        if !self.output.write_files && !self.output.archive {
            return Err(ConfigError::Validation(
                "output.write_files and output.archive are both false; nothing would be written"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Build validated [`CompressionSettings`] from the config.
    pub fn to_settings(&self) -> Result<CompressionSettings, ConfigError> {
        let resize = self.resize.target()?;
        Ok(CompressionSettings::new(
            self.compression.mode,
            self.compression.quality,
            resize,
        )?)
    }

    /// Full path of the batch archive.
    pub fn archive_path(&self) -> PathBuf {
        self.output.directory.join(&self.output.archive_name)
    }

    /// Layer command-line values over this config, then re-validate.
    ///
    /// A given width or height replaces the whole configured resize, so a
    /// half pair fails validation instead of mixing with the file's value.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(mode) = overrides.mode {
            self.compression.mode = mode;
        }
        if let Some(quality) = overrides.quality {
            self.compression.quality = quality;
        }
        if overrides.width.is_some() || overrides.height.is_some() {
            self.resize = ResizeConfig {
                width: overrides.width,
                height: overrides.height,
            };
        }
        if let Some(dir) = &overrides.directory {
            self.output.directory = dir.clone();
        }
        if overrides.archive {
            self.output.archive = true;
        }
        if overrides.no_files {
            self.output.write_files = false;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Values given on the command line. `None` and `false` leave the config alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub mode: Option<CompressionMode>,
    pub quality: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub directory: Option<PathBuf>,
    pub archive: bool,
    pub no_files: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// With `explicit` set, that file must exist. Otherwise `imgpress.toml` in
/// `dir` is used when present, and stock defaults when not.
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => match load_raw_config(path)? {
            Some(value) => Some(value),
            None => return Err(ConfigError::NotFound(path.to_path_buf())),
        },
        None => load_raw_config(&dir.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `imgpress.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgpress Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# imgpress reads ./imgpress.toml, or the file given with --config.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# lossless: PNG stays PNG (max compression), everything else becomes JPEG q100.
#           Never retried.
# balanced: JPEG at the requested quality.
# high:     JPEG at a reduced quality (see [policy]).
mode = "balanced"

# Requested quality, 10 (smallest) to 100 (best). Ignored in lossless mode.
quality = 80

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Exact output size in pixels. Set both or neither.
# The aspect ratio is NOT preserved.
# width = 1920
# height = 1080

# ---------------------------------------------------------------------------
# Quality policy
# ---------------------------------------------------------------------------
[policy]
# High mode encodes at min(quality * high_factor, high_ceiling).
high_factor = 0.7
high_ceiling = 60

# When an encode is not smaller than the input, it is retried once at
# quality * retry_factor (always strictly lower than the first attempt).
retry_factor = 0.7

# No derived quality goes below this. It must stay below the lowest high
# mode quality, min(10 * high_factor, high_ceiling), so every derived
# quality is strictly lower than the one before it.
min_quality = 5

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory for compressed files and the archive.
directory = "."

# Write one compressed_<name> file per image.
write_files = true

# Bundle all results into a single ZIP.
archive = false
archive_name = "compressed_images.zip"
"##
}
