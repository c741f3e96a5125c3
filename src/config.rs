//! Picker configuration.
//!
//! Handles loading, validating, and merging an optional `config.toml`. Stock
//! defaults are the base layer; a user file overrides only the keys it names.
//! The loaded [`PickerConfig`] is immutable and handed to each component at
//! construction.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [selection]
//! extensions = [".jpg", ".jpeg"]  # Recognised photo extensions (loose match)
//!
//! [cache]
//! file_name = "weights.csv"       # Weight cache name, next to the binary
//! max_age_hours = 24              # Rebuild the cache once it is this old
//!
//! [image]
//! max_dimension = 1024            # Longer side of the prepared image, in pixels
//! quality = 90                    # JPEG quality (1-100)
//!
//! [annotation]
//! enabled = true
//! font = "/usr/share/fonts/truetype/arial.ttf"  # Default: arial.ttf next to the binary
//! size = 24.0                     # Glyph height in pixels
//! offset = [32, 32]               # Top-left corner of the label
//! color = [255, 255, 255]         # RGB
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::scan::ExtensionMatcher;
use crate::staleness::StalenessPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Picker configuration loaded from a TOML file.
///
/// All fields have defaults matching the stock behaviour; a user file need
/// only specify the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    /// Which files count as photos.
    pub selection: SelectionConfig,
    /// Weight cache location and freshness window.
    pub cache: CacheConfig,
    /// Output image sizing and encoding.
    pub image: ImageConfig,
    /// Text label drawn onto the prepared image.
    pub annotation: AnnotationConfig,
}

impl PickerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "selection.extensions must not be empty".into(),
            ));
        }
        if self
            .selection
            .extensions
            .iter()
            .any(|e| e.trim_start_matches('.').is_empty())
        {
            return Err(ConfigError::Validation(
                "selection.extensions entries must not be empty".into(),
            ));
        }
        if self.cache.file_name.is_empty() {
            return Err(ConfigError::Validation(
                "cache.file_name must not be empty".into(),
            ));
        }
        if self.image.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "image.max_dimension must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.image.quality) {
            return Err(ConfigError::Validation(
                "image.quality must be 1-100".into(),
            ));
        }
        if self.annotation.size <= 0.0 {
            return Err(ConfigError::Validation(
                "annotation.size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn matcher(&self) -> ExtensionMatcher {
        ExtensionMatcher::new(&self.selection.extensions)
    }

    pub fn staleness(&self) -> StalenessPolicy {
        StalenessPolicy::new(self.cache.max_age())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Extensions, with or without the leading dot. Matching is
    /// case-insensitive and substring-based.
    pub extensions: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".jpg".to_string(), ".jpeg".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// File name used when no explicit cache path is given.
    pub file_name: String,
    /// Staleness window in hours. Zero rebuilds on every pick.
    pub max_age_hours: u64,
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(60 * 60))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file_name: "weights.csv".to_string(),
            max_age_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Cap on the longer side. Smaller images are left at their size.
    pub max_dimension: u32,
    pub quality: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            quality: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    pub enabled: bool,
    /// TrueType font. When absent, `arial.ttf` beside the executable is used
    /// if it exists; otherwise the label is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    pub size: f32,
    pub offset: [u32; 2],
    pub color: [u8; 3],
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font: None,
            size: 24.0,
            offset: [32, 32],
            color: [255, 255, 255],
        }
    }
}

/// Font file looked for beside the executable when none is configured.
pub const DEFAULT_FONT_FILE: &str = "arial.ttf";

impl AnnotationConfig {
    /// The configured font, or the default font next to the executable if
    /// that file exists.
    pub fn resolve_font(&self) -> Option<PathBuf> {
        if let Some(font) = &self.font {
            return Some(font.clone());
        }
        let candidate = exe_dir()?.join(DEFAULT_FONT_FILE);
        candidate.is_file().then_some(candidate)
    }
}

/// Directory holding the running executable.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Cache path used when none is given on the command line: the configured
/// file name, colocated with the executable.
pub fn default_cache_path(config: &PickerConfig) -> PathBuf {
    exe_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&config.cache.file_name)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PickerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PickerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PickerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or the stock defaults when no path is given.
///
/// A path that is given but missing is an error.
pub fn load_config(path: Option<&Path>) -> Result<PickerConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Printed by the `gen-config` operation.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Picker Configuration
# ==========================
# All options are optional. Values shown are the defaults.
# Unknown keys are rejected.

[selection]
# Files whose extension contains one of these (case-insensitive) are photos.
# The test is a loose substring match: ".jpg" also matches ".jpgx".
extensions = [".jpg", ".jpeg"]

[cache]
# Weight cache file name, placed next to the executable unless --weight is given.
file_name = "weights.csv"
# A pick rebuilds the cache first once it is this many hours old.
max_age_hours = 24

[image]
# The longer side of the prepared image is capped at this many pixels.
# Aspect ratio is preserved; smaller photos are not enlarged.
max_dimension = 1024
# JPEG encoding quality (1-100).
quality = 90

[annotation]
# Draw "<partition> <file name>" onto the prepared image.
enabled = true
# TrueType font. Defaults to arial.ttf next to the executable; without a
# font the label is skipped.
# font = "/path/to/font.ttf"
# Glyph height in pixels.
size = 24.0
# Top-left corner of the label, in pixels.
offset = [32, 32]
# Text color as RGB.
color = [255, 255, 255]
"##
}
