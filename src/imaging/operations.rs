//! High-level image operations.
//!
//! These functions turn configuration and a chosen photo into
//! [`PrepareParams`] and hand them to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Annotation, AnnotationStyle, PrepareParams, Quality};
use crate::config::PickerConfig;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Everything a prepare needs from the config, detached from TOML shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareConfig {
    pub max_dimension: u32,
    pub quality: Quality,
    /// `None` disables the label.
    pub annotation: Option<AnnotationStyle>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            quality: Quality::default(),
            annotation: Some(AnnotationStyle::default()),
        }
    }
}

impl From<&PickerConfig> for PrepareConfig {
    fn from(config: &PickerConfig) -> Self {
        let annotation = config.annotation.enabled.then(|| AnnotationStyle {
            size: config.annotation.size,
            offset: (config.annotation.offset[0], config.annotation.offset[1]),
            color: config.annotation.color,
        });
        Self {
            max_dimension: config.image.max_dimension,
            quality: Quality::new(config.image.quality),
            annotation,
        }
    }
}

/// Plan a prepare operation without executing it.
pub fn plan_prepare(
    source: &Path,
    output: &Path,
    label: &str,
    config: &PrepareConfig,
) -> PrepareParams {
    PrepareParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_dimension: config.max_dimension,
        quality: config.quality,
        annotation: config.annotation.map(|style| Annotation {
            text: label.to_string(),
            style,
        }),
    }
}

/// Resize and annotate `source` into `output`.
pub fn prepare_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    label: &str,
    config: &PrepareConfig,
) -> Result<Dimensions> {
    let params = plan_prepare(source, output, label, config);
    backend.prepare(&params)
}
