//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which turns config
//! and a selection into a plan, and the [`backend`](super::backend), which
//! does the pixel work. A mock backend can then assert on plans without
//! decoding anything.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1-100, default 90). Clamped on construction.
//! - [`AnnotationStyle`]: Font size, anchor and color of the label.
//! - [`Annotation`]: Label text plus its style.
//! - [`PrepareParams`]: Everything one prepare needs, from source and output to the optional label.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How a label is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    /// Glyph height in pixels.
    pub size: f32,
    /// Top-left corner of the text, in output pixels.
    pub offset: (u32, u32),
    pub color: [u8; 3],
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            size: 24.0,
            offset: (32, 32),
            color: [255, 255, 255],
        }
    }
}

/// A label to draw onto the prepared image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub style: AnnotationStyle,
}

/// Parameters for a prepare operation (resize + annotate + encode).
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Cap on the longer side of the output.
    pub max_dimension: u32,
    pub quality: Quality,
    pub annotation: Option<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn annotation_style_defaults() {
        let style = AnnotationStyle::default();
        assert_eq!(style.size, 24.0);
        assert_eq!(style.offset, (32, 32));
        assert_eq!(style.color, [255, 255, 255]);
    }
}
