//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Annotate | `rusttype` layout + per-pixel coverage blending |
//! | Encode | `JpegEncoder` at the requested quality, `PngEncoder` for `.png` outputs |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{Annotation, PrepareParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::path::Path;
use tracing::warn;

/// Pure Rust backend using the `image` crate, with an optional font for
/// annotations.
///
/// Without a font, labels are skipped and the image is only resized.
#[derive(Default)]
pub struct RustBackend {
    font: Option<Font<'static>>,
}

impl RustBackend {
    pub fn new() -> Self {
        Self { font: None }
    }

    /// Backend using the TrueType font at `path`.
    pub fn with_font_file(path: &Path) -> Result<Self, BackendError> {
        Ok(Self {
            font: Some(load_font(path)?),
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

/// Read and parse a TrueType/OpenType font file.
pub fn load_font(path: &Path) -> Result<Font<'static>, BackendError> {
    let bytes = std::fs::read(path).map_err(BackendError::Io)?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| BackendError::Font(format!("Failed to parse font {}", path.display())))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save an image, picking the encoder from the output extension. Anything
/// that is not `.png` is written as JPEG.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let result = if ext == "png" {
        img.write_with_encoder(image::codecs::png::PngEncoder::new(writer))
    } else {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
            writer,
            quality.clamp(1, 100) as u8,
        ))
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("Encode {} failed: {}", path.display(), e))
    })
}

/// Draw `annotation` onto `canvas` with its top-left corner at the style's
/// offset. Glyph pixels falling outside the canvas are clipped.
fn draw_annotation(canvas: &mut RgbaImage, font: &Font<'_>, annotation: &Annotation) {
    let style = &annotation.style;
    let scale = Scale::uniform(style.size);
    let v_metrics = font.v_metrics(scale);
    let (x, y) = style.offset;
    let [r, g, b] = style.color;

    for glyph in font.layout(&annotation.text, scale, point(0.0, v_metrics.ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = x as i64 + gx as i64 + bb.min.x as i64;
            let py = y as i64 + gy as i64 + bb.min.y as i64;
            if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                return;
            }
            let alpha = (coverage * 255.0).round() as u8;
            blend_pixel(
                canvas.get_pixel_mut(px as u32, py as u32),
                Rgba([r, g, b, alpha]),
            );
        });
    }
}

/// Source-over blend of `overlay` onto `base`.
fn blend_pixel(base: &mut Rgba<u8>, overlay: Rgba<u8>) {
    let alpha = overlay[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let blended = overlay[channel] as f32 * alpha + base[channel] as f32 * (1.0 - alpha);
        base[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    let base_alpha = base[3] as f32 / 255.0;
    base[3] = ((alpha + base_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

impl ImageBackend for RustBackend {
    fn prepare(&self, params: &PrepareParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let (width, height) =
            calculate_fit_dimensions((img.width(), img.height()), params.max_dimension);
        let img = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        let img = match (&params.annotation, &self.font) {
            (Some(annotation), Some(font)) => {
                let mut canvas = img.to_rgba8();
                draw_annotation(&mut canvas, font, annotation);
                DynamicImage::ImageRgba8(canvas)
            }
            (Some(annotation), None) => {
                warn!(label = %annotation.text, "no font available, skipping annotation");
                img
            }
            (None, _) => img,
        };

        save_image(&img, &params.output, params.quality.value())?;
        Ok(Dimensions { width, height })
    }
}
