//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of an image shrunk to fit within `max` on its longer
/// side, preserving aspect ratio.
///
/// Images already within bounds keep their size: this only ever shrinks.
/// The shorter side is rounded and never drops below one pixel.
///
/// # Examples
/// ```
/// # use photo_picker::imaging::calculate_fit_dimensions;
/// // 4000x3000 landscape capped at 1024 → 1024x768
/// assert_eq!(calculate_fit_dimensions((4000, 3000), 1024), (1024, 768));
///
/// // Small images are left alone
/// assert_eq!(calculate_fit_dimensions((640, 480), 1024), (640, 480));
/// ```
pub fn calculate_fit_dimensions(original: (u32, u32), max: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let longer_edge = orig_w.max(orig_h);

    if longer_edge <= max || longer_edge == 0 {
        return original;
    }

    let ratio = max as f64 / longer_edge as f64;
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);

    if orig_w >= orig_h {
        // Landscape or square
        (max, scale(orig_h))
    } else {
        // Portrait
        (scale(orig_w), max)
    }
}
