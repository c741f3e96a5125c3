//! Image preparation in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resize** | `DynamicImage::resize_exact`, Lanczos3, longer side capped |
//! | **Annotate** | `rusttype` glyph coverage alpha-blended onto the canvas |
//! | **Encode** | JPEG (or PNG by output extension) via the `image` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a prepare operation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions turning config into parameters

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{PrepareConfig, plan_prepare, prepare_image};
pub use params::{Annotation, AnnotationStyle, PrepareParams, Quality};
pub use rust_backend::RustBackend;
