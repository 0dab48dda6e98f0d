//! # POD Renderer
//!
//! Compositing for the print-on-demand studio.
//!
//! ## Pipeline
//!
//! ```text
//! CanvasController ──flush_layout──▶ CanvasSnapshot ──▶ SVG ──resvg──┐
//!                                                                    ▼
//! BackgroundLibrary ──tint(side, color)──▶ background ──▶ Pixmap ──▶ RasterImage
//!                                                                    │
//!                                                       encode_jpeg / encode_png
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blend;
pub mod compositor;
pub mod error;
pub mod image;

pub use crate::blend::{blend_behind, plain_outline, BackgroundLibrary};
pub use crate::compositor::{Compositor, CompositorConfig};
pub use crate::error::{RenderError, RenderResult};
pub use crate::image::{
    create_placeholder, create_solid_color, decode, encode_jpeg, encode_png, load_image,
    to_rgba_image, ImageFormat, RasterImage, DEFAULT_JPEG_QUALITY,
};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
