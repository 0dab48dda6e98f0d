//! Image loading and encoding utilities.
//!
//! Decodes user uploads into [`ImageData`] for the canvas, and encodes
//! composited rasters as PNG or JPEG.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use pod_core::ImageData;

use crate::error::{RenderError, RenderResult};

/// A composited raster, RGBA8 with straight alpha.
pub type RasterImage = RgbaImage;

/// Default JPEG quality for uploads.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    /// MIME type for this format.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Decode an uploaded image into canvas pixels.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn decode(data: &[u8]) -> RenderResult<ImageData> {
    let format = ImageFormat::from_magic_bytes(data);
    let rgba = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode {format:?} image: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(width, height, ?format, "image decoded");
    ImageData::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| RenderError::Resource("Decoded buffer has wrong length".to_string()))
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image(path: impl AsRef<Path>) -> RenderResult<ImageData> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes)
}

/// View canvas pixels as an [`RgbaImage`].
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match its dimensions.
pub fn to_rgba_image(image: &ImageData) -> RenderResult<RgbaImage> {
    RgbaImage::from_raw(image.width(), image.height(), image.pixels().to_vec())
        .ok_or_else(|| RenderError::Resource("Invalid image data".to_string()))
}

/// Create a solid color raster.
#[must_use]
pub fn create_solid_color(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Create a placeholder raster with a checkerboard pattern.
#[must_use]
pub fn create_placeholder(width: u32, height: u32) -> RasterImage {
    let cell_size = 16u32;
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell_size + y / cell_size).is_multiple_of(2) {
            Rgba([200, 200, 200, 255])
        } else {
            Rgba([150, 150, 150, 255])
        }
    })
}

/// Encode a raster as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(raster: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Flatten alpha over `matte` and encode as JPEG.
///
/// # Errors
///
/// Returns an error if encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_jpeg(raster: &RasterImage, quality: u8, matte: [u8; 3]) -> RenderResult<Vec<u8>> {
    let (width, height) = raster.dimensions();
    let mut rgb = Vec::with_capacity(raster.as_raw().len() / 4 * 3);
    for pixel in raster.pixels() {
        let alpha = f32::from(pixel[3]) / 255.0;
        let inv = 1.0 - alpha;
        for channel in 0..3 {
            let value = f32::from(pixel[channel]).mul_add(alpha, f32::from(matte[channel]) * inv);
            rgb.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Encode canvas pixels as a base64 PNG data URI.
///
/// # Errors
///
/// Returns an error if the pixels cannot be encoded.
pub fn png_data_uri(image: &ImageData) -> RenderResult<String> {
    let png = encode_png(&to_rgba_image(image)?)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("data:{};base64,{encoded}", ImageFormat::Png.mime()))
}
