//! Canvas compositor.
//!
//! Flattens a [`CanvasSnapshot`] and a tinted product background into a single
//! raster. Items are drawn through an SVG intermediate (images embedded as
//! PNG data URIs, text as SVG text) rasterized with resvg/tiny-skia on top of
//! the background.

use std::fmt::Write;

use image::{imageops, Rgba, RgbaImage};
use pod_core::{CanvasController, CanvasSnapshot, ItemContent, RenderItem};
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{RenderError, RenderResult};
use crate::image::{encode_jpeg, png_data_uri, RasterImage, DEFAULT_JPEG_QUALITY};

/// Vertical offset that visually centers a line of text on its anchor, as a
/// fraction of the font size.
const TEXT_BASELINE_RATIO: f64 = 0.35;

/// Configuration for compositing.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Canvas width in points.
    pub width: u32,
    /// Canvas height in points.
    pub height: u32,
    /// Output pixels per canvas point (e.g. 2.0 for retina).
    pub scale: f32,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Color transparent pixels are flattened onto for JPEG.
    pub matte: [u8; 3],
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            scale: 1.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            matte: [255, 255, 255],
        }
    }
}

/// Renders canvas snapshots to rasters.
pub struct Compositor {
    config: CompositorConfig,
    options: usvg::Options<'static>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Create a compositor, loading system fonts for text items.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        tracing::debug!(faces = options.fontdb.len(), "compositor fonts loaded");
        Self { config, options }
    }

    /// Create a compositor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CompositorConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Flush the canvas layout and composite it over `background`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is empty-sized or rasterization fails.
    pub fn capture_snapshot(
        &self,
        canvas: &mut CanvasController,
        background: Option<&RgbaImage>,
    ) -> RenderResult<RasterImage> {
        let snapshot = canvas.flush_layout();
        self.render(&snapshot, background)
    }

    /// Capture the canvas and encode it as JPEG using the configured quality and matte.
    ///
    /// # Errors
    ///
    /// Returns an error if capture or encoding fails.
    pub fn capture_jpeg(
        &self,
        canvas: &mut CanvasController,
        background: Option<&RgbaImage>,
    ) -> RenderResult<Vec<u8>> {
        let raster = self.capture_snapshot(canvas, background)?;
        encode_jpeg(&raster, self.config.jpeg_quality, self.config.matte)
    }

    /// Composite a snapshot over `background`.
    ///
    /// The background is stretched to the output size. Items are not clipped
    /// individually; only the output bounds crop.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is empty-sized or rasterization fails.
    pub fn render(
        &self,
        snapshot: &CanvasSnapshot,
        background: Option<&RgbaImage>,
    ) -> RenderResult<RasterImage> {
        let (out_w, out_h) = self.output_dimensions(snapshot)?;
        let mut pixmap = Pixmap::new(out_w, out_h)
            .ok_or_else(|| RenderError::Composite("Failed to create pixmap".to_string()))?;

        if let Some(background) = background {
            paint_background(&mut pixmap, background);
        }

        let svg = self.render_to_svg(snapshot)?;
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| RenderError::Composite(format!("SVG parsing failed: {e}")))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        tracing::debug!(
            width = out_w,
            height = out_h,
            items = snapshot.items.len(),
            "canvas composited"
        );
        Ok(pixmap_to_image(&pixmap))
    }

    /// Build the SVG for the items of a snapshot, in z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is empty-sized or an image cannot be encoded.
    pub fn render_to_svg(&self, snapshot: &CanvasSnapshot) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions(snapshot)?;
        let bounds = snapshot.bounds;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
            bounds.width, bounds.height,
        );
        for item in &snapshot.items {
            render_item_svg(&mut svg, item)?;
        }
        svg.push_str("</svg>");
        Ok(svg)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn output_dimensions(&self, snapshot: &CanvasSnapshot) -> RenderResult<(u32, u32)> {
        if !snapshot.bounds.is_drawable() {
            return Err(RenderError::InvalidCanvas(format!(
                "{}x{}",
                snapshot.bounds.width, snapshot.bounds.height
            )));
        }
        let scale = f64::from(self.config.scale.max(f32::EPSILON));
        let out_w = (snapshot.bounds.width * scale).round() as u32;
        let out_h = (snapshot.bounds.height * scale).round() as u32;
        Ok((out_w.max(1), out_h.max(1)))
    }
}

/// Render a single item centered on its own origin, placed by its affine.
fn render_item_svg(svg: &mut String, item: &RenderItem) -> RenderResult<()> {
    let m = item.transform.item_to_canvas();
    let _ = write!(
        svg,
        "<g transform=\"matrix({} {} {} {} {} {})\">",
        m.a, m.b, m.c, m.d, m.tx, m.ty
    );

    let (w, h) = (item.size.width, item.size.height);
    match &item.content {
        ItemContent::Image(image) => {
            let href = png_data_uri(image)?;
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" href=\"{href}\"/>",
                -w / 2.0,
                -h / 2.0,
            );
        }
        ItemContent::Text {
            content,
            font_size,
            color,
            font_family,
        } => {
            let baseline = font_size * TEXT_BASELINE_RATIO;
            let _ = write!(
                svg,
                "<text x=\"0\" y=\"{baseline}\" font-size=\"{font_size}\" fill=\"{}\" font-family=\"{}, sans-serif\" text-anchor=\"middle\">{}</text>",
                escape_xml(color),
                escape_xml(font_family),
                escape_xml(content),
            );
        }
    }

    svg.push_str("</g>");
    Ok(())
}

/// Stretch `background` to the pixmap and copy it in, premultiplied.
fn paint_background(pixmap: &mut Pixmap, background: &RgbaImage) {
    let (w, h) = (pixmap.width(), pixmap.height());
    let resized;
    let source = if background.dimensions() == (w, h) {
        background
    } else {
        resized = imageops::resize(background, w, h, imageops::FilterType::Triangle);
        &resized
    };

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(source.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
}

fn pixmap_to_image(pixmap: &Pixmap) -> RasterImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::{ImageData, NoHaptics, Size};

    fn canvas() -> CanvasController {
        CanvasController::new(Size::new(200.0, 200.0), Box::new(NoHaptics))
    }

    fn red_square() -> ImageData {
        let pixels = [255, 0, 0, 255].repeat(100);
        ImageData::from_rgba(10, 10, pixels).expect("valid buffer")
    }

    #[test]
    fn test_svg_places_items_with_matrix() {
        let mut canvas = canvas();
        canvas.add_image(red_square());
        let snapshot = canvas.flush_layout();
        let svg = Compositor::with_defaults()
            .render_to_svg(&snapshot)
            .expect("svg");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("matrix(1 0 -0 1 100 100)") || svg.contains("matrix(1 0 0 1 100 100)"));
        assert!(svg.contains("href=\"data:image/png;base64,"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut canvas = canvas();
        let id = canvas.add_text();
        canvas.update_text(id, "Tom & <Jerry>").expect("update");
        let snapshot = canvas.flush_layout();
        let svg = Compositor::with_defaults()
            .render_to_svg(&snapshot)
            .expect("svg");
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn test_empty_canvas_is_invalid() {
        let mut canvas = CanvasController::new(Size::new(0.0, 100.0), Box::new(NoHaptics));
        let result = Compositor::with_defaults().capture_snapshot(&mut canvas, None);
        assert!(matches!(result, Err(RenderError::InvalidCanvas(_))));
    }

    #[test]
    fn test_scale_multiplies_output_size() {
        let compositor = Compositor::new(CompositorConfig {
            scale: 2.0,
            ..CompositorConfig::default()
        });
        let raster = compositor
            .capture_snapshot(&mut canvas(), None)
            .expect("render");
        assert_eq!(raster.dimensions(), (400, 400));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a\"b'c"), "a&quot;b&apos;c");
    }
}
