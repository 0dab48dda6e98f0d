//! Product outline tinting.
//!
//! The product background is a line-art outline with transparent interior.
//! Tinting fills the whole raster with the product color and draws the
//! outline on top unmodified, so the color shows through wherever the
//! outline is transparent.

use std::collections::HashMap;
use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use pod_core::{ProductColor, ProductSide};

use crate::error::RenderResult;
use crate::image::{create_solid_color, RasterImage};

/// File name of the front outline inside an asset directory.
pub const FRONT_OUTLINE_FILE: &str = "front_outline.png";

/// File name of the back outline inside an asset directory.
pub const BACK_OUTLINE_FILE: &str = "back_outline.png";

const OUTLINE_STROKE: Rgba<u8> = Rgba([96, 96, 96, 255]);

/// Fill `color` behind `outline`.
#[must_use]
pub fn blend_behind(outline: &RgbaImage, color: [u8; 3]) -> RasterImage {
    let [r, g, b] = color;
    let mut composite = create_solid_color(outline.width(), outline.height(), [r, g, b, 255]);
    imageops::overlay(&mut composite, outline, 0, 0);
    composite
}

/// A transparent outline with a 2 px border, used when no artwork is provided.
#[must_use]
pub fn plain_outline(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let on_border = x < 2 || y < 2 || x + 2 >= width || y + 2 >= height;
        if on_border {
            OUTLINE_STROKE
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Original outlines per side plus the current tinted background.
///
/// Tints are always computed from the stored originals, never from a
/// previously tinted raster.
#[derive(Debug, Default)]
pub struct BackgroundLibrary {
    originals: HashMap<ProductSide, RgbaImage>,
    current: Option<(ProductSide, ProductColor, RasterImage)>,
}

impl BackgroundLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A library with generated outlines for both sides.
    #[must_use]
    pub fn plain(width: u32, height: u32) -> Self {
        let mut library = Self::new();
        library.insert(ProductSide::Front, plain_outline(width, height));
        library.insert(ProductSide::Back, plain_outline(width, height));
        library
    }

    /// Load `front_outline.png` and `back_outline.png` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or decoded.
    pub fn load_dir(dir: impl AsRef<Path>) -> RenderResult<Self> {
        let dir = dir.as_ref();
        let mut library = Self::new();
        for (side, file) in [
            (ProductSide::Front, FRONT_OUTLINE_FILE),
            (ProductSide::Back, BACK_OUTLINE_FILE),
        ] {
            let outline = crate::image::load_image(dir.join(file))?;
            library.insert(side, crate::image::to_rgba_image(&outline)?);
        }
        tracing::info!(dir = %dir.display(), "product outlines loaded");
        Ok(library)
    }

    /// Store the original outline for a side.
    pub fn insert(&mut self, side: ProductSide, outline: RgbaImage) {
        if self
            .current
            .as_ref()
            .is_some_and(|(current_side, _, _)| *current_side == side)
        {
            self.current = None;
        }
        self.originals.insert(side, outline);
    }

    /// The untinted outline for a side.
    #[must_use]
    pub fn original(&self, side: ProductSide) -> Option<&RgbaImage> {
        self.originals.get(&side)
    }

    /// The outline for `side` tinted with `color`.
    ///
    /// Re-blends from the original whenever side or color differ from the
    /// last call. Returns `None` if no outline is stored for the side.
    pub fn tinted(&mut self, side: ProductSide, color: ProductColor) -> Option<&RasterImage> {
        let cached = self
            .current
            .as_ref()
            .is_some_and(|(s, c, _)| *s == side && *c == color);
        if !cached {
            let original = self.originals.get(&side)?;
            tracing::debug!(%side, %color, "re-blending background");
            self.current = Some((side, color, blend_behind(original, color.rgb())));
        }
        self.current.as_ref().map(|(_, _, raster)| raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_outline() -> RgbaImage {
        // left column opaque black, right column transparent
        RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn test_blend_fills_behind_transparent_pixels() {
        let blended = blend_behind(&half_outline(), [0, 0, 128]);
        assert_eq!(blended.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(blended.get_pixel(1, 0).0, [0, 0, 128, 255]);
    }

    #[test]
    fn test_tint_is_computed_from_original() {
        let mut library = BackgroundLibrary::new();
        library.insert(ProductSide::Front, half_outline());

        let red = library
            .tinted(ProductSide::Front, ProductColor::Red)
            .expect("outline")
            .clone();
        assert_eq!(red.get_pixel(1, 0).0, [255, 0, 0, 255]);

        let blue = library
            .tinted(ProductSide::Front, ProductColor::Blue)
            .expect("outline");
        assert_eq!(blue.get_pixel(1, 0).0, [0, 0, 255, 255]);
        assert_eq!(
            library.original(ProductSide::Front).expect("original").get_pixel(1, 0).0,
            [0, 0, 0, 0]
        );
    }

    #[test]
    fn test_missing_side_returns_none() {
        let mut library = BackgroundLibrary::new();
        library.insert(ProductSide::Front, half_outline());
        assert!(library.tinted(ProductSide::Back, ProductColor::White).is_none());
    }

    #[test]
    fn test_replacing_original_invalidates_tint() {
        let mut library = BackgroundLibrary::new();
        library.insert(ProductSide::Front, half_outline());
        let _ = library.tinted(ProductSide::Front, ProductColor::Gray);
        library.insert(ProductSide::Front, plain_outline(4, 4));
        let tinted = library
            .tinted(ProductSide::Front, ProductColor::Gray)
            .expect("outline");
        assert_eq!(tinted.dimensions(), (4, 4));
    }

    #[test]
    fn test_plain_outline_border() {
        let outline = plain_outline(10, 10);
        assert_eq!(outline.get_pixel(0, 5).0[3], 255);
        assert_eq!(outline.get_pixel(1, 5).0[3], 255);
        assert_eq!(outline.get_pixel(5, 5).0[3], 0);
        assert_eq!(outline.get_pixel(9, 5).0[3], 255);
    }

    #[test]
    fn test_load_dir_reads_both_sides() {
        let dir = tempfile::tempdir().expect("tempdir");
        for file in [FRONT_OUTLINE_FILE, BACK_OUTLINE_FILE] {
            plain_outline(8, 8).save(dir.path().join(file)).expect("save");
        }
        let library = BackgroundLibrary::load_dir(dir.path()).expect("load");
        assert!(library.original(ProductSide::Back).is_some());
    }
}
