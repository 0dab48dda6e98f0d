//! Canvas items - the images and text placed on a product.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Affine, AxisSnap, CardinalAngle, Point, Size};

/// Approximate glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Approximate line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Unique identifier for a canvas item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded image pixels, RGBA8 with straight alpha, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl ImageData {
    /// Wrap decoded RGBA8 pixels.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if u64::try_from(pixels.len()).ok()? != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Pixel width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Natural size in canvas units (one pixel per unit).
    #[must_use]
    pub fn natural_size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Default content of a new text item.
pub const DEFAULT_TEXT: &str = "Your Text";

/// Default font size of a new text item, in points.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Default font family.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// What a canvas item shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemContent {
    /// A user-supplied image.
    Image(ImageData),
    /// A single line of text.
    Text {
        /// Text content.
        content: String,
        /// Font size in points.
        font_size: f64,
        /// Text color as hex.
        color: String,
        /// Font family name.
        font_family: String,
    },
}

impl ItemContent {
    /// Text with the default styling.
    #[must_use]
    pub fn default_text() -> Self {
        Self::Text {
            content: DEFAULT_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }

    /// Whether this is a text item.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Approximate bounds of a line of text.
#[must_use]
pub fn text_size(content: &str, font_size: f64) -> Size {
    #[allow(clippy::cast_precision_loss)]
    let chars = content.chars().count().max(1) as f64;
    Size::new(
        chars * font_size * GLYPH_WIDTH_RATIO,
        font_size * LINE_HEIGHT_RATIO,
    )
}

/// Position, rotation and scale of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemTransform {
    /// Item center in canvas coordinates.
    pub translation: Point,
    /// Rotation in radians, normalized to `[0, 2π)`.
    pub rotation: f64,
    /// Uniform scale, clamped to `[0.5, 5.0]`.
    pub scale: f64,
}

impl ItemTransform {
    /// Untransformed item centered at `center`.
    #[must_use]
    pub fn at(center: Point) -> Self {
        Self {
            translation: center,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Item-local to canvas transform: scale, then rotate, then move to the center.
    #[must_use]
    pub fn item_to_canvas(&self) -> Affine {
        Affine::scale_then_rotate(self.scale, self.rotation).then(Affine::translate(
            self.translation.x,
            self.translation.y,
        ))
    }
}

/// Per-family gesture baselines, present only while that gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureBaseline {
    /// Center at pan begin.
    pub pan: Option<Point>,
    /// Rotation at rotate begin.
    pub rotation: Option<f64>,
    /// Scale at pinch begin.
    pub scale: Option<f64>,
}

/// Snap memory used to debounce haptic feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapMemory {
    /// Last cardinal angle the rotation snapped to.
    pub angle: Option<CardinalAngle>,
    /// Axes currently pinned to the container center.
    pub axes: AxisSnap,
}

/// Selection overlay: the four corners of the item in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionFrame {
    /// Top-left, top-right, bottom-right, bottom-left (in item-local terms).
    pub corners: [Point; 4],
}

/// A single item on the canvas.
#[derive(Debug, Clone)]
pub struct CanvasItem {
    id: ItemId,
    content: ItemContent,
    size: Size,
    /// Live transform shown on screen.
    pub(crate) transform: ItemTransform,
    /// Committed transform, replaced at the end of each gesture.
    pub(crate) committed: ItemTransform,
    pub(crate) baseline: GestureBaseline,
    pub(crate) snap: SnapMemory,
    pub(crate) selected: bool,
    affine: Affine,
    frame: SelectionFrame,
}

impl CanvasItem {
    /// Create an item of the given unscaled size centered at `center`.
    #[must_use]
    pub fn new(content: ItemContent, size: Size, center: Point) -> Self {
        let transform = ItemTransform::at(center);
        let mut item = Self {
            id: ItemId::new(),
            content,
            size,
            transform,
            committed: transform,
            baseline: GestureBaseline::default(),
            snap: SnapMemory::default(),
            selected: false,
            affine: Affine::IDENTITY,
            frame: SelectionFrame::default(),
        };
        item.apply_transform();
        item.refresh_frame();
        item
    }

    /// Create a text item sized from its content.
    #[must_use]
    pub fn text(content: ItemContent, center: Point) -> Self {
        let size = match &content {
            ItemContent::Text {
                content, font_size, ..
            } => text_size(content, *font_size),
            ItemContent::Image(image) => image.natural_size(),
        };
        Self::new(content, size, center)
    }

    /// The item's identifier.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The item's content.
    #[must_use]
    pub fn content(&self) -> &ItemContent {
        &self.content
    }

    /// Unscaled bounds.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Live transform.
    #[must_use]
    pub fn transform(&self) -> ItemTransform {
        self.transform
    }

    /// Committed transform.
    #[must_use]
    pub fn committed(&self) -> ItemTransform {
        self.committed
    }

    /// Current snap memory.
    #[must_use]
    pub fn snap_memory(&self) -> SnapMemory {
        self.snap
    }

    /// Whether this item is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Item-local to canvas transform as of the last [`apply_transform`](Self::apply_transform).
    #[must_use]
    pub fn affine(&self) -> Affine {
        self.affine
    }

    /// Selection overlay geometry.
    #[must_use]
    pub fn frame(&self) -> SelectionFrame {
        self.frame
    }

    /// Recompute the affine from the live transform.
    pub fn apply_transform(&mut self) {
        self.affine = self.transform.item_to_canvas();
    }

    /// Recompute the selection overlay from the current affine.
    pub fn refresh_frame(&mut self) {
        let hw = self.size.width / 2.0;
        let hh = self.size.height / 2.0;
        let local = [
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ];
        self.frame = SelectionFrame {
            corners: local.map(|p| self.affine.apply(p)),
        };
    }

    /// Hit test against the item's transformed bounds.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        let Some(inverse) = self.affine.invert() else {
            return false;
        };
        let local = inverse.apply(point);
        local.x.abs() <= self.size.width / 2.0 && local.y.abs() <= self.size.height / 2.0
    }

    /// Replace text content, restyling and resizing the item.
    ///
    /// Returns `false` if this is not a text item.
    pub(crate) fn set_text(&mut self, text: &str) -> bool {
        let ItemContent::Text {
            content, font_size, ..
        } = &mut self.content
        else {
            return false;
        };
        text.clone_into(content);
        self.size = text_size(content, *font_size);
        self.refresh_frame();
        true
    }
}
