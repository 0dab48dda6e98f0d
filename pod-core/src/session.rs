//! Editor session - product configuration tied to the canvas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::CanvasController;
use crate::error::CanvasResult;
use crate::geometry::Size;
use crate::gesture::Gesture;
use crate::haptics::HapticFeedback;
use crate::item::ItemId;

/// Default product shown in a new session.
pub const DEFAULT_PRODUCT_NAME: &str = "Long Sleeve T-Shirt";

/// A product option string did not match any known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {option}: {value}")]
pub struct ParseOptionError {
    option: &'static str,
    value: String,
}

impl ParseOptionError {
    fn new(option: &'static str, value: &str) -> Self {
        Self {
            option,
            value: value.to_string(),
        }
    }
}

/// Color of the physical product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductColor {
    /// White.
    #[default]
    White,
    /// Black.
    Black,
    /// Navy.
    Navy,
    /// Gray.
    Gray,
    /// Red.
    Red,
    /// Blue.
    Blue,
}

impl ProductColor {
    /// Every color, in picker order.
    pub const ALL: [Self; 6] = [
        Self::White,
        Self::Black,
        Self::Navy,
        Self::Gray,
        Self::Red,
        Self::Blue,
    ];

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
            Self::Navy => "Navy",
            Self::Gray => "Gray",
            Self::Red => "Red",
            Self::Blue => "Blue",
        }
    }

    /// Fill color as `[r, g, b]`.
    #[must_use]
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::White => [255, 255, 255],
            Self::Black => [0, 0, 0],
            Self::Navy => [0, 0, 128],
            Self::Gray => [128, 128, 128],
            Self::Red => [255, 0, 0],
            Self::Blue => [0, 0, 255],
        }
    }
}

impl fmt::Display for ProductColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductColor {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOptionError::new("color", s))
    }
}

/// Garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductSize {
    /// Small.
    S,
    /// Medium.
    #[default]
    M,
    /// Large.
    L,
    /// Extra large.
    XL,
    /// Double extra large.
    XXL,
}

impl ProductSize {
    /// Every size, smallest first.
    pub const ALL: [Self; 5] = [Self::S, Self::M, Self::L, Self::XL, Self::XXL];

    /// Label shown on the size picker.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
            Self::XXL => "XXL",
        }
    }
}

impl fmt::Display for ProductSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductSize {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOptionError::new("size", s))
    }
}

/// Which side of the garment is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSide {
    /// Front side.
    #[default]
    Front,
    /// Back side.
    Back,
}

impl ProductSide {
    /// The other side.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl fmt::Display for ProductSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Front => "front",
            Self::Back => "back",
        })
    }
}

impl FromStr for ProductSide {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            _ => Err(ParseOptionError::new("side", s)),
        }
    }
}

/// Whether the canvas accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Gestures manipulate items.
    #[default]
    Edit,
    /// Read-only presentation.
    Preview,
}

impl FromStr for EditorMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edit" => Ok(Self::Edit),
            "preview" => Ok(Self::Preview),
            _ => Err(ParseOptionError::new("mode", s)),
        }
    }
}

/// Editor toolbar tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTool {
    /// Place and arrange images.
    #[default]
    Design,
    /// Add text.
    Text,
    /// Pick the product color.
    Colors,
    /// Pick the garment size.
    Sizes,
}

/// Aggregate root for one design: product options plus the canvas.
///
/// The item collection is shared by both sides; switching sides only changes
/// the background outline.
#[derive(Debug)]
pub struct EditorSession {
    product_name: String,
    color: ProductColor,
    size: ProductSize,
    side: ProductSide,
    mode: EditorMode,
    tool: EditorTool,
    canvas: CanvasController,
}

impl EditorSession {
    /// Start a session with default product options.
    #[must_use]
    pub fn new(bounds: Size, haptics: Box<dyn HapticFeedback>) -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            color: ProductColor::default(),
            size: ProductSize::default(),
            side: ProductSide::default(),
            mode: EditorMode::default(),
            tool: EditorTool::default(),
            canvas: CanvasController::new(bounds, haptics),
        }
    }

    /// Product display name.
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Rename the product.
    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.product_name = name.into();
    }

    /// Selected product color.
    #[must_use]
    pub fn color(&self) -> ProductColor {
        self.color
    }

    /// Selected garment size.
    #[must_use]
    pub fn size(&self) -> ProductSize {
        self.size
    }

    /// Side currently shown.
    #[must_use]
    pub fn side(&self) -> ProductSide {
        self.side
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Current toolbar tool.
    #[must_use]
    pub fn tool(&self) -> EditorTool {
        self.tool
    }

    /// Whether the front/back toggle is shown.
    #[must_use]
    pub fn side_toggle_visible(&self) -> bool {
        self.mode == EditorMode::Edit
    }

    /// The canvas.
    #[must_use]
    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    /// Mutable canvas access for non-gesture edits (adding images, text).
    pub fn canvas_mut(&mut self) -> &mut CanvasController {
        &mut self.canvas
    }

    /// Switch between edit and preview. Canvas state is kept.
    pub fn set_mode(&mut self, mode: EditorMode) {
        tracing::debug!(?mode, "editor mode changed");
        self.mode = mode;
    }

    /// Flip to the other side. Ignored in preview.
    ///
    /// Returns whether the side changed.
    pub fn toggle_side(&mut self) -> bool {
        if self.mode == EditorMode::Preview {
            return false;
        }
        self.side = self.side.flipped();
        tracing::debug!(side = %self.side, "side toggled");
        true
    }

    /// Show a specific side. Ignored in preview.
    ///
    /// Returns whether the side changed.
    pub fn set_side(&mut self, side: ProductSide) -> bool {
        if self.side == side {
            return false;
        }
        self.toggle_side()
    }

    /// Select the product color.
    pub fn select_color(&mut self, color: ProductColor) {
        self.color = color;
    }

    /// Select the garment size.
    pub fn select_size(&mut self, size: ProductSize) {
        self.size = size;
    }

    /// Switch toolbar tool. Choosing [`EditorTool::Text`] adds a text item.
    ///
    /// Returns the new text item, if one was added.
    pub fn select_tool(&mut self, tool: EditorTool) -> Option<ItemId> {
        self.tool = tool;
        (tool == EditorTool::Text).then(|| self.canvas.add_text())
    }

    /// Route a gesture to the canvas unless in preview.
    ///
    /// Returns whether the gesture was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist.
    pub fn handle_gesture(&mut self, id: ItemId, gesture: Gesture) -> CanvasResult<bool> {
        if self.mode == EditorMode::Preview {
            tracing::trace!(%id, "gesture ignored in preview");
            return Ok(false);
        }
        self.canvas.handle_gesture(id, gesture)?;
        Ok(true)
    }
}
