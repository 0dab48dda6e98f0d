//! # POD Core
//!
//! Editor logic for the print-on-demand design studio.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 EditorSession               │
//! │  product color / size / side, edit/preview  │
//! ├─────────────────────────────────────────────┤
//! │               CanvasController              │
//! │  items in z-order, selection, deletion,     │
//! │  pan / rotate / pinch state machines        │
//! ├──────────────────────┬──────────────────────┤
//! │  Geometry            │  Storage ports       │
//! │  - snapping          │  - DataPort          │
//! │  - affine transforms │  - JSON / text store │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod haptics;
pub mod item;
pub mod session;
pub mod store;

pub use controller::{CanvasController, CanvasSnapshot, PendingDeletion, RenderItem};
pub use error::{
    AppError, CanvasError, CanvasResult, ErrorKind, Require, SourceLocation, GENERIC_USER_MESSAGE,
};
pub use geometry::{
    clamp_scale, fit_size, normalize_angle, snap_position, snap_rotation, Affine, AxisSnap,
    CardinalAngle, Point, PositionSnap, RotationSnap, Size,
};
pub use gesture::{Gesture, GesturePhase};
pub use haptics::{CountingHaptics, HapticFeedback, NoHaptics, TracingHaptics};
pub use item::{CanvasItem, ImageData, ItemContent, ItemId, ItemTransform, SelectionFrame, SnapMemory};
pub use session::{
    EditorMode, EditorSession, EditorTool, ParseOptionError, ProductColor, ProductSide,
    ProductSize,
};
pub use store::{
    DataPort, FileDataPort, FileStoreManager, JsonStore, MemoryDataPort, StoreError, TextStore,
};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
