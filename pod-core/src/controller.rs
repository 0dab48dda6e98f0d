//! Canvas controller - owns the items and routes gestures to them.
//!
//! Each item is driven by three independent gesture families (pan, rotate,
//! pinch). A family captures its baseline on `Began`, derives a candidate from
//! baseline plus the cumulative delta on `Changed`, and commits the snapped
//! value on `Ended`/`Cancelled`. All families write into the same live
//! transform and go through [`CanvasItem::apply_transform`], so simultaneous
//! gestures compose as scale, then rotate, around the item center.

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{clamp_scale, fit_size, snap_position, snap_rotation, Point, Size};
use crate::gesture::{Gesture, GesturePhase};
use crate::haptics::HapticFeedback;
use crate::item::{CanvasItem, ImageData, ItemContent, ItemId, ItemTransform, SelectionFrame};

/// Fraction of the canvas a newly added image may occupy.
pub const IMAGE_FILL_RATIO: f64 = 0.8;

/// Diagonal offset between successively added images.
pub const PLACEMENT_STEP: f64 = 20.0;

/// A long press awaiting user confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeletion {
    /// The item the user asked to delete.
    pub id: ItemId,
}

impl PendingDeletion {
    /// Title for the confirmation prompt.
    pub const TITLE: &'static str = "Delete item?";
}

/// One item as it should be rendered.
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Item identifier.
    pub id: ItemId,
    /// What to draw.
    pub content: ItemContent,
    /// Unscaled bounds.
    pub size: Size,
    /// Committed transform to draw with; in-flight gesture values are excluded.
    pub transform: ItemTransform,
    /// Whether the item is selected.
    pub selected: bool,
    /// Selection overlay.
    pub frame: SelectionFrame,
}

/// Render-ready copy of the canvas, items in z-order (bottom first).
#[derive(Debug, Clone)]
pub struct CanvasSnapshot {
    /// Canvas bounds.
    pub bounds: Size,
    /// Items, bottom first.
    pub items: Vec<RenderItem>,
}

/// Exclusive owner of the canvas items.
pub struct CanvasController {
    bounds: Size,
    items: Vec<CanvasItem>,
    haptics: Box<dyn HapticFeedback>,
    pending_deletion: Option<PendingDeletion>,
}

impl std::fmt::Debug for CanvasController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasController")
            .field("bounds", &self.bounds)
            .field("items", &self.items.len())
            .field("pending_deletion", &self.pending_deletion)
            .finish_non_exhaustive()
    }
}

impl CanvasController {
    /// Create an empty canvas.
    #[must_use]
    pub fn new(bounds: Size, haptics: Box<dyn HapticFeedback>) -> Self {
        Self {
            bounds,
            items: Vec::new(),
            haptics,
            pending_deletion: None,
        }
    }

    /// Canvas bounds.
    #[must_use]
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Items in z-order, bottom first.
    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the canvas has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The selected item, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.items
            .iter()
            .find(|item| item.is_selected())
            .map(CanvasItem::id)
    }

    /// The deletion awaiting confirmation, if any.
    #[must_use]
    pub fn pending_deletion(&self) -> Option<PendingDeletion> {
        self.pending_deletion
    }

    /// Add an image fitted to the canvas and select it.
    ///
    /// Successive images are offset diagonally so they do not stack exactly.
    /// Only images count toward the offset; text items are ignored.
    pub fn add_image(&mut self, image: ImageData) -> ItemId {
        let size = fit_size(image.natural_size(), self.bounds, IMAGE_FILL_RATIO);
        let images = self.items.iter().filter(|item| !item.content().is_text()).count();
        #[allow(clippy::cast_precision_loss)]
        let offset = images as f64 * PLACEMENT_STEP;
        let center = self.bounds.center() + Point::new(offset, offset);

        let item = CanvasItem::new(ItemContent::Image(image), size, center);
        let id = item.id();
        self.items.push(item);
        self.focus(id);
        tracing::debug!(%id, x = center.x, y = center.y, "image added");
        id
    }

    /// Add a default text element at the canvas center and select it.
    pub fn add_text(&mut self) -> ItemId {
        let item = CanvasItem::text(ItemContent::default_text(), self.bounds.center());
        let id = item.id();
        self.items.push(item);
        self.focus(id);
        tracing::debug!(%id, "text added");
        id
    }

    /// Replace the content of a text item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or is not text.
    pub fn update_text(&mut self, id: ItemId, text: &str) -> CanvasResult<()> {
        let item = self.item_mut(id)?;
        if item.set_text(text) {
            Ok(())
        } else {
            Err(CanvasError::InvalidOperation(format!(
                "{id} is not a text item"
            )))
        }
    }

    /// Delete a text item immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or is not text.
    pub fn delete_text(&mut self, id: ItemId) -> CanvasResult<()> {
        let is_text = self.item_mut(id)?.content().is_text();
        if !is_text {
            return Err(CanvasError::InvalidOperation(format!(
                "{id} is not a text item"
            )));
        }
        self.remove(id);
        Ok(())
    }

    /// Topmost item under `point`.
    #[must_use]
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|item| item.contains_point(point))
            .map(CanvasItem::id)
    }

    /// Select an item, deselecting all others, and bring it to the front.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist.
    pub fn select(&mut self, id: ItemId) -> CanvasResult<()> {
        if self.item(id).is_none() {
            return Err(CanvasError::ItemNotFound(id.to_string()));
        }
        self.focus(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }

    /// Route a gesture to an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist.
    pub fn handle_gesture(&mut self, id: ItemId, gesture: Gesture) -> CanvasResult<()> {
        if self.item(id).is_none() {
            return Err(CanvasError::ItemNotFound(id.to_string()));
        }
        match gesture {
            Gesture::Pan { phase, translation } => self.pan(id, phase, translation),
            Gesture::Rotate { phase, rotation } => self.rotate(id, phase, rotation),
            Gesture::Pinch { phase, scale } => self.pinch(id, phase, scale),
            Gesture::Tap => self.focus(id),
            Gesture::LongPress => self.long_press(id),
        }
        Ok(())
    }

    /// Delete the item awaiting confirmation.
    ///
    /// If the deleted item was selected, the new topmost item becomes selected.
    ///
    /// # Errors
    ///
    /// Returns an error if no deletion is pending.
    pub fn confirm_delete(&mut self) -> CanvasResult<ItemId> {
        let pending = self
            .pending_deletion
            .take()
            .ok_or_else(|| CanvasError::NoPendingDeletion("none".to_string()))?;
        if !self.remove(pending.id) {
            return Err(CanvasError::NoPendingDeletion(pending.id.to_string()));
        }
        Ok(pending.id)
    }

    /// Discard the pending deletion.
    pub fn cancel_delete(&mut self) {
        if let Some(pending) = self.pending_deletion.take() {
            tracing::debug!(id = %pending.id, "deletion cancelled");
        }
    }

    /// Recompute every transform and overlay and return a render snapshot.
    ///
    /// Snapshot items carry their committed transform. The selection frame
    /// follows the live transform.
    pub fn flush_layout(&mut self) -> CanvasSnapshot {
        for item in &mut self.items {
            item.apply_transform();
            item.refresh_frame();
        }
        CanvasSnapshot {
            bounds: self.bounds,
            items: self
                .items
                .iter()
                .map(|item| RenderItem {
                    id: item.id(),
                    content: item.content().clone(),
                    size: item.size(),
                    transform: item.committed(),
                    selected: item.is_selected(),
                    frame: item.frame(),
                })
                .collect(),
        }
    }

    // ========================================================================
    // Gesture families
    // ========================================================================

    fn pan(&mut self, id: ItemId, phase: GesturePhase, translation: Point) {
        if phase == GesturePhase::Began {
            self.focus(id);
        }
        let center = self.bounds.center();
        let Some(item) = self.find_mut(id) else {
            return;
        };

        if phase == GesturePhase::Began {
            item.baseline.pan = Some(item.committed.translation);
            return;
        }
        let Some(start) = expect_baseline(item.baseline.pan, id, "pan") else {
            return;
        };

        let snap = snap_position(start + translation, center, item.snap.axes);
        item.snap.axes = snap.state;
        item.transform.translation = snap.position;
        item.apply_transform();

        if phase.is_terminal() {
            item.committed.translation = snap.position;
            item.baseline.pan = None;
            item.refresh_frame();
        }
        if snap.crossed {
            self.haptics.impact();
        }
    }

    fn rotate(&mut self, id: ItemId, phase: GesturePhase, rotation: f64) {
        if phase == GesturePhase::Began {
            self.focus(id);
        }
        let Some(item) = self.find_mut(id) else {
            return;
        };

        if phase == GesturePhase::Began {
            item.baseline.rotation = Some(item.committed.rotation);
            return;
        }
        let Some(start) = expect_baseline(item.baseline.rotation, id, "rotate") else {
            return;
        };

        let snap = snap_rotation(start + rotation, item.snap.angle);
        item.snap.angle = snap.snapped;
        item.transform.rotation = snap.rotation;
        item.apply_transform();

        if phase.is_terminal() {
            item.committed.rotation = snap.rotation;
            item.baseline.rotation = None;
            item.refresh_frame();
        }
        if snap.crossed {
            self.haptics.impact();
        }
    }

    fn pinch(&mut self, id: ItemId, phase: GesturePhase, scale: f64) {
        if phase == GesturePhase::Began {
            self.focus(id);
        }
        let Some(item) = self.find_mut(id) else {
            return;
        };

        if phase == GesturePhase::Began {
            item.baseline.scale = Some(item.committed.scale);
            return;
        }
        let Some(start) = expect_baseline(item.baseline.scale, id, "pinch") else {
            return;
        };

        let clamped = clamp_scale(start * scale);
        item.transform.scale = clamped;
        item.apply_transform();

        if phase.is_terminal() {
            item.committed.scale = clamped;
            item.baseline.scale = None;
            item.refresh_frame();
        }
    }

    fn long_press(&mut self, id: ItemId) {
        tracing::debug!(%id, "deletion requested");
        self.pending_deletion = Some(PendingDeletion { id });
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Select `id` exclusively and move it to the top of the z-order.
    fn focus(&mut self, id: ItemId) {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return;
        };
        for item in &mut self.items {
            item.selected = false;
        }
        let mut item = self.items.remove(index);
        item.selected = true;
        self.items.push(item);
    }

    /// Remove an item, reselecting the topmost one if the removed item was selected.
    fn remove(&mut self, id: ItemId) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return false;
        };
        let removed = self.items.remove(index);
        if self.pending_deletion.is_some_and(|pending| pending.id == id) {
            self.pending_deletion = None;
        }
        if removed.is_selected() {
            if let Some(top) = self.items.last().map(CanvasItem::id) {
                self.focus(top);
            }
        }
        tracing::debug!(%id, remaining = self.items.len(), "item removed");
        true
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut CanvasItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn item_mut(&mut self, id: ItemId) -> CanvasResult<&mut CanvasItem> {
        self.find_mut(id)
            .ok_or_else(|| CanvasError::ItemNotFound(id.to_string()))
    }
}

/// A gesture that changes or ends without having begun is a caller bug.
fn expect_baseline<T>(baseline: Option<T>, id: ItemId, family: &str) -> Option<T> {
    debug_assert!(
        baseline.is_some(),
        "{family} gesture on {id} changed before it began"
    );
    if baseline.is_none() {
        tracing::error!(%id, family, "gesture update without a begin");
    }
    baseline
}
