//! Scripted edit sessions.
//!
//! An [`EditScript`] is a JSON list of editor commands replayed against an
//! [`EditorSession`]. Items are addressed by creation index: the first item
//! added by the script is `0`, the next `1`, and so on. Indexes stay stable
//! when items are deleted or reordered.
//!
//! ```json
//! {
//!   "product_name": "Hoodie",
//!   "commands": [
//!     { "op": "select_color", "color": "navy" },
//!     { "op": "add_image", "path": "logo.png" },
//!     { "op": "gesture", "item": 0,
//!       "gesture": { "gesture": "pinch", "phase": "began", "scale": 1.0 } }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use pod_core::{
    EditorMode, EditorSession, EditorTool, Gesture, ItemId, Point, ProductColor, ProductSide,
    ProductSize,
};
use pod_renderer::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// A replayable edit session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    /// Overrides the product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Commands in order.
    #[serde(default)]
    pub commands: Vec<EditCommand>,
}

impl EditScript {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> StudioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

/// One editor command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    /// Decode an image file and place it on the canvas.
    AddImage {
        /// Image path, relative to the script directory.
        path: PathBuf,
    },
    /// Add a text item, optionally replacing the default text.
    AddText {
        /// Initial text.
        #[serde(default)]
        text: Option<String>,
    },
    /// Replace the content of a text item.
    UpdateText {
        /// Item index.
        item: usize,
        /// New content.
        text: String,
    },
    /// Delete a text item without confirmation.
    DeleteText {
        /// Item index.
        item: usize,
    },
    /// Feed a gesture event to an item.
    Gesture {
        /// Item index.
        item: usize,
        /// The event.
        gesture: Gesture,
    },
    /// Tap the canvas at a point; empty space clears the selection.
    TapAt {
        /// Canvas coordinates.
        point: Point,
    },
    /// Confirm the pending deletion.
    ConfirmDelete,
    /// Dismiss the pending deletion.
    CancelDelete,
    /// Change the product color.
    SelectColor {
        /// New color.
        color: ProductColor,
    },
    /// Change the product size.
    SelectSize {
        /// New size.
        size: ProductSize,
    },
    /// Show a product side.
    SetSide {
        /// Side to show.
        side: ProductSide,
    },
    /// Flip between front and back.
    ToggleSide,
    /// Switch between edit and preview.
    SetMode {
        /// New mode.
        mode: EditorMode,
    },
    /// Pick a toolbar tool.
    SelectTool {
        /// The tool.
        tool: EditorTool,
    },
}

/// Summary of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Commands that changed the session.
    pub applied: usize,
    /// Commands the session ignored, such as gestures in preview mode.
    pub ignored: usize,
}

/// Replays scripts, tracking the items they create.
#[derive(Debug)]
pub struct ScriptRunner {
    base_dir: PathBuf,
    created: Vec<ItemId>,
}

impl ScriptRunner {
    /// A runner resolving image paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            created: Vec::new(),
        }
    }

    /// Items created so far, by index.
    #[must_use]
    pub fn created(&self) -> &[ItemId] {
        &self.created
    }

    /// Replay `script` against `session`.
    ///
    /// # Errors
    ///
    /// Stops at the first command that fails and returns its error.
    pub fn run(&mut self, session: &mut EditorSession, script: &EditScript) -> StudioResult<ScriptReport> {
        if let Some(name) = &script.product_name {
            session.set_product_name(name.clone());
        }

        let mut report = ScriptReport::default();
        for (index, command) in script.commands.iter().enumerate() {
            let applied = self.apply(session, command).map_err(|e| {
                tracing::warn!(index, ?command, error = %e, "script command failed");
                e
            })?;
            if applied {
                report.applied += 1;
            } else {
                report.ignored += 1;
            }
        }
        tracing::info!(
            applied = report.applied,
            ignored = report.ignored,
            items = session.canvas().len(),
            "script replayed"
        );
        Ok(report)
    }

    /// Apply one command. Returns `false` if the session ignored it.
    ///
    /// # Errors
    ///
    /// Returns an error if the command addresses a missing item or the wrong
    /// kind of item, or an image has an unsupported type or cannot be loaded.
    pub fn apply(&mut self, session: &mut EditorSession, command: &EditCommand) -> StudioResult<bool> {
        match command {
            EditCommand::AddImage { path } => {
                let format = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(ImageFormat::Unknown, ImageFormat::from_extension);
                if format == ImageFormat::Unknown {
                    return Err(StudioError::Script(format!(
                        "unsupported image type: {}",
                        path.display()
                    )));
                }
                let image = pod_renderer::load_image(self.base_dir.join(path))?;
                let id = session.canvas_mut().add_image(image);
                self.created.push(id);
            }
            EditCommand::AddText { text } => {
                let id = session.canvas_mut().add_text();
                if let Some(text) = text {
                    session.canvas_mut().update_text(id, text)?;
                }
                self.created.push(id);
            }
            EditCommand::UpdateText { item, text } => {
                let id = self.item(*item)?;
                session.canvas_mut().update_text(id, text)?;
            }
            EditCommand::DeleteText { item } => {
                let id = self.item(*item)?;
                session.canvas_mut().delete_text(id)?;
            }
            EditCommand::Gesture { item, gesture } => {
                let id = self.item(*item)?;
                return Ok(session.handle_gesture(id, *gesture)?);
            }
            EditCommand::TapAt { point } => {
                if session.mode() == EditorMode::Preview {
                    return Ok(false);
                }
                match session.canvas().item_at(*point) {
                    Some(id) => {
                        session.handle_gesture(id, Gesture::Tap)?;
                    }
                    None => session.canvas_mut().deselect_all(),
                }
            }
            EditCommand::ConfirmDelete => {
                session.canvas_mut().confirm_delete()?;
            }
            EditCommand::CancelDelete => session.canvas_mut().cancel_delete(),
            EditCommand::SelectColor { color } => session.select_color(*color),
            EditCommand::SelectSize { size } => session.select_size(*size),
            EditCommand::SetSide { side } => return Ok(session.set_side(*side)),
            EditCommand::ToggleSide => return Ok(session.toggle_side()),
            EditCommand::SetMode { mode } => session.set_mode(*mode),
            EditCommand::SelectTool { tool } => {
                if let Some(id) = session.select_tool(*tool) {
                    self.created.push(id);
                }
            }
        }
        Ok(true)
    }

    fn item(&self, index: usize) -> StudioResult<ItemId> {
        self.created.get(index).copied().ok_or_else(|| {
            StudioError::Script(format!(
                "item {index} does not exist ({} created)",
                self.created.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::{GesturePhase, NoHaptics, Size};

    fn session() -> EditorSession {
        EditorSession::new(Size::new(200.0, 200.0), Box::new(NoHaptics))
    }

    #[test]
    fn test_parse_script() {
        let script = EditScript::from_json(
            r#"{
                "product_name": "Hoodie",
                "commands": [
                    {"op": "select_color", "color": "navy"},
                    {"op": "add_text", "text": "Hello"},
                    {"op": "gesture", "item": 0,
                     "gesture": {"gesture": "pan", "phase": "began", "translation": {"x": 0.0, "y": 0.0}}},
                    {"op": "toggle_side"}
                ]
            }"#,
        )
        .expect("parse");
        assert_eq!(script.product_name.as_deref(), Some("Hoodie"));
        assert_eq!(script.commands.len(), 4);
        assert_eq!(
            script.commands[0],
            EditCommand::SelectColor {
                color: ProductColor::Navy
            }
        );
    }

    #[test]
    fn test_run_applies_commands() {
        let script = EditScript {
            product_name: Some("Hoodie".to_string()),
            commands: vec![
                EditCommand::AddText {
                    text: Some("Hello".to_string()),
                },
                EditCommand::SelectSize {
                    size: ProductSize::XL,
                },
                EditCommand::Gesture {
                    item: 0,
                    gesture: Gesture::Pan {
                        phase: GesturePhase::Began,
                        translation: Point::ZERO,
                    },
                },
            ],
        };
        let mut session = session();
        let mut runner = ScriptRunner::new(".");
        let report = runner.run(&mut session, &script).expect("run");

        assert_eq!(report.applied, 3);
        assert_eq!(session.product_name(), "Hoodie");
        assert_eq!(session.size(), ProductSize::XL);
        assert_eq!(session.canvas().len(), 1);
        assert_eq!(session.canvas().selected(), Some(runner.created()[0]));
    }

    #[test]
    fn test_preview_mode_ignores_gestures_and_side_toggle() {
        let mut session = session();
        let mut runner = ScriptRunner::new(".");
        runner
            .apply(&mut session, &EditCommand::AddText { text: None })
            .expect("add");
        runner
            .apply(
                &mut session,
                &EditCommand::SetMode {
                    mode: EditorMode::Preview,
                },
            )
            .expect("mode");

        let press = EditCommand::Gesture {
            item: 0,
            gesture: Gesture::LongPress,
        };
        assert!(!runner.apply(&mut session, &press).expect("gesture"));
        assert!(!runner.apply(&mut session, &EditCommand::ToggleSide).expect("toggle"));
        assert!(session.canvas().pending_deletion().is_none());
    }

    #[test]
    fn test_unknown_item_is_script_error() {
        let mut runner = ScriptRunner::new(".");
        let result = runner.apply(
            &mut session(),
            &EditCommand::DeleteText { item: 2 },
        );
        assert!(matches!(result, Err(StudioError::Script(_))));
    }

    #[test]
    fn test_tap_on_empty_space_deselects() {
        let mut session = session();
        let mut runner = ScriptRunner::new(".");
        runner
            .apply(&mut session, &EditCommand::AddText { text: None })
            .expect("add");
        assert!(session.canvas().selected().is_some());

        runner
            .apply(
                &mut session,
                &EditCommand::TapAt {
                    point: Point::new(1.0, 1.0),
                },
            )
            .expect("tap");
        assert!(session.canvas().selected().is_none());
    }

    #[test]
    fn test_add_image_resolves_against_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = pod_renderer::encode_png(&pod_renderer::create_solid_color(
            40,
            20,
            [0, 255, 0, 255],
        ))
        .expect("png");
        std::fs::write(dir.path().join("logo.png"), png).expect("write");

        let mut session = session();
        let mut runner = ScriptRunner::new(dir.path());
        runner
            .apply(
                &mut session,
                &EditCommand::AddImage {
                    path: PathBuf::from("logo.png"),
                },
            )
            .expect("add image");
        assert_eq!(session.canvas().len(), 1);
    }

    #[test]
    fn test_add_image_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("logo.gif"), b"GIF89a").expect("write");

        let mut session = session();
        let mut runner = ScriptRunner::new(dir.path());
        let result = runner.apply(
            &mut session,
            &EditCommand::AddImage {
                path: PathBuf::from("logo.gif"),
            },
        );
        assert!(matches!(result, Err(StudioError::Script(_))));
        assert!(session.canvas().is_empty());
    }
}
