//! Recognized gestures routed to canvas items.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Lifecycle phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Gesture recognized; capture baselines.
    Began,
    /// Gesture value changed.
    Changed,
    /// Gesture finished normally.
    Ended,
    /// Gesture interrupted by the system.
    Cancelled,
}

impl GesturePhase {
    /// Whether this phase finishes the gesture.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// A gesture targeting a single item.
///
/// Continuous gestures carry the cumulative value since `Began`: total
/// translation, total rotation, or total magnification factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
#[allow(missing_docs)] // Variant fields documented at variant level
pub enum Gesture {
    /// Drag by `translation` pixels.
    Pan { phase: GesturePhase, translation: Point },
    /// Rotate by `rotation` radians.
    Rotate { phase: GesturePhase, rotation: f64 },
    /// Magnify by factor `scale`.
    Pinch { phase: GesturePhase, scale: f64 },
    /// Single tap.
    Tap,
    /// Press and hold.
    LongPress,
}

impl Gesture {
    /// The phase of a continuous gesture, `None` for discrete ones.
    #[must_use]
    pub fn phase(&self) -> Option<GesturePhase> {
        match self {
            Self::Pan { phase, .. } | Self::Rotate { phase, .. } | Self::Pinch { phase, .. } => {
                Some(*phase)
            }
            Self::Tap | Self::LongPress => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_json_shape() {
        let gesture = Gesture::Pan {
            phase: GesturePhase::Changed,
            translation: Point::new(3.0, -4.0),
        };
        let json = serde_json::to_value(gesture).expect("serialize");
        assert_eq!(json["gesture"], "pan");
        assert_eq!(json["phase"], "changed");
        assert_eq!(json["translation"]["x"], 3.0);
    }

    #[test]
    fn test_discrete_gesture_from_json() {
        let gesture: Gesture =
            serde_json::from_str(r#"{"gesture":"long_press"}"#).expect("deserialize");
        assert_eq!(gesture, Gesture::LongPress);
        assert_eq!(gesture.phase(), None);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(GesturePhase::Ended.is_terminal());
        assert!(GesturePhase::Cancelled.is_terminal());
        assert!(!GesturePhase::Changed.is_terminal());
    }
}
