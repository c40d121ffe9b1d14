//! Input vocabulary: every host event is translated into one [`Input`]
//! before the engine acts on it.

use crate::shapes::{ObjectId, Shape};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The platform command modifier: Ctrl, or Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press with its modifiers. Keys use DOM-style names
/// (`"z"`, `"Delete"`, `"Backspace"`, `"Escape"`, `"Enter"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Case-insensitive key name comparison.
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    /// The character this key types, if it is a printable single character.
    pub fn printable(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// One event from the host, after translation.
///
/// Pointer positions are in screen coordinates; the engine maps them to
/// world coordinates through the surface. Path points are already in world
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    PointerDown { position: Point, button: MouseButton },
    PointerMove { position: Point },
    PointerUp { position: Point, button: MouseButton },
    /// The renderer selected a shape.
    SelectionCreated { id: ObjectId },
    SelectionCleared,
    /// The renderer is scaling a shape. The factors are per-event deltas
    /// relative to the shape's current size, not cumulative over the gesture;
    /// each event is synced and becomes its own undo step.
    ObjectScaling { id: ObjectId, scale_x: f64, scale_y: f64 },
    /// The renderer finished moving or transforming a shape.
    ObjectModified { shape: Shape },
    /// The renderer's free-drawing mode produced a path.
    PathCreated { points: Vec<Point> },
    Key(KeyChord),
    /// Composed text (IME or paste into a text box).
    TextInput(String),
    /// The host window was resized.
    Resize { width: f64, height: f64 },
}
