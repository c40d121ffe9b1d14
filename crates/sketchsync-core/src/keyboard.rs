//! Keyboard shortcut registry and key-to-action resolution.

use crate::input::KeyChord;

/// What a key press asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    DeleteSelection,
    /// Cancel the current gesture or end text editing.
    Cancel,
    TextInput(char),
    TextBackspace,
    None,
}

/// A keyboard shortcut definition. `command` means Ctrl, or Cmd on macOS.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub command: bool,
    pub shift: bool,
    pub action: KeyAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: KeyAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, chord: &KeyChord) -> bool {
        chord.is(self.key)
            && chord.modifiers.command() == self.command
            && chord.modifiers.shift == self.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, KeyAction::Undo, "Undo"),
            Shortcut::new("Z", true, true, KeyAction::Redo, "Redo"),
            Shortcut::new("Y", true, false, KeyAction::Redo, "Redo"),
            Shortcut::new("C", true, false, KeyAction::Copy, "Copy shape"),
            Shortcut::new("X", true, false, KeyAction::Cut, "Cut shape"),
            Shortcut::new("V", true, false, KeyAction::Paste, "Paste shape"),
            Shortcut::new("Delete", false, false, KeyAction::DeleteSelection, "Delete selected shape"),
            Shortcut::new("Backspace", false, false, KeyAction::DeleteSelection, "Delete selected shape"),
            Shortcut::new("Escape", false, false, KeyAction::Cancel, "Cancel current action"),
        ]
    }

    /// Resolve a key press. While a text edit is active only text keys and
    /// Escape are interpreted; shortcuts pass through untouched.
    pub fn resolve(chord: &KeyChord, text_editing: bool) -> KeyAction {
        if text_editing {
            return Self::resolve_text(chord);
        }
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(chord))
            .map_or(KeyAction::None, |shortcut| shortcut.action)
    }

    fn resolve_text(chord: &KeyChord) -> KeyAction {
        if chord.is("Escape") {
            return KeyAction::Cancel;
        }
        if chord.modifiers.command() || chord.modifiers.alt {
            return KeyAction::None;
        }
        if chord.is("Backspace") {
            return KeyAction::TextBackspace;
        }
        if chord.is("Enter") {
            return KeyAction::TextInput('\n');
        }
        chord.printable().map_or(KeyAction::None, KeyAction::TextInput)
    }
}
