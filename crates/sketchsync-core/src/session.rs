//! Per-participant interaction session state. Never replicated.

use crate::panel::ElementAttributes;
use crate::shapes::{ObjectId, Shape};
use crate::tools::ToolManager;

/// Everything the local participant is doing right now.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Active tool and gesture state, including the draft shape.
    pub tools: ToolManager,
    /// The shape selected for editing. A reference, not ownership.
    pub selection: Option<ObjectId>,
    /// True while a text-editing session is active.
    pub is_editing: bool,
    /// Side-panel values.
    pub attributes: ElementAttributes,
    /// Last copied shape.
    pub clipboard: Option<Shape>,
}

impl Session {
    pub fn new(text_placeholder: &str) -> Self {
        Self {
            tools: ToolManager::new(text_placeholder),
            ..Self::default()
        }
    }

    pub fn select(&mut self, id: ObjectId) {
        self.selection = Some(id);
    }

    /// Clear the selection; returns what was selected.
    pub fn clear_selection(&mut self) -> Option<ObjectId> {
        self.selection.take()
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selection.as_ref() == Some(id)
    }

    /// The shape the reconciler must not overwrite: the text being edited,
    /// otherwise the selection.
    pub fn protected(&self) -> Option<&ObjectId> {
        self.tools.editing_text().or(self.selection.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_lifecycle() {
        let mut session = Session::new("Tap to Type");
        assert!(session.protected().is_none());

        session.select(ObjectId::from("r1"));
        assert!(session.is_selected(&ObjectId::from("r1")));
        assert_eq!(session.protected(), Some(&ObjectId::from("r1")));

        assert_eq!(session.clear_selection(), Some(ObjectId::from("r1")));
        assert!(session.selection.is_none());
    }

    #[test]
    fn test_text_edit_is_protected() {
        let mut session = Session::default();
        session.tools.begin_text_edit(ObjectId::from("t1"));
        assert_eq!(session.protected(), Some(&ObjectId::from("t1")));
    }
}
