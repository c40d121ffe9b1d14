//! Interaction state machine: tools, draw gestures and their drafts.

use crate::panel::ElementAttributes;
use crate::shapes::{Circle, FreeformPath, Line, ObjectId, Rectangle, Shape, Text};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Circle,
    Line,
    Freeform,
    Text,
    Image,
}

impl ToolKind {
    /// Toolbar value for this tool.
    pub fn value(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Freeform => "freeform",
            ToolKind::Text => "text",
            ToolKind::Image => "image",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "select" => Some(ToolKind::Select),
            "rectangle" => Some(ToolKind::Rectangle),
            "circle" => Some(ToolKind::Circle),
            "line" => Some(ToolKind::Line),
            "freeform" => Some(ToolKind::Freeform),
            "text" => Some(ToolKind::Text),
            "image" => Some(ToolKind::Image),
            _ => None,
        }
    }

    /// One-shot tools revert to select after creating one shape.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, ToolKind::Text | ToolKind::Image)
    }

    /// Whether a pointer gesture with this tool draws a shape.
    pub fn draws(&self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Image)
    }
}

/// A toolbar descriptor handed to `handle_active_element`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveElement {
    Tool(ToolKind),
    /// Delete every shape.
    Reset,
    /// Delete the selected shape.
    Delete,
}

impl ActiveElement {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "reset" => Some(ActiveElement::Reset),
            "delete" => Some(ActiveElement::Delete),
            other => ToolKind::from_value(other).map(ActiveElement::Tool),
        }
    }
}

/// State of the interaction machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A draw gesture is in progress; the draft is owned here until pointer-up.
    Drawing { anchor: Point, draft: Shape },
    EditingText { id: ObjectId },
    /// Middle-button drag; `last` is in screen coordinates.
    Panning { last: Point },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: InteractionState,
    /// Content of a freshly placed text.
    pub text_placeholder: String,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new("Tap to Type")
    }
}

impl ToolManager {
    pub fn new(text_placeholder: impl Into<String>) -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: InteractionState::Idle,
            text_placeholder: text_placeholder.into(),
        }
    }

    /// Switch tools. Returns true if an in-progress draft was discarded.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        self.current_tool = tool;
        self.cancel()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, InteractionState::Drawing { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, InteractionState::Panning { .. })
    }

    /// The text being edited, if any.
    pub fn editing_text(&self) -> Option<&ObjectId> {
        match &self.state {
            InteractionState::EditingText { id } => Some(id),
            _ => None,
        }
    }

    /// The in-progress draft, for preview rendering.
    pub fn draft(&self) -> Option<&Shape> {
        match &self.state {
            InteractionState::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Pointer-down with a drawing tool: start a draft anchored at `point`.
    /// Returns false if nothing started.
    pub fn begin(&mut self, point: Point, attributes: &ElementAttributes) -> bool {
        if !matches!(self.state, InteractionState::Idle) {
            return false;
        }
        let Some(draft) = self.create_draft(point, attributes) else {
            return false;
        };
        log::debug!("begin {} draft at {point:?}", self.current_tool.value());
        self.state = InteractionState::Drawing { anchor: point, draft };
        true
    }

    /// Pointer-move: track the pointer with the draft.
    pub fn update(&mut self, point: Point) -> bool {
        let InteractionState::Drawing { anchor, draft } = &mut self.state else {
            return false;
        };
        match draft {
            Shape::Rectangle(rect) => rect.span(*anchor, point),
            Shape::Circle(circle) => circle.span(*anchor, point),
            Shape::Line(line) => line.set_end(point),
            Shape::FreeformPath(path) => path.add_point(point),
            _ => return false,
        }
        true
    }

    /// Pointer-up: finalize and hand over the draft. A pointer-up without a
    /// preceding pointer-down yields nothing.
    pub fn end(&mut self, point: Point) -> Option<Shape> {
        if !self.update(point) && !self.is_drawing() {
            return None;
        }
        let InteractionState::Drawing { draft, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        if self.current_tool.is_one_shot() {
            self.current_tool = ToolKind::Select;
        }
        log::debug!("finalized {} {}", draft.kind(), draft.id());
        Some(draft)
    }

    /// Abandon the current gesture or edit. Returns true if a draft was discarded.
    pub fn cancel(&mut self) -> bool {
        let discarded = self.is_drawing();
        if discarded {
            log::debug!("draft discarded");
        }
        self.state = InteractionState::Idle;
        discarded
    }

    pub fn begin_text_edit(&mut self, id: ObjectId) {
        self.state = InteractionState::EditingText { id };
    }

    /// Leave text editing. Returns the id that was being edited.
    pub fn end_text_edit(&mut self) -> Option<ObjectId> {
        match std::mem::take(&mut self.state) {
            InteractionState::EditingText { id } => Some(id),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn begin_pan(&mut self, screen: Point) {
        if matches!(self.state, InteractionState::Idle) {
            self.state = InteractionState::Panning { last: screen };
        }
    }

    /// Continue panning; returns the screen-space delta since the last call.
    pub fn pan_to(&mut self, screen: Point) -> Option<Vec2> {
        let InteractionState::Panning { last } = &mut self.state else {
            return None;
        };
        let delta = screen - *last;
        *last = screen;
        Some(delta)
    }

    pub fn end_pan(&mut self) {
        if self.is_panning() {
            self.state = InteractionState::Idle;
        }
    }

    fn create_draft(&self, point: Point, attributes: &ElementAttributes) -> Option<Shape> {
        let mut shape = match self.current_tool {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::new(point, 0.0, 0.0)),
            ToolKind::Circle => Shape::Circle(Circle::new(point, 0.0)),
            ToolKind::Line => Shape::Line(Line::new(point, point)),
            ToolKind::Freeform => Shape::FreeformPath(FreeformPath::new(point)),
            ToolKind::Text => Shape::Text(Text::new(point, self.text_placeholder.clone())),
            ToolKind::Select | ToolKind::Image => return None,
        };
        *shape.style_mut() = attributes.draft_style(shape.kind());
        attributes.apply_font(&mut shape);
        Some(shape)
    }
}
