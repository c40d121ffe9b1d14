//! The engine: routes host input through the session, the synchronizer, the
//! reconciler and the history controller.
//!
//! Every public entry point runs to completion. Failures are logged and never
//! surfaced to the UI; a write that the store rejects is not retried here.

use crate::canvas::RenderSurface;
use crate::config::EngineConfig;
use crate::history;
use crate::input::{Input, KeyChord, MouseButton};
use crate::keyboard::{KeyAction, ShortcutRegistry};
use crate::panel::{self, AttributeProperty, ElementAttributes};
use crate::reconcile::{self, ReconcileReport};
use crate::record::ShapeRecord;
use crate::session::Session;
use crate::shapes::{FreeformPath, Image, ObjectId, Shape, ShapeError, ShapeKind, Text};
use crate::store::ObjectStore;
use crate::sync;
use crate::tools::{ActiveElement, ToolKind};
use kurbo::{Point, Vec2};

/// Something the engine needs the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Show a file picker and hand the result to [`Engine::place_image`].
    OpenImagePicker,
}

/// An uploaded image, decoded enough by the host to know its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// One participant's drawing engine.
pub struct Engine<S, R> {
    store: S,
    surface: R,
    session: Session,
    config: EngineConfig,
    /// Store revision the surface last caught up with.
    reconciled_revision: Option<u64>,
}

impl<S: ObjectStore, R: RenderSurface> Engine<S, R> {
    /// Create an engine and bring the surface in line with the store.
    pub fn new(store: S, surface: R, config: EngineConfig) -> Self {
        let session = Session::new(&config.text_placeholder);
        let mut engine = Self {
            store,
            surface,
            session,
            config,
            reconciled_revision: None,
        };
        engine.refresh();
        engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable store access, for importing remote updates. Call
    /// [`Engine::refresh`] afterwards.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<&ObjectId> {
        self.session.selection.as_ref()
    }

    pub fn attributes(&self) -> &ElementAttributes {
        &self.session.attributes
    }

    pub fn active_tool(&self) -> ToolKind {
        self.session.tools.current_tool
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing
    }

    /// The in-progress draft, for preview rendering.
    pub fn draft(&self) -> Option<&Shape> {
        self.session.tools.draft()
    }

    /// `(objectId, type)` of every stored shape, for the layers list.
    pub fn layers(&self) -> Vec<(ObjectId, ShapeKind)> {
        self.store
            .snapshot()
            .iter()
            .filter_map(|(id, text)| ShapeRecord::from_json(id, text).ok())
            .map(|record| (record.object_id, record.kind))
            .collect()
    }

    /// Process one host event.
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::PointerDown { position, button } => self.pointer_down(position, button),
            Input::PointerMove { position } => self.pointer_move(position),
            Input::PointerUp { position, button } => self.pointer_up(position, button),
            Input::SelectionCreated { id } => self.select(id),
            Input::SelectionCleared => self.clear_selection(),
            Input::ObjectScaling { id, scale_x, scale_y } => self.object_scaling(&id, scale_x, scale_y),
            Input::ObjectModified { shape } => self.object_modified(shape),
            Input::PathCreated { points } => self.path_created(points),
            Input::Key(chord) => self.key(&chord),
            Input::TextInput(text) => self.edit_text(|t| t.push_str(&text)),
            Input::Resize { width, height } => self.surface.resize_to_fit(width, height),
        }
        self.refresh();
    }

    /// Panel entry point: set one attribute of the selected shape and re-sync it.
    /// With nothing selected the value becomes the default for new shapes.
    pub fn handle_input_change(&mut self, property: &str, value: &str) {
        let property: AttributeProperty = match property.parse() {
            Ok(property) => property,
            Err(err) => {
                log::warn!("{err}");
                return;
            }
        };
        self.session.attributes.set(property, value);

        let Some(id) = self.session.selection.clone() else {
            return;
        };
        let Some(shape) = self.surface.get_mut(&id) else {
            return;
        };
        if let Err(err) = panel::apply_property(shape, property, value) {
            log::warn!("cannot set {property} on {id}: {err}");
            self.refresh_attributes();
            return;
        }
        self.sync_id(&id);
        self.refresh();
    }

    /// Toolbar entry point: switch tool, reset the canvas, delete the
    /// selection, or ask for an image.
    pub fn handle_active_element(&mut self, element: ActiveElement) -> Option<HostRequest> {
        let request = match element {
            ActiveElement::Tool(tool) => {
                if self.session.is_editing {
                    self.clear_selection();
                }
                self.session.tools.set_tool(tool);
                (tool == ToolKind::Image).then_some(HostRequest::OpenImagePicker)
            }
            ActiveElement::Reset => {
                self.reset();
                self.session.tools.set_tool(ToolKind::Select);
                None
            }
            ActiveElement::Delete => {
                self.delete_selection();
                self.session.tools.set_tool(ToolKind::Select);
                None
            }
        };
        self.refresh();
        request
    }

    /// Place an uploaded image at the configured origin and sync it.
    pub fn place_image(&mut self, upload: ImageUpload) -> Result<ObjectId, ShapeError> {
        let max = self.config.image_max_size;
        let image = Image::from_bytes(self.config.image_origin, &upload.bytes, upload.width, upload.height)?
            .fit_within(max, max);
        let shape = Shape::Image(image);
        let id = shape.id().clone();
        self.surface.insert(shape);
        self.sync_id(&id);
        if self.session.tools.current_tool == ToolKind::Image {
            self.session.tools.set_tool(ToolKind::Select);
        }
        self.refresh();
        Ok(id)
    }

    /// Reconcile the surface with the store if the store changed since the
    /// last pass. The selected shape is protected.
    pub fn refresh(&mut self) -> Option<ReconcileReport> {
        let revision = self.store.revision();
        if self.reconciled_revision == Some(revision) {
            return None;
        }
        let protected = self.session.protected().cloned();
        Some(self.reconcile_with(protected.as_ref()))
    }

    /// Undo the last local mutation and reconcile without protection.
    pub fn undo(&mut self) -> bool {
        let applied = history::undo(&mut self.store).unwrap_or_else(|err| {
            log::warn!("undo failed: {err}");
            false
        });
        if applied {
            self.reconcile_with(None);
        }
        applied
    }

    /// Redo the last undone local mutation and reconcile without protection.
    pub fn redo(&mut self) -> bool {
        let applied = history::redo(&mut self.store).unwrap_or_else(|err| {
            log::warn!("redo failed: {err}");
            false
        });
        if applied {
            self.reconcile_with(None);
        }
        applied
    }

    fn reconcile_with(&mut self, protected: Option<&ObjectId>) -> ReconcileReport {
        let revision = self.store.revision();
        let snapshot = self.store.snapshot();
        let report = reconcile::reconcile(&mut self.surface, &snapshot, protected);
        self.reconciled_revision = Some(revision);

        if let Some(id) = self.session.selection.clone() {
            if !self.surface.contains(&id) {
                log::debug!("selected shape {id} disappeared");
                self.end_editing();
                self.session.clear_selection();
            } else if report.updated.contains(&id) {
                self.refresh_attributes();
            }
        }
        report
    }

    fn pointer_down(&mut self, position: Point, button: MouseButton) {
        match button {
            MouseButton::Middle => self.session.tools.begin_pan(position),
            MouseButton::Right => {}
            MouseButton::Left => {
                let world = self.surface.to_world(position);
                if self.session.is_editing {
                    self.clear_selection();
                }
                let tool = self.session.tools.current_tool;
                if tool == ToolKind::Select {
                    match self.surface.hit_test(world, self.config.hit_tolerance) {
                        Some(id) => self.select(id),
                        None => self.clear_selection(),
                    }
                } else if tool.draws() {
                    self.clear_selection();
                    self.session.tools.begin(world, &self.session.attributes);
                }
            }
        }
    }

    fn pointer_move(&mut self, position: Point) {
        if let Some(delta) = self.session.tools.pan_to(position) {
            self.surface.pan_by(delta);
            return;
        }
        let world = self.surface.to_world(position);
        self.session.tools.update(world);
    }

    fn pointer_up(&mut self, position: Point, button: MouseButton) {
        match button {
            MouseButton::Middle => self.session.tools.end_pan(),
            MouseButton::Right => {}
            MouseButton::Left => {
                let world = self.surface.to_world(position);
                if let Some(shape) = self.session.tools.end(world) {
                    self.commit_new_shape(shape);
                }
            }
        }
    }

    /// Put a finished shape on the surface and sync it, subject to the
    /// degenerate-shape policy.
    fn commit_new_shape(&mut self, shape: Shape) -> Option<ObjectId> {
        if shape.is_degenerate() && self.config.discard_degenerate_shapes {
            log::debug!("discarding degenerate {} {}", shape.kind(), shape.id());
            return None;
        }
        let id = shape.id().clone();
        let is_text = shape.kind() == ShapeKind::Text;
        self.surface.insert(shape);
        self.sync_id(&id);
        if is_text {
            self.begin_text_edit(id.clone());
        }
        Some(id)
    }

    fn sync_id(&mut self, id: &ObjectId) {
        if let Err(err) = sync::sync_shape(&mut self.store, self.surface.get(id)) {
            log::warn!("failed to sync {id}: {err}");
        }
    }

    fn select(&mut self, id: ObjectId) {
        if !self.surface.contains(&id) {
            log::debug!("ignoring selection of unknown shape {id}");
            return;
        }
        if self.session.is_selected(&id) {
            return;
        }
        if self.session.is_editing {
            self.clear_selection();
        }
        self.session.select(id);
        self.refresh_attributes();
    }

    /// Clear the selection, ending any text edit, and schedule a catch-up
    /// reconciliation for updates withheld while it was protected.
    fn clear_selection(&mut self) {
        self.end_editing();
        if self.session.clear_selection().is_some() {
            self.reconciled_revision = None;
        }
    }

    fn end_editing(&mut self) {
        if self.session.is_editing {
            self.session.is_editing = false;
            self.session.tools.end_text_edit();
        }
    }

    fn begin_text_edit(&mut self, id: ObjectId) {
        self.session.select(id.clone());
        self.session.tools.begin_text_edit(id);
        self.session.is_editing = true;
        self.refresh_attributes();
    }

    fn refresh_attributes(&mut self) {
        let Some(id) = &self.session.selection else {
            return;
        };
        if let Some(shape) = self.surface.get(id) {
            self.session.attributes.refresh_from(shape);
        }
    }

    fn object_scaling(&mut self, id: &ObjectId, scale_x: f64, scale_y: f64) {
        let Some(shape) = self.surface.get_mut(id) else {
            log::debug!("scaling unknown shape {id}");
            return;
        };
        shape.scale(scale_x, scale_y);
        self.sync_id(id);
        if self.session.is_selected(id) {
            self.refresh_attributes();
        }
    }

    fn object_modified(&mut self, shape: Shape) {
        let id = shape.id().clone();
        if !self.surface.contains(&id) {
            log::debug!("modification of unknown shape {id}");
            return;
        }
        self.surface.insert(shape);
        self.sync_id(&id);
        if self.session.is_selected(&id) {
            self.refresh_attributes();
        }
    }

    fn path_created(&mut self, points: Vec<Point>) {
        if points.is_empty() {
            return;
        }
        let mut shape = Shape::FreeformPath(FreeformPath::from_points(points));
        *shape.style_mut() = self.session.attributes.draft_style(ShapeKind::FreeformPath);
        self.commit_new_shape(shape);
    }

    fn key(&mut self, chord: &KeyChord) {
        match ShortcutRegistry::resolve(chord, self.session.is_editing) {
            KeyAction::Undo => {
                self.undo();
            }
            KeyAction::Redo => {
                self.redo();
            }
            KeyAction::Copy => self.copy(),
            KeyAction::Cut => {
                self.copy();
                self.delete_selection();
            }
            KeyAction::Paste => self.paste(),
            KeyAction::DeleteSelection => self.delete_selection(),
            KeyAction::Cancel => self.cancel(),
            KeyAction::TextInput(c) => self.edit_text(|t| t.push_char(c)),
            KeyAction::TextBackspace => self.edit_text(|t| {
                t.backspace();
            }),
            KeyAction::None => {}
        }
    }

    /// Escape: drop the draft, otherwise end the edit and deselect.
    fn cancel(&mut self) {
        if !self.session.tools.cancel() {
            self.clear_selection();
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut Text)) {
        if !self.session.is_editing {
            return;
        }
        let Some(id) = self.session.tools.editing_text().cloned() else {
            return;
        };
        let Some(text) = self.surface.get_mut(&id).and_then(Shape::as_text_mut) else {
            return;
        };
        edit(text);
        self.sync_id(&id);
    }

    fn copy(&mut self) {
        if let Some(id) = &self.session.selection {
            self.session.clipboard = self.surface.get(id).cloned();
        }
    }

    fn paste(&mut self) {
        let Some(mut shape) = self.session.clipboard.clone() else {
            return;
        };
        shape.regenerate_id();
        let offset = self.config.paste_offset;
        shape.translate(Vec2::new(offset, offset));
        // Successive pastes cascade
        self.session.clipboard = Some(shape.clone());
        let id = shape.id().clone();
        self.surface.insert(shape);
        self.sync_id(&id);
        self.clear_selection();
        self.select(id);
    }

    /// Delete the selected shape from the store, then from the surface. A
    /// delete the store rejects keeps the shape and the selection.
    fn delete_selection(&mut self) {
        self.end_editing();
        self.session.tools.cancel();
        let Some(id) = self.session.selection.clone() else {
            return;
        };
        match sync::delete_one(&mut self.store, &id) {
            Ok(_) => {
                self.session.clear_selection();
                self.surface.remove(&id);
            }
            Err(err) => log::warn!("failed to delete {id}: {err}; keeping local shape"),
        }
    }

    /// Empty the store, then clear the surface only once the store confirmed
    /// it is empty.
    fn reset(&mut self) {
        self.end_editing();
        self.session.tools.cancel();
        match sync::delete_all(&mut self.store) {
            Ok(true) => {
                self.surface.clear();
                self.session.clear_selection();
                log::info!("canvas reset");
            }
            Ok(false) => log::warn!("store not empty after reset; keeping local shapes"),
            Err(err) => log::warn!("reset failed: {err}; keeping local shapes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::shapes::Rectangle;
    use crate::store::MemoryStore;

    type TestEngine = Engine<MemoryStore, Canvas>;

    fn engine() -> TestEngine {
        Engine::new(MemoryStore::new(), Canvas::new(), EngineConfig::default())
    }

    fn drag(engine: &mut TestEngine, from: (f64, f64), to: (f64, f64)) {
        engine.handle(Input::PointerDown {
            position: from.into(),
            button: MouseButton::Left,
        });
        engine.handle(Input::PointerMove { position: to.into() });
        engine.handle(Input::PointerUp {
            position: to.into(),
            button: MouseButton::Left,
        });
    }

    fn add_rect(engine: &mut TestEngine, id: &str) -> ObjectId {
        let shape = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 90.0, 50.0)).with_id(id);
        let record = ShapeRecord::from_shape(&shape).unwrap();
        engine.store_mut().set(&record.object_id, &record.to_json()).unwrap();
        engine.refresh();
        record.object_id
    }

    #[test]
    fn test_draft_not_written_until_pointer_up() {
        let mut engine = engine();
        engine.handle_active_element(ActiveElement::Tool(ToolKind::Rectangle));
        engine.handle(Input::PointerDown {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        });
        engine.handle(Input::PointerMove {
            position: Point::new(20.0, 20.0),
        });
        assert!(engine.draft().is_some());
        assert!(engine.store().is_empty());
        assert!(engine.surface().is_empty());

        engine.handle(Input::PointerUp {
            position: Point::new(30.0, 30.0),
            button: MouseButton::Left,
        });
        assert_eq!(engine.store().len(), 1);
        assert_eq!(engine.surface().len(), 1);
        assert_eq!(engine.active_tool(), ToolKind::Rectangle);
    }

    #[test]
    fn test_escape_discards_draft() {
        let mut engine = engine();
        engine.handle_active_element(ActiveElement::Tool(ToolKind::Line));
        engine.handle(Input::PointerDown {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        });
        engine.handle(Input::Key(KeyChord::new("Escape")));
        engine.handle(Input::PointerUp {
            position: Point::new(30.0, 30.0),
            button: MouseButton::Left,
        });
        assert!(engine.store().is_empty());
        assert_eq!(engine.store().revision(), 0);
    }

    #[test]
    fn test_click_selects_and_refreshes_panel() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        engine.handle(Input::PointerDown {
            position: Point::new(10.0, 30.0),
            button: MouseButton::Left,
        });
        assert_eq!(engine.selection(), Some(&id));
        assert_eq!(engine.attributes().width, "90");

        engine.handle(Input::PointerDown {
            position: Point::new(500.0, 500.0),
            button: MouseButton::Left,
        });
        assert!(engine.selection().is_none());
    }

    #[test]
    fn test_text_tool_enters_editing_and_gates_undo() {
        let mut engine = engine();
        engine.handle_active_element(ActiveElement::Tool(ToolKind::Text));
        drag(&mut engine, (50.0, 50.0), (50.0, 50.0));
        assert!(engine.is_editing());
        assert_eq!(engine.active_tool(), ToolKind::Select);

        let id = engine.selection().cloned().unwrap();
        engine.handle(Input::Key(KeyChord::new("Backspace")));
        engine.handle(Input::Key(KeyChord::new("!")));
        engine.handle(Input::Key(KeyChord::new("z").ctrl()));

        let stored = ShapeRecord::from_json(&id, &engine.store().get(&id).unwrap()).unwrap();
        assert_eq!(stored.attribute("text"), Some(&serde_json::Value::from("Tap to Typ!")));

        engine.handle(Input::Key(KeyChord::new("Escape")));
        assert!(!engine.is_editing());
        assert!(engine.selection().is_none());
    }

    #[test]
    fn test_scaling_syncs_and_refreshes_panel() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        engine.handle(Input::SelectionCreated { id: id.clone() });
        engine.handle(Input::ObjectScaling {
            id: id.clone(),
            scale_x: 2.0,
            scale_y: 1.0,
        });
        assert_eq!(engine.attributes().width, "180");
        let stored = ShapeRecord::from_json(&id, &engine.store().get(&id).unwrap()).unwrap();
        assert_eq!(stored.attribute("width"), Some(&serde_json::Value::from(180.0)));
    }

    #[test]
    fn test_scaling_factors_compound_per_event() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        for _ in 0..2 {
            engine.handle(Input::ObjectScaling {
                id: id.clone(),
                scale_x: 2.0,
                scale_y: 1.0,
            });
        }
        let bounds = engine.surface().get(&id).unwrap().bounds();
        assert_eq!((bounds.x0, bounds.width()), (10.0, 360.0));

        assert!(engine.undo());
        let bounds = engine.surface().get(&id).unwrap().bounds();
        assert_eq!(bounds.width(), 180.0);
    }

    #[test]
    fn test_copy_paste_creates_offset_copy() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        engine.handle(Input::SelectionCreated { id: id.clone() });
        engine.handle(Input::Key(KeyChord::new("c").ctrl()));
        engine.handle(Input::Key(KeyChord::new("v").ctrl()));

        assert_eq!(engine.store().len(), 2);
        let copy_id = engine.selection().cloned().unwrap();
        assert_ne!(copy_id, id);
        let copy = engine.surface().get(&copy_id).unwrap();
        assert!((copy.bounds().x0 - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cut_removes_original() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        engine.handle(Input::SelectionCreated { id: id.clone() });
        engine.handle(Input::Key(KeyChord::new("x").meta()));
        assert!(engine.store().is_empty());
        engine.handle(Input::Key(KeyChord::new("v").meta()));
        assert_eq!(engine.store().len(), 1);
        assert!(engine.store().get(&id).is_none());
    }

    #[test]
    fn test_image_tool_requests_picker_and_reverts() {
        let mut engine = engine();
        let request = engine.handle_active_element(ActiveElement::Tool(ToolKind::Image));
        assert_eq!(request, Some(HostRequest::OpenImagePicker));

        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let id = engine
            .place_image(ImageUpload {
                bytes: png,
                width: 800,
                height: 400,
            })
            .unwrap();
        assert_eq!(engine.active_tool(), ToolKind::Select);
        let bounds = engine.surface().get(&id).unwrap().bounds();
        assert_eq!((bounds.x0, bounds.y0, bounds.width(), bounds.height()), (100.0, 100.0, 200.0, 100.0));
        assert_eq!(engine.layers(), vec![(id, ShapeKind::Image)]);
    }

    #[test]
    fn test_place_image_rejects_unknown_payload() {
        let mut engine = engine();
        let result = engine.place_image(ImageUpload {
            bytes: b"not an image".to_vec(),
            width: 10,
            height: 10,
        });
        assert_eq!(result, Err(ShapeError::UnsupportedImage));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_unknown_panel_property_is_ignored() {
        let mut engine = engine();
        let id = add_rect(&mut engine, "r1");
        engine.handle(Input::SelectionCreated { id: id.clone() });
        let before = engine.store().get(&id);
        engine.handle_input_change("opacity", "0.5");
        engine.handle_input_change("width", "not a number");
        assert_eq!(engine.store().get(&id), before);
        assert_eq!(engine.attributes().width, "90");
    }

    #[test]
    fn test_panel_change_without_selection_sets_default() {
        let mut engine = engine();
        engine.handle_input_change("fill", "#00ff00");
        engine.handle_active_element(ActiveElement::Tool(ToolKind::Rectangle));
        drag(&mut engine, (0.0, 0.0), (10.0, 10.0));
        let (id, _) = engine.layers().remove(0);
        let shape = engine.surface().get(&id).unwrap();
        assert_eq!(shape.style().fill.map(|c| c.to_hex()).as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut engine = engine();
        engine.handle(Input::PointerDown {
            position: Point::new(100.0, 100.0),
            button: MouseButton::Middle,
        });
        engine.handle(Input::PointerMove {
            position: Point::new(130.0, 90.0),
        });
        engine.handle(Input::PointerUp {
            position: Point::new(130.0, 90.0),
            button: MouseButton::Middle,
        });
        assert_eq!(engine.surface().viewport().offset, Vec2::new(30.0, -10.0));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_path_created_is_synced() {
        let mut engine = engine();
        engine.handle(Input::PathCreated {
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(9.0, 2.0)],
        });
        assert_eq!(engine.store().len(), 1);
        assert_eq!(engine.layers()[0].1, ShapeKind::FreeformPath);
    }

    #[test]
    fn test_resize_forwards_to_surface() {
        let mut engine = engine();
        engine.handle(Input::Resize {
            width: 1280.0,
            height: 720.0,
        });
        assert_eq!(engine.surface().viewport().size, kurbo::Size::new(1280.0, 720.0));
    }
}
