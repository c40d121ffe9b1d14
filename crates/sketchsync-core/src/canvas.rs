//! The local rendering surface.
//!
//! The engine never draws; it mutates a [`RenderSurface`] that the host's
//! graphics layer renders. [`Canvas`] is the in-memory implementation.

use crate::shapes::{ObjectId, Shape};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::{HashMap, HashSet};

/// Operations the engine needs from the rendering collaborator.
pub trait RenderSurface {
    fn contains(&self, id: &ObjectId) -> bool;

    fn get(&self, id: &ObjectId) -> Option<&Shape>;

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Shape>;

    /// Insert a shape on top, or replace an existing one in place.
    fn insert(&mut self, shape: Shape);

    fn remove(&mut self, id: &ObjectId) -> Option<Shape>;

    /// Remove several shapes at once.
    fn remove_many(&mut self, ids: &HashSet<ObjectId>) {
        for id in ids {
            self.remove(id);
        }
    }

    /// All shape ids, back to front.
    fn ids(&self) -> Vec<ObjectId>;

    fn clear(&mut self);

    /// Topmost shape under a world-space point.
    fn hit_test(&self, point: Point, tolerance: f64) -> Option<ObjectId>;

    /// Resize the viewport to the host window.
    fn resize_to_fit(&mut self, width: f64, height: f64);

    /// Pan the viewport by a screen-space delta.
    fn pan_by(&mut self, delta: Vec2);

    /// Convert a screen-space point to world coordinates.
    fn to_world(&self, screen: Point) -> Point;
}

/// Visible region of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen-space translation applied to the world.
    pub offset: Vec2,
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Size::new(800.0, 600.0),
        }
    }
}

impl Viewport {
    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen - self.offset
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world + self.offset
    }

    /// Visible world-space rectangle.
    pub fn world_rect(&self) -> Rect {
        Rect::from_origin_size(self.screen_to_world(Point::ZERO), self.size)
    }
}

/// In-memory rendering surface: shapes keyed by id plus a z-order.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    shapes: HashMap<ObjectId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ObjectId>,
    viewport: Viewport,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .values()
            .map(Shape::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }
}

impl RenderSurface for Canvas {
    fn contains(&self, id: &ObjectId) -> bool {
        self.shapes.contains_key(id)
    }

    fn get(&self, id: &ObjectId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    fn insert(&mut self, shape: Shape) {
        let id = shape.id().clone();
        if self.shapes.insert(id.clone(), shape).is_none() {
            self.z_order.push(id);
        }
    }

    fn remove(&mut self, id: &ObjectId) -> Option<Shape> {
        self.z_order.retain(|shape_id| shape_id != id);
        self.shapes.remove(id)
    }

    fn remove_many(&mut self, ids: &HashSet<ObjectId>) {
        if ids.is_empty() {
            return;
        }
        self.z_order.retain(|shape_id| !ids.contains(shape_id));
        self.shapes.retain(|id, _| !ids.contains(id));
    }

    fn ids(&self) -> Vec<ObjectId> {
        self.z_order.clone()
    }

    fn clear(&mut self) {
        self.shapes.clear();
        self.z_order.clear();
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        // Front to back for selection priority
        self.z_order
            .iter()
            .rev()
            .find(|id| {
                self.shapes
                    .get(*id)
                    .is_some_and(|shape| shape.hit_test(point, tolerance))
            })
            .cloned()
    }

    fn resize_to_fit(&mut self, width: f64, height: f64) {
        self.viewport.size = Size::new(width.max(0.0), height.max(0.0));
    }

    fn pan_by(&mut self, delta: Vec2) {
        self.viewport.offset += delta;
    }

    fn to_world(&self, screen: Point) -> Point {
        self.viewport.screen_to_world(screen)
    }
}
