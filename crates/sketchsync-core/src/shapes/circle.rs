//! Circle shape.

use super::{ObjectId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A circle, stored by its bounding box origin and radii.
///
/// Drawn circles start with equal radii; non-uniform scaling stretches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub(crate) object_id: ObjectId,
    pub left: f64,
    pub top: f64,
    /// Horizontal radius.
    pub rx: f64,
    /// Vertical radius.
    pub ry: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a circle whose bounding box starts at `position`.
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            object_id: ObjectId::new(),
            left: position.x,
            top: position.y,
            rx: radius,
            ry: radius,
            angle: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Create the circle a drag from `anchor` to `current` describes.
    pub fn from_corners(anchor: Point, current: Point) -> Self {
        let mut circle = Self::new(anchor, 0.0);
        circle.span(anchor, current);
        circle
    }

    /// Resize to the drag from `anchor` to `current`; the diameter follows the longer axis.
    pub fn span(&mut self, anchor: Point, current: Point) {
        let diameter = (current.x - anchor.x).abs().max((current.y - anchor.y).abs());
        self.left = if current.x < anchor.x { anchor.x - diameter } else { anchor.x };
        self.top = if current.y < anchor.y { anchor.y - diameter } else { anchor.y };
        self.rx = diameter / 2.0;
        self.ry = diameter / 2.0;
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.rx, self.top + self.ry)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> &ObjectId {
        &self.object_id
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + 2.0 * self.rx, self.top + 2.0 * self.ry)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rx = self.rx + tolerance;
        let ry = self.ry + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = self.center();
        let dx = (point.x - c.x) / rx;
        let dy = (point.y - c.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        let origin = affine * Point::new(self.left, self.top);
        let scale = affine.as_coeffs();
        self.left = origin.x;
        self.top = origin.y;
        self.rx *= scale[0].abs();
        self.ry *= scale[3].abs();
    }
}
