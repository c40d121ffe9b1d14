//! Group shape for combining multiple shapes.

use super::{ObjectId, Shape, ShapeStyle, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A group of shapes manipulated as one unit. Groups may nest.
///
/// The whole group is one record; children are serialized inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub(crate) object_id: ObjectId,
    pub children: Vec<Shape>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Group {
    pub fn new(children: Vec<Shape>) -> Self {
        Self {
            object_id: ObjectId::new(),
            children,
            style: ShapeStyle::default(),
        }
    }

    /// Dissolve this group and return its children.
    pub fn ungroup(self) -> Vec<Shape> {
        self.children
    }
}

impl ShapeTrait for Group {
    fn id(&self) -> &ObjectId {
        &self.object_id
    }

    fn bounds(&self) -> Rect {
        let mut children = self.children.iter();
        let Some(first) = children.next() else {
            return Rect::ZERO;
        };
        children.fold(first.bounds(), |acc, child| acc.union(child.bounds()))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.children.iter().any(|child| child.hit_test(point, tolerance))
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        for child in &mut self.children {
            child.transform(affine);
        }
    }
}
