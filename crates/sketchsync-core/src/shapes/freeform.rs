//! Freeform path drawn with the pencil tool.

use super::{ObjectId, ShapeStyle, ShapeTrait, point_to_polyline_dist};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A freeform drawing (polyline through the sampled pointer positions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformPath {
    pub(crate) object_id: ObjectId,
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl FreeformPath {
    /// Start a path at a single point.
    pub fn new(start: Point) -> Self {
        Self::from_points(vec![start])
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            object_id: ObjectId::new(),
            points,
            style: ShapeStyle::default(),
        }
    }

    /// Append a sample, skipping exact repeats of the last one.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Number of distinct sample positions.
    pub fn distinct_points(&self) -> usize {
        let mut seen: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        seen.len()
    }
}

impl ShapeTrait for FreeformPath {
    fn id(&self) -> &ObjectId {
        &self.object_id
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.stroke_width / 2.0
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_point_skips_repeats() {
        let mut path = FreeformPath::new(Point::new(1.0, 1.0));
        path.add_point(Point::new(1.0, 1.0));
        path.add_point(Point::new(2.0, 3.0));
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.distinct_points(), 2);
    }

    #[test]
    fn test_bounds_cover_all_points() {
        let path = FreeformPath::from_points(vec![
            Point::new(5.0, 5.0),
            Point::new(-5.0, 10.0),
            Point::new(20.0, 0.0),
        ]);
        let bounds = path.bounds();
        assert_eq!(bounds, Rect::new(-5.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_hit_test_along_path() {
        let path = FreeformPath::from_points(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert!(path.hit_test(Point::new(5.0, 1.0), 1.0));
        assert!(!path.hit_test(Point::new(5.0, 8.0), 1.0));
    }
}
