//! Text shape.

use super::{ObjectId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub(crate) object_id: ObjectId,
    pub left: f64,
    pub top: f64,
    /// The text content.
    pub text: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS font weight (`"400"`, `"700"`, ...).
    pub font_weight: String,
    #[serde(default)]
    pub angle: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_FAMILY: &'static str = "Helvetica";
    pub const DEFAULT_FONT_SIZE: f64 = 36.0;
    pub const DEFAULT_FONT_WEIGHT: &'static str = "400";

    /// Average glyph advance as a fraction of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;
    const LINE_HEIGHT_FACTOR: f64 = 1.16;

    pub fn new(position: Point, text: String) -> Self {
        Self {
            object_id: ObjectId::new(),
            left: position.x,
            top: position.y,
            text,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: Self::DEFAULT_FONT_WEIGHT.to_string(),
            angle: 0.0,
            style: ShapeStyle::default(),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove the last character. Returns false if the text was already empty.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Approximate layout size; the renderer owns exact metrics.
    fn approximate_size(&self) -> (f64, f64) {
        let widest = self.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let lines = self.text.lines().count().max(1);
        (
            widest as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR,
            lines as f64 * self.font_size * Self::LINE_HEIGHT_FACTOR,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &ObjectId {
        &self.object_id
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.approximate_size();
        Rect::new(self.left, self.top, self.left + width, self.top + height)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        let origin = affine * Point::new(self.left, self.top);
        self.left = origin.x;
        self.top = origin.y;
        // Text scales through its font size
        let scale = affine.as_coeffs()[3].abs();
        if scale > 0.0 {
            self.font_size *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let text = Text::new(Point::new(5.0, 5.0), "Tap to Type".to_string());
        assert_eq!(text.font_family, "Helvetica");
        assert_eq!(text.font_weight, "400");
        assert!((text.font_size - 36.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_editing() {
        let mut text = Text::new(Point::ZERO, String::new());
        text.push_str("hi");
        text.push_char('!');
        assert_eq!(text.text, "hi!");
        assert!(text.backspace());
        assert_eq!(text.text, "hi");
        text.text.clear();
        assert!(!text.backspace());
    }

    #[test]
    fn test_bounds_grow_with_content() {
        let short = Text::new(Point::ZERO, "a".to_string());
        let long = Text::new(Point::ZERO, "abcdef".to_string());
        assert!(long.bounds().width() > short.bounds().width());
        assert!(short.hit_test(Point::new(5.0, 10.0), 0.0));
    }

    #[test]
    fn test_serialized_field_names() {
        let text = Text::new(Point::ZERO, "x".to_string());
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["fontFamily"], "Helvetica");
        assert_eq!(value["fontSize"], 36.0);
        assert_eq!(value["text"], "x");
    }
}
