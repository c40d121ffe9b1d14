//! Shape definitions for the shared canvas.
//!
//! Every shape serializes to a flat JSON object tagged with `"type"`; that
//! object is the shape's canonical serialized state (see [`crate::record`]).

mod circle;
mod freeform;
mod group;
mod image;
mod line;
mod rectangle;
mod text;

pub use circle::Circle;
pub use freeform::FreeformPath;
pub use group::Group;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Affine, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while editing shape attributes.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("property `{property}` does not apply to {kind} shapes")]
    NotApplicable { property: String, kind: ShapeKind },
    #[error("unsupported image payload")]
    UnsupportedImage,
}

/// Globally unique shape identifier. Assigned once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The `type` discriminator of a shape record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    FreeformPath,
    Text,
    Image,
    Group,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
            ShapeKind::FreeformPath => "freeform-path",
            ShapeKind::Text => "text",
            ShapeKind::Image => "image",
            ShapeKind::Group => "group",
        }
    }

    /// Parse a record `type` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rectangle" => Some(ShapeKind::Rectangle),
            "circle" => Some(ShapeKind::Circle),
            "line" => Some(ShapeKind::Line),
            "freeform-path" => Some(ShapeKind::FreeformPath),
            "text" => Some(ShapeKind::Text),
            "image" => Some(ShapeKind::Image),
            "group" => Some(ShapeKind::Group),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable color representation (RGBA8), written as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Parse any CSS color string (`#aabbcc`, `#abc`, `rgb(...)`, named colors).
    pub fn parse(input: &str) -> Result<Self, ShapeError> {
        let parsed = peniko::color::parse_color(input.trim())
            .map_err(|_| ShapeError::InvalidColor(input.to_string()))?;
        Ok(parsed.to_alpha_color::<peniko::color::Srgb>().into())
    }

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ShapeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual attributes shared by every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color.
    pub stroke: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke_color(&self) -> Color {
        self.stroke.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(|c| c.into())
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: SerializableColor::black(),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ObjectId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply an axis-aligned transform (translation and scale) to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Enum wrapper for all shape types. Serializes as the canonical record state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    FreeformPath(FreeformPath),
    Text(Text),
    Image(Image),
    Group(Group),
}

macro_rules! each_shape {
    ($shape:expr, $s:ident => $body:expr) => {
        match $shape {
            Shape::Rectangle($s) => $body,
            Shape::Circle($s) => $body,
            Shape::Line($s) => $body,
            Shape::FreeformPath($s) => $body,
            Shape::Text($s) => $body,
            Shape::Image($s) => $body,
            Shape::Group($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> &ObjectId {
        each_shape!(self, s => s.id())
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::FreeformPath(_) => ShapeKind::FreeformPath,
            Shape::Text(_) => ShapeKind::Text,
            Shape::Image(_) => ShapeKind::Image,
            Shape::Group(_) => ShapeKind::Group,
        }
    }

    pub fn bounds(&self) -> Rect {
        each_shape!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        each_shape!(self, s => s.hit_test(point, tolerance))
    }

    pub fn style(&self) -> &ShapeStyle {
        each_shape!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        each_shape!(self, s => s.style_mut())
    }

    pub fn transform(&mut self, affine: Affine) {
        each_shape!(self, s => s.transform(affine))
    }

    /// Move the shape by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.transform(Affine::translate(delta));
    }

    /// Scale the shape around the top-left corner of its bounds.
    pub fn scale(&mut self, scale_x: f64, scale_y: f64) {
        let origin = self.bounds().origin().to_vec2();
        self.transform(
            Affine::translate(origin)
                * Affine::scale_non_uniform(scale_x, scale_y)
                * Affine::translate(-origin),
        );
    }

    /// Replace the identifier. Only valid before the shape is first synced.
    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        let id = id.into();
        each_shape!(&mut self, s => s.object_id = id);
        self
    }

    /// Give the shape a fresh identifier (used when pasting copies).
    pub fn regenerate_id(&mut self) {
        let id = ObjectId::new();
        each_shape!(self, s => s.object_id = id);
    }

    /// Set the displayed width, keeping the left edge in place.
    pub fn set_width(&mut self, width: f64) -> Result<(), ShapeError> {
        check_dimension(width)?;
        match self {
            Shape::Rectangle(r) => r.width = width,
            Shape::Image(i) => i.width = width,
            Shape::Circle(c) => c.rx = width / 2.0,
            Shape::Text(_) => return Err(self.not_applicable("width")),
            _ => self.scale_extent(width, true)?,
        }
        Ok(())
    }

    /// Set the displayed height, keeping the top edge in place.
    pub fn set_height(&mut self, height: f64) -> Result<(), ShapeError> {
        check_dimension(height)?;
        match self {
            Shape::Rectangle(r) => r.height = height,
            Shape::Image(i) => i.height = height,
            Shape::Circle(c) => c.ry = height / 2.0,
            Shape::Text(_) => return Err(self.not_applicable("height")),
            _ => self.scale_extent(height, false)?,
        }
        Ok(())
    }

    fn scale_extent(&mut self, target: f64, horizontal: bool) -> Result<(), ShapeError> {
        let bounds = self.bounds();
        let current = if horizontal { bounds.width() } else { bounds.height() };
        if current <= f64::EPSILON {
            let property = if horizontal { "width" } else { "height" };
            return Err(self.not_applicable(property));
        }
        let factor = target / current;
        if horizontal {
            self.scale(factor, 1.0);
        } else {
            self.scale(1.0, factor);
        }
        Ok(())
    }

    pub(crate) fn not_applicable(&self, property: &str) -> ShapeError {
        ShapeError::NotApplicable {
            property: property.to_string(),
            kind: self.kind(),
        }
    }

    /// Whether the shape has no visible extent (zero area, zero length).
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Line(l) => l.start() == l.end(),
            Shape::FreeformPath(p) => p.distinct_points() < 2,
            Shape::Text(_) => false,
            Shape::Group(g) => g.children.is_empty(),
            _ => {
                let bounds = self.bounds();
                bounds.width() <= 0.0 || bounds.height() <= 0.0
            }
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

fn check_dimension(value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidDimension(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        let color = SerializableColor::parse("#aabbcc").unwrap();
        assert_eq!(color, SerializableColor::new(0xaa, 0xbb, 0xcc, 255));
        assert_eq!(color.to_hex(), "#aabbcc");

        let translucent = SerializableColor::new(255, 0, 0, 128);
        assert_eq!(translucent.to_hex(), "#ff000080");
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!(matches!(
            SerializableColor::parse("not-a-color"),
            Err(ShapeError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_shape_serializes_flat_with_type_tag() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 90.0, 50.0)).with_id("r1");
        let value = serde_json::to_value(&rect).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["objectId"], "r1");
        assert_eq!(value["left"], 10.0);
        assert_eq!(value["width"], 90.0);
        assert_eq!(value["stroke"], "#000000");
    }

    #[test]
    fn test_scale_keeps_origin() {
        let mut shape = Shape::Rectangle(Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0));
        shape.scale(2.0, 0.5);
        let bounds = shape.bounds();
        assert!((bounds.x0 - 10.0).abs() < 1e-9);
        assert!((bounds.y0 - 20.0).abs() < 1e-9);
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_width_on_line_scales_extent() {
        let mut shape = Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        shape.set_width(40.0).unwrap();
        assert!((shape.bounds().width() - 40.0).abs() < 1e-9);
        assert!((shape.bounds().height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_width_not_applicable_to_text() {
        let mut shape = Shape::Text(Text::new(Point::ZERO, "hi".to_string()));
        assert!(matches!(
            shape.set_width(10.0),
            Err(ShapeError::NotApplicable { .. })
        ));
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let mut shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0));
        assert!(matches!(
            shape.set_height(-3.0),
            Err(ShapeError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_degenerate_detection() {
        let flat = Shape::Rectangle(Rectangle::from_corners(Point::new(5.0, 5.0), Point::new(5.0, 5.0)));
        assert!(flat.is_degenerate());

        let line = Shape::Line(Line::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0)));
        assert!(line.is_degenerate());

        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 3.0, 4.0));
        assert!(!rect.is_degenerate());
    }

    #[test]
    fn test_point_to_polyline_dist() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!((point_to_polyline_dist(Point::new(5.0, 3.0), &points) - 3.0).abs() < 1e-9);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }
}
