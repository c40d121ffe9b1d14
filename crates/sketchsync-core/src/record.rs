//! Shape records: the canonical serialized form of a shape.
//!
//! A record's serialized state is the shape's flat JSON object, including its
//! `type` tag and embedded `objectId`. The store keeps that object as a JSON
//! string under the same `objectId` key.

use crate::shapes::{ObjectId, Shape, ShapeKind};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors converting between shapes and records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to serialize shape: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("record state is not a JSON object")]
    NotAnObject,
    #[error("record has no embedded objectId")]
    MissingId,
    #[error("embedded objectId `{embedded}` does not match key `{key}`")]
    MismatchedId { key: ObjectId, embedded: String },
    #[error("unknown shape type: {0}")]
    UnknownType(String),
}

pub type RecordResult<T> = Result<T, RecordError>;

const ID_FIELD: &str = "objectId";
const TYPE_FIELD: &str = "type";

/// One entry of the shared store.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub object_id: ObjectId,
    pub kind: ShapeKind,
    pub serialized_state: Map<String, Value>,
}

impl ShapeRecord {
    /// Serialize a shape into its canonical record.
    pub fn from_shape(shape: &Shape) -> RecordResult<Self> {
        let value = serde_json::to_value(shape).map_err(RecordError::Serialize)?;
        let Value::Object(mut state) = value else {
            return Err(RecordError::NotAnObject);
        };
        // The shape always carries its id, but the record must not depend on it
        state.insert(ID_FIELD.to_string(), Value::String(shape.id().to_string()));
        Ok(Self {
            object_id: shape.id().clone(),
            kind: shape.kind(),
            serialized_state: state,
        })
    }

    /// Parse a stored JSON string, checking it against the key it was stored under.
    pub fn from_json(key: &ObjectId, text: &str) -> RecordResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(RecordError::Malformed)?;
        let Value::Object(state) = value else {
            return Err(RecordError::NotAnObject);
        };
        let embedded = state
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingId)?;
        if embedded != key.as_str() {
            return Err(RecordError::MismatchedId {
                key: key.clone(),
                embedded: embedded.to_string(),
            });
        }
        let type_name = state.get(TYPE_FIELD).and_then(Value::as_str).unwrap_or_default();
        let kind =
            ShapeKind::parse(type_name).ok_or_else(|| RecordError::UnknownType(type_name.to_string()))?;
        Ok(Self {
            object_id: key.clone(),
            kind,
            serialized_state: state,
        })
    }

    /// The JSON string written to the store.
    pub fn to_json(&self) -> String {
        Value::Object(self.serialized_state.clone()).to_string()
    }

    /// Reconstruct the shape described by this record.
    pub fn to_shape(&self) -> RecordResult<Shape> {
        serde_json::from_value(Value::Object(self.serialized_state.clone()))
            .map_err(RecordError::Malformed)
    }

    /// Read one attribute of the serialized state.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.serialized_state.get(name)
    }
}

/// Serialize a shape to its canonical record.
pub fn serialize(shape: &Shape) -> RecordResult<ShapeRecord> {
    ShapeRecord::from_shape(shape)
}

/// Reconstruct a shape from a record.
pub fn deserialize(record: &ShapeRecord) -> RecordResult<Shape> {
    record.to_shape()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, FreeformPath, Group, Image, Line, Rectangle, SerializableColor, Text};
    use kurbo::Point;
    use pretty_assertions::assert_eq;

    fn every_kind() -> Vec<Shape> {
        let mut filled = Rectangle::new(Point::new(10.0, 10.0), 90.0, 50.0);
        filled.style.fill = Some(SerializableColor::parse("#aabbcc").unwrap());
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        vec![
            Shape::Rectangle(filled),
            Shape::Circle(Circle::new(Point::new(3.0, 4.0), 12.5)),
            Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(7.0, 9.0))),
            Shape::FreeformPath(FreeformPath::from_points(vec![
                Point::new(0.0, 0.0),
                Point::new(1.5, 2.5),
                Point::new(3.0, 1.0),
            ])),
            Shape::Text(Text::new(Point::new(1.0, 2.0), "Tap to Type".to_string())),
            Shape::Image(Image::from_bytes(Point::new(100.0, 100.0), &png, 64, 32).unwrap()),
            Shape::Group(Group::new(vec![Shape::Line(Line::new(
                Point::ZERO,
                Point::new(1.0, 1.0),
            ))])),
        ]
    }

    #[test]
    fn test_roundtrip_preserves_serialized_state() {
        for shape in every_kind() {
            let record = serialize(&shape).unwrap();
            let restored = deserialize(&record).unwrap();
            assert_eq!(serialize(&restored).unwrap().serialized_state, record.serialized_state);
            assert_eq!(restored, shape);
        }
    }

    #[test]
    fn test_record_embeds_id_and_type() {
        let shape = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 90.0, 50.0)).with_id("r1");
        let record = ShapeRecord::from_shape(&shape).unwrap();
        assert_eq!(record.object_id, ObjectId::from("r1"));
        assert_eq!(record.kind, ShapeKind::Rectangle);
        assert_eq!(record.attribute("objectId"), Some(&Value::from("r1")));
        assert_eq!(record.attribute("type"), Some(&Value::from("rectangle")));
    }

    #[test]
    fn test_from_json_roundtrip() {
        let shape = Shape::Circle(Circle::new(Point::ZERO, 5.0)).with_id("c1");
        let record = serialize(&shape).unwrap();
        let parsed = ShapeRecord::from_json(&ObjectId::from("c1"), &record.to_json()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_from_json_rejects_bad_records() {
        let key = ObjectId::from("x");
        assert!(matches!(
            ShapeRecord::from_json(&key, "{not json"),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            ShapeRecord::from_json(&key, "[1, 2]"),
            Err(RecordError::NotAnObject)
        ));
        assert!(matches!(
            ShapeRecord::from_json(&key, r#"{"type":"rectangle"}"#),
            Err(RecordError::MissingId)
        ));
        assert!(matches!(
            ShapeRecord::from_json(&key, r#"{"type":"rectangle","objectId":"y"}"#),
            Err(RecordError::MismatchedId { .. })
        ));
        assert!(matches!(
            ShapeRecord::from_json(&key, r#"{"type":"hexagon","objectId":"x"}"#),
            Err(RecordError::UnknownType(_))
        ));
    }

    #[test]
    fn test_to_shape_rejects_incomplete_state() {
        let key = ObjectId::from("x");
        let record = ShapeRecord::from_json(&key, r#"{"type":"rectangle","objectId":"x"}"#).unwrap();
        assert!(matches!(record.to_shape(), Err(RecordError::Malformed(_))));
    }
}
