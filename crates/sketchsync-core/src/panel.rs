//! Element attribute panel state and property edits.

use crate::shapes::{SerializableColor, Shape, ShapeError, ShapeKind, ShapeStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default fill and stroke for new shapes.
pub const DEFAULT_COLOR: &str = "#aabbcc";

/// An editable attribute exposed by the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeProperty {
    Width,
    Height,
    FontSize,
    FontFamily,
    FontWeight,
    Fill,
    Stroke,
}

impl AttributeProperty {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeProperty::Width => "width",
            AttributeProperty::Height => "height",
            AttributeProperty::FontSize => "fontSize",
            AttributeProperty::FontFamily => "fontFamily",
            AttributeProperty::FontWeight => "fontWeight",
            AttributeProperty::Fill => "fill",
            AttributeProperty::Stroke => "stroke",
        }
    }
}

impl FromStr for AttributeProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "width" => Ok(AttributeProperty::Width),
            "height" => Ok(AttributeProperty::Height),
            "fontSize" => Ok(AttributeProperty::FontSize),
            "fontFamily" => Ok(AttributeProperty::FontFamily),
            "fontWeight" => Ok(AttributeProperty::FontWeight),
            "fill" => Ok(AttributeProperty::Fill),
            "stroke" => Ok(AttributeProperty::Stroke),
            other => Err(format!("unknown attribute property: {other}")),
        }
    }
}

impl fmt::Display for AttributeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the selected shape's editable attributes, as the panel shows them.
///
/// With nothing selected the values act as defaults for newly drawn shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    pub width: String,
    pub height: String,
    pub font_size: String,
    pub font_weight: String,
    pub font_family: String,
    pub fill: String,
    pub stroke: String,
}

impl Default for ElementAttributes {
    fn default() -> Self {
        Self {
            width: String::new(),
            height: String::new(),
            font_size: "36".to_string(),
            font_weight: "400".to_string(),
            font_family: "Helvetica".to_string(),
            fill: DEFAULT_COLOR.to_string(),
            stroke: DEFAULT_COLOR.to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

impl ElementAttributes {
    /// Refresh from a shape. Font fields keep their values for non-text shapes.
    pub fn refresh_from(&mut self, shape: &Shape) {
        let bounds = shape.bounds();
        self.width = format_number(bounds.width());
        self.height = format_number(bounds.height());
        let style = shape.style();
        self.fill = style.fill.map(|c| c.to_hex()).unwrap_or_default();
        self.stroke = style.stroke.to_hex();
        if let Some(text) = shape.as_text() {
            self.font_size = format_number(text.font_size);
            self.font_weight = text.font_weight.clone();
            self.font_family = text.font_family.clone();
        }
    }

    pub fn get(&self, property: AttributeProperty) -> &str {
        match property {
            AttributeProperty::Width => &self.width,
            AttributeProperty::Height => &self.height,
            AttributeProperty::FontSize => &self.font_size,
            AttributeProperty::FontFamily => &self.font_family,
            AttributeProperty::FontWeight => &self.font_weight,
            AttributeProperty::Fill => &self.fill,
            AttributeProperty::Stroke => &self.stroke,
        }
    }

    pub fn set(&mut self, property: AttributeProperty, value: &str) {
        let slot = match property {
            AttributeProperty::Width => &mut self.width,
            AttributeProperty::Height => &mut self.height,
            AttributeProperty::FontSize => &mut self.font_size,
            AttributeProperty::FontFamily => &mut self.font_family,
            AttributeProperty::FontWeight => &mut self.font_weight,
            AttributeProperty::Fill => &mut self.fill,
            AttributeProperty::Stroke => &mut self.stroke,
        };
        *slot = value.to_string();
    }

    /// Style for a new shape of the given kind. Unparseable panel colors
    /// fall back to the defaults.
    pub fn draft_style(&self, kind: ShapeKind) -> ShapeStyle {
        let fallback = SerializableColor::parse(DEFAULT_COLOR).unwrap_or_else(|_| SerializableColor::black());
        let fill = SerializableColor::parse(&self.fill).unwrap_or(fallback);
        let stroke = SerializableColor::parse(&self.stroke).unwrap_or(fallback);
        let mut style = ShapeStyle::default();
        match kind {
            // Open paths have no fill; they draw in the stroke color
            ShapeKind::Line | ShapeKind::FreeformPath => {
                style.stroke = stroke;
                style.stroke_width = 2.0;
            }
            _ => {
                style.fill = Some(fill);
                style.stroke = stroke;
            }
        }
        style
    }

    /// Apply the panel's font settings to a new text shape.
    pub fn apply_font(&self, shape: &mut Shape) {
        let Some(text) = shape.as_text_mut() else {
            return;
        };
        if let Ok(size) = self.font_size.trim().parse::<f64>() {
            if size > 0.0 {
                text.font_size = size;
            }
        }
        if !self.font_family.trim().is_empty() {
            text.font_family = self.font_family.trim().to_string();
        }
        if !self.font_weight.trim().is_empty() {
            text.font_weight = self.font_weight.trim().to_string();
        }
    }
}

fn parse_dimension(value: &str) -> Result<f64, ShapeError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ShapeError::InvalidDimension(value.to_string()))
}

/// Apply one panel edit to a shape.
pub fn apply_property(shape: &mut Shape, property: AttributeProperty, value: &str) -> Result<(), ShapeError> {
    match property {
        AttributeProperty::Width => shape.set_width(parse_dimension(value)?),
        AttributeProperty::Height => shape.set_height(parse_dimension(value)?),
        AttributeProperty::Fill => {
            shape.style_mut().fill = Some(SerializableColor::parse(value)?);
            Ok(())
        }
        AttributeProperty::Stroke => {
            shape.style_mut().stroke = SerializableColor::parse(value)?;
            Ok(())
        }
        AttributeProperty::FontSize | AttributeProperty::FontFamily | AttributeProperty::FontWeight => {
            let not_applicable = shape.not_applicable(property.name());
            let text = shape.as_text_mut().ok_or(not_applicable)?;
            match property {
                AttributeProperty::FontSize => {
                    let size = parse_dimension(value)?;
                    if size <= 0.0 || !size.is_finite() {
                        return Err(ShapeError::InvalidDimension(value.to_string()));
                    }
                    text.font_size = size;
                }
                AttributeProperty::FontFamily => text.font_family = value.trim().to_string(),
                _ => text.font_weight = value.trim().to_string(),
            }
            Ok(())
        }
    }
}
