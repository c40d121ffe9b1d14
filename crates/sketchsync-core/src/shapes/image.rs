//! Image shape for placed raster or SVG images.

use super::{ObjectId, ShapeError, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Image format of an uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        // SVG is text; look for the root element near the start
        let head = &data[..data.len().min(256)];
        let head = String::from_utf8_lossy(head);
        let head = head.trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some(ImageFormat::Svg);
        }
        None
    }
}

/// An image placed on the canvas. The payload travels inline as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub(crate) object_id: ObjectId,
    pub left: f64,
    pub top: f64,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Source width in pixels.
    pub source_width: u32,
    /// Source height in pixels.
    pub source_height: u32,
    pub format: ImageFormat,
    /// `data:<mime>;base64,<payload>`
    pub src: String,
    #[serde(default)]
    pub angle: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Image {
    /// Create an image from raw bytes, detecting the format.
    pub fn from_bytes(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
    ) -> Result<Self, ShapeError> {
        let format = ImageFormat::from_magic_bytes(data).ok_or(ShapeError::UnsupportedImage)?;
        if source_width == 0 || source_height == 0 {
            return Err(ShapeError::UnsupportedImage);
        }
        Ok(Self {
            object_id: ObjectId::new(),
            left: position.x,
            top: position.y,
            width: f64::from(source_width),
            height: f64::from(source_height),
            source_width,
            source_height,
            format,
            src: format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data)),
            angle: 0.0,
            style: ShapeStyle::default(),
        })
    }

    /// Scale to fit within max dimensions, preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let aspect = f64::from(self.source_width) / f64::from(self.source_height);
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    /// Decode the payload from the data URL.
    pub fn data(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.src.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> &ObjectId {
        &self.object_id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
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
        self.width *= scale[0].abs();
        self.height *= scale[3].abs();
    }
}
