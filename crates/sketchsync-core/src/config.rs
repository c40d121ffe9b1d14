//! Engine configuration.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the engine and its store. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Undo steps the store retains.
    pub max_undo_steps: usize,
    /// Local edits closer together than this merge into one undo step.
    pub undo_merge_interval_ms: i64,
    /// Select-tool hit tolerance in world units.
    pub hit_tolerance: f64,
    /// Drop zero-area shapes instead of committing them.
    pub discard_degenerate_shapes: bool,
    /// Offset applied to pasted copies.
    pub paste_offset: f64,
    /// Where uploaded images are placed.
    pub image_origin: Point,
    /// Uploaded images are fitted into a square of this size.
    pub image_max_size: f64,
    pub text_placeholder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_steps: 100,
            undo_merge_interval_ms: 0,
            hit_tolerance: 4.0,
            discard_degenerate_shapes: false,
            paste_offset: 20.0,
            image_origin: Point::new(100.0, 100.0),
            image_max_size: 200.0,
            text_placeholder: "Tap to Type".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
