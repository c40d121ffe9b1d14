//! CRDT-backed shared object store using Loro.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! └── "canvasObjects": LoroMap<objectId, String>
//! ```
//!
//! Each value is the record's serialized state as a JSON string (see
//! [`crate::record`]). Participants exchange Loro snapshots or incremental
//! updates over whatever transport the host provides.

mod schema;

pub use schema::{CrdtStore, DEFAULT_MAX_UNDO_STEPS, DEFAULT_MERGE_INTERVAL_MS, OBJECTS_KEY};

pub use loro::VersionVector;
