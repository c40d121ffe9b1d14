//! SketchSync Core Library
//!
//! Shape synchronization and interaction engine for a collaborative drawing
//! surface. Each participant runs an [`Engine`] over a replicated
//! [`ObjectStore`] and a local [`RenderSurface`].

pub mod canvas;
pub mod config;
pub mod crdt;
pub mod engine;
pub mod history;
pub mod input;
pub mod keyboard;
pub mod panel;
pub mod reconcile;
pub mod record;
pub mod session;
pub mod shapes;
pub mod store;
pub mod sync;
pub mod tools;

pub use canvas::{Canvas, RenderSurface, Viewport};
pub use config::{ConfigError, EngineConfig};
pub use crdt::CrdtStore;
pub use engine::{Engine, HostRequest, ImageUpload};
pub use input::{Input, KeyChord, Modifiers, MouseButton};
pub use keyboard::{KeyAction, ShortcutRegistry};
pub use panel::{AttributeProperty, ElementAttributes};
pub use reconcile::{reconcile, ReconcileReport};
pub use record::{RecordError, ShapeRecord};
pub use session::Session;
pub use shapes::{ObjectId, Shape, ShapeError, ShapeKind};
pub use store::{MemoryStore, ObjectStore, StoreError, StoreSnapshot};
pub use sync::{delete_all, delete_one, sync_shape, SyncError};
pub use tools::{ActiveElement, InteractionState, ToolKind, ToolManager};
