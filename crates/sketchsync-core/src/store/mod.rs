//! The shared object store: `objectId` → serialized shape state.
//!
//! Two backends implement [`ObjectStore`]: [`MemoryStore`] for single-process
//! use and tests, and [`crate::crdt::CrdtStore`], which replicates through Loro.

mod memory;

pub use memory::MemoryStore;

use crate::shapes::ObjectId;
use std::collections::BTreeMap;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("CRDT error: {0}")]
    Crdt(#[from] loro::LoroError),
    #[error("failed to export updates: {0}")]
    Export(String),
    #[error("malformed update payload: {0}")]
    MalformedPayload(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A point-in-time copy of every entry, ordered by key.
pub type StoreSnapshot = BTreeMap<ObjectId, String>;

/// A keyed mapping replicated across participants.
///
/// Writes are last-writer-wins per key. `undo`/`redo` rewind only the local
/// participant's own mutations.
pub trait ObjectStore {
    fn get(&self, id: &ObjectId) -> Option<String>;

    /// Upsert one entry as a single atomic write.
    fn set(&mut self, id: &ObjectId, state: &str) -> StoreResult<()>;

    /// Remove one entry. Returns whether it existed; absent keys are not an error.
    fn delete(&mut self, id: &ObjectId) -> StoreResult<bool>;

    /// Remove every entry. Returns whether the store is now empty.
    fn delete_all(&mut self) -> StoreResult<bool>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> StoreSnapshot;

    /// Monotonic counter bumped whenever the contents may have changed,
    /// whether by a local write, an import, or a history step.
    fn revision(&self) -> u64;

    /// Revert the last local mutation. Returns false if there was nothing to undo.
    fn undo(&mut self) -> StoreResult<bool>;

    /// Reapply the last undone local mutation.
    fn redo(&mut self) -> StoreResult<bool>;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;
}
