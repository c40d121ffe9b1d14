//! History controller: undo/redo of the local participant's own mutations.
//!
//! The store keeps the history; this layer adds no depth limit of its own.

use crate::store::{ObjectStore, StoreResult};

/// Undo the last local mutation. Returns false if there was nothing to undo.
pub fn undo<S: ObjectStore + ?Sized>(store: &mut S) -> StoreResult<bool> {
    let undone = store.undo()?;
    log::debug!("undo (applied: {undone})");
    Ok(undone)
}

/// Redo the last undone local mutation.
pub fn redo<S: ObjectStore + ?Sized>(store: &mut S) -> StoreResult<bool> {
    let redone = store.redo()?;
    log::debug!("redo (applied: {redone})");
    Ok(redone)
}
