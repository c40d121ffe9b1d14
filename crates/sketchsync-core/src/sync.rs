//! Shape synchronizer: the only write path from local edits into the store.

use crate::record::{RecordError, ShapeRecord};
use crate::shapes::{ObjectId, Shape};
use crate::store::{ObjectStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Serialize a shape and upsert it under its `objectId` as one write.
///
/// An unset shape is a silent no-op. Returns the record that was written.
pub fn sync_shape<S: ObjectStore + ?Sized>(
    store: &mut S,
    shape: Option<&Shape>,
) -> SyncResult<Option<ShapeRecord>> {
    let Some(shape) = shape else {
        return Ok(None);
    };
    let record = ShapeRecord::from_shape(shape)?;
    store.set(&record.object_id, &record.to_json())?;
    log::debug!("synced {} {}", record.kind, record.object_id);
    Ok(Some(record))
}

/// Remove exactly one entry. Absent keys are not an error.
pub fn delete_one<S: ObjectStore + ?Sized>(store: &mut S, id: &ObjectId) -> SyncResult<bool> {
    let existed = store.delete(id)?;
    log::debug!("deleted {id} (existed: {existed})");
    Ok(existed)
}

/// Remove every entry; returns whether the store is now empty.
pub fn delete_all<S: ObjectStore + ?Sized>(store: &mut S) -> SyncResult<bool> {
    let count = store.len();
    let empty = store.delete_all()?;
    log::info!("deleted all {count} shapes (store empty: {empty})");
    Ok(empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use crate::store::MemoryStore;
    use kurbo::Point;
    use serde_json::Value;

    #[test]
    fn test_sync_none_is_noop() {
        let mut store = MemoryStore::new();
        assert!(sync_shape(&mut store, None).unwrap().is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_sync_upserts_one_entry() {
        let mut store = MemoryStore::new();
        let mut shape = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 90.0, 50.0)).with_id("r1");
        sync_shape(&mut store, Some(&shape)).unwrap();
        shape.translate((5.0, 0.0).into());
        sync_shape(&mut store, Some(&shape)).unwrap();

        assert_eq!(store.len(), 1);
        let stored: Value = serde_json::from_str(&store.get(&ObjectId::from("r1")).unwrap()).unwrap();
        assert_eq!(stored["objectId"], "r1");
        assert_eq!(stored["left"], 15.0);
    }

    #[test]
    fn test_delete_one_is_idempotent() {
        let mut store = MemoryStore::new();
        assert!(!delete_one(&mut store, &ObjectId::from("ghost")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_all_reports_empty() {
        let mut store = MemoryStore::new();
        let shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0));
        sync_shape(&mut store, Some(&shape)).unwrap();
        assert!(delete_all(&mut store).unwrap());
        assert!(store.is_empty());

        store.set_available(false);
        assert!(matches!(delete_all(&mut store), Err(SyncError::Store(StoreError::Unavailable))));
    }
}
