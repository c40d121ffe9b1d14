//! Loro document schema and the replicated object store built on it.

use crate::config::EngineConfig;
use crate::shapes::ObjectId;
use crate::store::{ObjectStore, StoreError, StoreResult, StoreSnapshot};
use loro::{ExportMode, LoroDoc, LoroMap, LoroValue, UndoManager, ValueOrContainer, VersionVector};

/// Key for the shape records map in the document.
pub const OBJECTS_KEY: &str = "canvasObjects";

/// Default undo settings; hosts override them through `EngineConfig`.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 100;
pub const DEFAULT_MERGE_INTERVAL_MS: i64 = 0;

/// A shared object store replicated through a `LoroDoc`.
///
/// Each record is a string value in one map, so concurrent writes to the same
/// key resolve last-writer-wins and writes to different keys never conflict.
/// The `UndoManager` only tracks operations made by this peer.
pub struct CrdtStore {
    doc: LoroDoc,
    undo_manager: UndoManager,
    revision: u64,
}

impl CrdtStore {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_MAX_UNDO_STEPS, DEFAULT_MERGE_INTERVAL_MS)
    }

    /// Create a store with explicit undo retention and merge interval.
    pub fn with_history(max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        Self::from_doc(LoroDoc::new(), max_undo_steps, merge_interval_ms)
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::with_history(config.max_undo_steps, config.undo_merge_interval_ms)
    }

    /// Create a store from a snapshot exported by another participant.
    pub fn from_snapshot(bytes: &[u8]) -> StoreResult<Self> {
        Self::from_snapshot_with_config(bytes, &EngineConfig::default())
    }

    /// Like [`CrdtStore::from_snapshot`], with the undo settings from `config`.
    pub fn from_snapshot_with_config(bytes: &[u8], config: &EngineConfig) -> StoreResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        Ok(Self::from_doc(doc, config.max_undo_steps, config.undo_merge_interval_ms))
    }

    fn from_doc(doc: LoroDoc, max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(max_undo_steps);
        undo_manager.set_merge_interval(merge_interval_ms);
        Self {
            doc,
            undo_manager,
            revision: 0,
        }
    }

    pub fn peer_id(&self) -> u64 {
        self.doc.peer_id()
    }

    fn objects(&self) -> LoroMap {
        self.doc.get_map(OBJECTS_KEY)
    }

    /// Commit pending operations as one undo step.
    fn commit(&mut self) -> StoreResult<()> {
        self.doc.commit();
        self.undo_manager.record_new_checkpoint()?;
        self.revision += 1;
        Ok(())
    }

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| StoreError::Export(e.to_string()))
    }

    /// Export operations the holder of `since` has not seen.
    pub fn export_updates(&self, since: &VersionVector) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::updates(since))
            .map_err(|e| StoreError::Export(e.to_string()))
    }

    /// Apply updates or a snapshot from another participant.
    pub fn import(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.doc
            .import(bytes)
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        self.revision += 1;
        Ok(())
    }

    /// Current version vector, for incremental exports.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }

    /// Clear undo/redo history.
    pub fn clear_history(&self) {
        self.undo_manager.clear();
    }
}

impl Default for CrdtStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for CrdtStore {
    fn get(&self, id: &ObjectId) -> Option<String> {
        match self.objects().get(id.as_str()) {
            Some(ValueOrContainer::Value(LoroValue::String(state))) => Some(state.to_string()),
            _ => None,
        }
    }

    fn set(&mut self, id: &ObjectId, state: &str) -> StoreResult<()> {
        self.objects().insert(id.as_str(), state)?;
        self.commit()
    }

    fn delete(&mut self, id: &ObjectId) -> StoreResult<bool> {
        let objects = self.objects();
        if objects.get(id.as_str()).is_none() {
            return Ok(false);
        }
        objects.delete(id.as_str())?;
        self.commit()?;
        Ok(true)
    }

    fn delete_all(&mut self) -> StoreResult<bool> {
        let objects = self.objects();
        let keys: Vec<String> = match objects.get_deep_value() {
            LoroValue::Map(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        if !keys.is_empty() {
            for key in &keys {
                objects.delete(key)?;
            }
            self.commit()?;
        }
        Ok(objects.is_empty())
    }

    fn len(&self) -> usize {
        self.objects().len()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::new();
        if let LoroValue::Map(map) = self.objects().get_deep_value() {
            for (key, value) in map.iter() {
                match value {
                    LoroValue::String(state) => {
                        snapshot.insert(ObjectId::from(key.as_str()), state.to_string());
                    }
                    other => log::warn!("ignoring non-string entry {key}: {other:?}"),
                }
            }
        }
        snapshot
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn undo(&mut self) -> StoreResult<bool> {
        let undone = self.undo_manager.undo()?;
        if undone {
            self.revision += 1;
        }
        Ok(undone)
    }

    fn redo(&mut self) -> StoreResult<bool> {
        let redone = self.undo_manager.redo()?;
        if redone {
            self.revision += 1;
        }
        Ok(redone)
    }

    fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ObjectId {
        ObjectId::from(s)
    }

    /// Exchange all operations between two stores.
    fn sync_pair(a: &mut CrdtStore, b: &mut CrdtStore) {
        let from_a = a.export_updates(&b.version()).unwrap();
        let from_b = b.export_updates(&a.version()).unwrap();
        b.import(&from_a).unwrap();
        a.import(&from_b).unwrap();
    }

    #[test]
    fn test_set_get_delete() {
        let mut store = CrdtStore::new();
        store.set(&id("r1"), r#"{"objectId":"r1"}"#).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id("r1")).as_deref(), Some(r#"{"objectId":"r1"}"#));

        assert!(store.delete(&id("r1")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_absent_leaves_store_unchanged() {
        let mut store = CrdtStore::new();
        store.set(&id("a"), "1").unwrap();
        let version = store.version();
        let revision = store.revision();

        assert!(!store.delete(&id("nope")).unwrap());
        assert_eq!(store.version(), version);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_undo_is_one_step_per_write() {
        let mut store = CrdtStore::new();
        store.set(&id("r1"), "1").unwrap();
        store.set(&id("r1"), "2").unwrap();
        store.set(&id("r1"), "3").unwrap();

        assert!(store.undo().unwrap());
        assert_eq!(store.get(&id("r1")).as_deref(), Some("2"));
        assert!(store.redo().unwrap());
        assert_eq!(store.get(&id("r1")).as_deref(), Some("3"));
    }

    #[test]
    fn test_delete_all() {
        let mut store = CrdtStore::new();
        store.set(&id("a"), "1").unwrap();
        store.set(&id("b"), "2").unwrap();
        assert!(store.delete_all().unwrap());
        assert_eq!(store.snapshot().len(), 0);
        // Empty store: still confirms empty
        assert!(store.delete_all().unwrap());
    }

    #[test]
    fn test_snapshot_roundtrip_between_peers() {
        let mut store = CrdtStore::new();
        store.set(&id("a"), "1").unwrap();
        let bytes = store.export_snapshot().unwrap();

        let other = CrdtStore::from_snapshot(&bytes).unwrap();
        assert_eq!(other.snapshot(), store.snapshot());
        assert_ne!(other.peer_id(), store.peer_id());
        assert!(!other.can_undo());
    }

    #[test]
    fn test_joiner_uses_configured_history() {
        let mut store = CrdtStore::new();
        store.set(&id("a"), "1").unwrap();
        let bytes = store.export_snapshot().unwrap();

        let config = EngineConfig {
            max_undo_steps: 1,
            ..EngineConfig::default()
        };
        let mut joiner = CrdtStore::from_snapshot_with_config(&bytes, &config).unwrap();
        joiner.set(&id("a"), "2").unwrap();
        joiner.set(&id("a"), "3").unwrap();

        assert!(joiner.undo().unwrap());
        assert_eq!(joiner.get(&id("a")).as_deref(), Some("2"));
        assert!(!joiner.can_undo());
    }

    #[test]
    fn test_clear_history_forgets_local_writes() {
        let mut store = CrdtStore::new();
        store.set(&id("a"), "1").unwrap();
        assert!(store.can_undo());

        store.clear_history();
        assert!(!store.can_undo());
        assert!(!store.undo().unwrap());
        assert_eq!(store.get(&id("a")).as_deref(), Some("1"));
    }

    #[test]
    fn test_concurrent_distinct_keys_converge() {
        let mut a = CrdtStore::new();
        let mut b = CrdtStore::new();
        a.set(&id("a"), "from a").unwrap();
        b.set(&id("b"), "from b").unwrap();
        sync_pair(&mut a, &mut b);

        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_later_write_wins() {
        let mut a = CrdtStore::new();
        let mut b = CrdtStore::new();
        a.set(&id("k"), "w1").unwrap();
        sync_pair(&mut a, &mut b);
        b.set(&id("k"), "w2").unwrap();
        sync_pair(&mut a, &mut b);

        assert_eq!(a.get(&id("k")).as_deref(), Some("w2"));
        assert_eq!(b.get(&id("k")).as_deref(), Some("w2"));
    }

    #[test]
    fn test_undo_skips_remote_changes() {
        let mut a = CrdtStore::new();
        let mut b = CrdtStore::new();
        a.set(&id("mine"), "1").unwrap();
        b.set(&id("theirs"), "2").unwrap();
        sync_pair(&mut a, &mut b);

        assert!(a.undo().unwrap());
        assert!(a.get(&id("mine")).is_none());
        assert_eq!(a.get(&id("theirs")).as_deref(), Some("2"));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let mut store = CrdtStore::new();
        assert!(matches!(
            store.import(b"definitely not loro"),
            Err(StoreError::MalformedPayload(_))
        ));
    }
}
