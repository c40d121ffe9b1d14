//! In-memory object store.

use super::{ObjectStore, StoreError, StoreResult, StoreSnapshot};
use crate::shapes::ObjectId;

/// Default number of undo steps kept.
const DEFAULT_MAX_UNDO_STEPS: usize = 100;

/// One key change, enough to apply it in either direction.
#[derive(Debug, Clone)]
struct Mutation {
    id: ObjectId,
    before: Option<String>,
    after: Option<String>,
}

/// In-memory store for single-process use and tests.
///
/// Local writes are recorded for undo; writes applied through
/// [`MemoryStore::apply_remote`] stand in for other participants and are not.
#[derive(Debug)]
pub struct MemoryStore {
    entries: StoreSnapshot,
    undo_stack: Vec<Vec<Mutation>>,
    redo_stack: Vec<Vec<Mutation>>,
    max_undo_steps: usize,
    available: bool,
    revision: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: StoreSnapshot::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
            available: true,
            revision: 0,
        }
    }

    pub fn with_max_undo_steps(mut self, steps: usize) -> Self {
        self.max_undo_steps = steps;
        self
    }

    /// Simulate losing (or regaining) the replication connection.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Apply a mutation made by another participant. Not recorded for undo.
    pub fn apply_remote(&mut self, id: &ObjectId, state: Option<String>) {
        match state {
            Some(state) => {
                self.entries.insert(id.clone(), state);
            }
            None => {
                self.entries.remove(id);
            }
        }
        self.revision += 1;
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available { Ok(()) } else { Err(StoreError::Unavailable) }
    }

    fn write(&mut self, id: &ObjectId, state: Option<String>) -> Mutation {
        let before = match &state {
            Some(state) => self.entries.insert(id.clone(), state.clone()),
            None => self.entries.remove(id),
        };
        Mutation {
            id: id.clone(),
            before,
            after: state,
        }
    }

    fn record(&mut self, batch: Vec<Mutation>) {
        if batch.is_empty() {
            return;
        }
        self.undo_stack.push(batch);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_undo_steps {
            self.undo_stack.remove(0);
        }
        self.revision += 1;
    }

    fn replay(&mut self, batch: &[Mutation], forward: bool) {
        for mutation in batch {
            let state = if forward { &mutation.after } else { &mutation.before };
            self.write(&mutation.id, state.clone());
        }
        self.revision += 1;
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, id: &ObjectId) -> Option<String> {
        self.entries.get(id).cloned()
    }

    fn set(&mut self, id: &ObjectId, state: &str) -> StoreResult<()> {
        self.ensure_available()?;
        let mutation = self.write(id, Some(state.to_string()));
        self.record(vec![mutation]);
        Ok(())
    }

    fn delete(&mut self, id: &ObjectId) -> StoreResult<bool> {
        self.ensure_available()?;
        if !self.entries.contains_key(id) {
            return Ok(false);
        }
        let mutation = self.write(id, None);
        self.record(vec![mutation]);
        Ok(true)
    }

    fn delete_all(&mut self) -> StoreResult<bool> {
        self.ensure_available()?;
        let ids: Vec<ObjectId> = self.entries.keys().cloned().collect();
        let batch = ids.iter().map(|id| self.write(id, None)).collect();
        self.record(batch);
        Ok(self.entries.is_empty())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.entries.clone()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn undo(&mut self) -> StoreResult<bool> {
        self.ensure_available()?;
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };
        let reversed: Vec<Mutation> = batch.iter().rev().cloned().collect();
        self.replay(&reversed, false);
        self.redo_stack.push(batch);
        Ok(true)
    }

    fn redo(&mut self) -> StoreResult<bool> {
        self.ensure_available()?;
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };
        self.replay(&batch, true);
        self.undo_stack.push(batch);
        Ok(true)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
