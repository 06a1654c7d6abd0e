//! Bounded undo/redo of full table snapshots.
//!
//! Each entry is a deep copy of the scene's shapes taken immediately before a
//! mutation. Pushing a new entry clears the redo stack; once the undo stack
//! exceeds its depth the oldest entry is dropped.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::scene::{self, DurableId, Shape, ShapeId};

/// A snapshot of every shape in the scene.
pub type Snapshot = Vec<Shape>;

/// Linear undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    depth: usize,
}

impl History {
    /// Create an empty history keeping at most `depth` undo entries.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), depth: depth.max(1) }
    }

    /// Record the pre-mutation state and discard anything redoable.
    pub fn push(&mut self, before: Snapshot) {
        self.redo.clear();
        self.undo.push_back(before);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
            debug!(depth = self.depth, "history full; evicted oldest entry");
        }
    }

    /// Step back: returns the snapshot to restore, after saving `current`
    /// for redo. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo.pop_back()?;
        self.redo.push(current);
        Some(restored)
    }

    /// Step forward: the mirror of [`History::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo.pop()?;
        self.undo.push_back(current);
        Some(restored)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Write durable ids into every stored snapshot so that stepping back
    /// past a save still refers to the persisted rows.
    pub fn assign_durable_ids(&mut self, assigned: &HashMap<ShapeId, DurableId>) {
        if assigned.is_empty() {
            return;
        }
        for snapshot in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            scene::assign_durable_ids(snapshot, assigned);
        }
    }

    /// Forget, in every stored snapshot, durable ids whose rows no longer
    /// exist. Returns how many table copies were cleared.
    pub fn clear_stale_durable_ids(&mut self, live: &HashSet<DurableId>) -> usize {
        self.undo
            .iter_mut()
            .chain(self.redo.iter_mut())
            .map(|snapshot| scene::clear_stale_durable_ids(snapshot, live))
            .sum()
    }
}
