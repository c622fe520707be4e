//! In-memory cache of the open sprint's task records.

use crate::task::domain::{Task, TaskId};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifies one optimistic write awaiting the service's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingWriteId(u64);

impl PendingWriteId {
    pub(super) const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PendingWriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write-{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    id: PendingWriteId,
    optimistic: Task,
}

#[derive(Debug, Clone)]
struct StoreEntry {
    confirmed: Task,
    pending: Option<PendingWrite>,
}

impl StoreEntry {
    fn visible(&self) -> &Task {
        self.pending
            .as_ref()
            .map_or(&self.confirmed, |pending| &pending.optimistic)
    }
}

/// Task records keyed by task id, in the persistence service's listing
/// order.
///
/// Each entry holds the last server-confirmed record and at most one
/// optimistic record layered over it. Readers see the optimistic record
/// while it is pending. Only the reconciliation layer mutates the store.
#[derive(Debug, Clone, Default)]
pub struct TaskRecordStore {
    entries: HashMap<TaskId, StoreEntry>,
    order: Vec<TaskId>,
}

impl TaskRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of task records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the visible record for a task.
    #[must_use]
    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.entries.get(&task_id).map(StoreEntry::visible)
    }

    /// Returns the last server-confirmed record for a task.
    #[must_use]
    pub fn confirmed(&self, task_id: TaskId) -> Option<&Task> {
        self.entries.get(&task_id).map(|entry| &entry.confirmed)
    }

    /// Returns the pending write for a task, if any.
    #[must_use]
    pub fn pending_write(&self, task_id: TaskId) -> Option<PendingWriteId> {
        self.entries
            .get(&task_id)
            .and_then(|entry| entry.pending.as_ref())
            .map(|pending| pending.id)
    }

    /// Returns the visible records in listing order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.visible().clone())
            .collect()
    }

    /// Stores a confirmed record, keeping any pending write.
    pub(super) fn put_confirmed(&mut self, task: Task) {
        let task_id = task.id();
        if let Some(entry) = self.entries.get_mut(&task_id) {
            entry.confirmed = task;
            return;
        }
        self.order.push(task_id);
        self.entries.insert(
            task_id,
            StoreEntry {
                confirmed: task,
                pending: None,
            },
        );
    }

    /// Layers an optimistic record over an existing entry.
    ///
    /// Returns `false` when the task is unknown.
    pub(super) fn put_pending(&mut self, id: PendingWriteId, optimistic: Task) -> bool {
        let Some(entry) = self.entries.get_mut(&optimistic.id()) else {
            return false;
        };
        entry.pending = Some(PendingWrite { id, optimistic });
        true
    }

    /// Drops the pending write for a task if it is `id`.
    ///
    /// Returns whether a write was dropped.
    pub(super) fn clear_pending_if(&mut self, task_id: TaskId, id: PendingWriteId) -> bool {
        let Some(entry) = self.entries.get_mut(&task_id) else {
            return false;
        };
        if entry.pending.as_ref().is_some_and(|pending| pending.id == id) {
            entry.pending = None;
            return true;
        }
        false
    }

    /// Drops whatever write is pending for a task.
    ///
    /// Returns whether a write was dropped.
    pub(super) fn clear_pending(&mut self, task_id: TaskId) -> bool {
        self.entries
            .get_mut(&task_id)
            .and_then(|entry| entry.pending.take())
            .is_some()
    }

    /// Removes every record whose id is not in `keep`, then orders the
    /// remaining records like `keep`.
    ///
    /// Returns the number of evicted records.
    pub(super) fn retain_in_order(&mut self, keep: &[TaskId]) -> usize {
        let before = self.entries.len();
        let wanted: HashSet<TaskId> = keep.iter().copied().collect();
        self.entries.retain(|id, _| wanted.contains(id));
        let mut seen = HashSet::with_capacity(keep.len());
        self.order = keep
            .iter()
            .copied()
            .filter(|id| self.entries.contains_key(id) && seen.insert(*id))
            .collect();
        before.saturating_sub(self.entries.len())
    }

    /// Removes every record.
    pub(super) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
