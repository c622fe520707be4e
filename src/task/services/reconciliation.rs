//! Reconciliation layer: the single writer of the task record store.
//!
//! Three sources feed the store: optimistic local writes, the persistence
//! service's answers to those writes, and push events describing changes by
//! any contributor. Records are ordered per task by [`TaskVersion`]; the
//! store only ever moves to a strictly newer confirmed version, so delivery
//! order never regresses it.

use super::store::{PendingWriteId, TaskRecordStore};
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskTransition, TaskVersion, UserId},
    ports::ChannelStatus,
};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Outcome of merging a remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The task was unknown and has been added.
    Inserted,
    /// The record was newer and replaced the confirmed record.
    Applied {
        /// Whether a pending optimistic write was discarded.
        superseded_pending: bool,
    },
    /// The record was not newer than the stored one.
    Ignored,
}

/// Outcome of the service confirming an optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The service's record is now the confirmed record.
    Applied,
    /// A newer record already arrived; the response was discarded.
    Stale,
}

/// Outcome of rolling back an optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// The task reverted to its last confirmed record.
    RolledBack,
    /// The write had already been superseded by a newer record.
    AlreadySuperseded,
}

/// Counts from merging a full snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Tasks added to the store.
    pub inserted: usize,
    /// Tasks whose confirmed record was replaced.
    pub applied: usize,
    /// Rows no newer than the stored record.
    pub ignored: usize,
    /// Pending writes discarded because the snapshot superseded them.
    pub superseded_pending: usize,
    /// Tasks dropped because the snapshot no longer lists them.
    pub evicted: usize,
}

/// Errors returned when an optimistic write cannot begin.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// The store holds no record for the task.
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),

    /// An earlier optimistic write on the task has not settled yet.
    #[error("task {0} already has a write in flight")]
    WritePending(TaskId),

    /// The visible record fails the transition's precondition.
    #[error("{error}")]
    Precondition {
        /// Domain rejection.
        error: TaskDomainError,
        /// Record the precondition was checked against.
        current: Box<Task>,
    },
}

#[derive(Debug)]
struct ReconcilerState {
    store: TaskRecordStore,
    next_write: u64,
    channel: ChannelStatus,
    refresh_due: bool,
}

/// Funnel through which every change reaches the task record store.
#[derive(Debug)]
pub struct Reconciler {
    state: RwLock<ReconcilerState>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Creates a reconciler over an empty store with a connected channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ReconcilerState {
                store: TaskRecordStore::new(),
                next_write: 0,
                channel: ChannelStatus::Connected,
                refresh_due: false,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ReconcilerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ReconcilerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current store.
    #[must_use]
    pub fn store(&self) -> TaskRecordStore {
        self.read().store.clone()
    }

    /// Returns the visible records in listing order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.read().store.tasks()
    }

    /// Returns the visible record for a task.
    #[must_use]
    pub fn get(&self, task_id: TaskId) -> Option<Task> {
        self.read().store.get(task_id).cloned()
    }

    /// Returns the last confirmed record for a task.
    #[must_use]
    pub fn confirmed(&self, task_id: TaskId) -> Option<Task> {
        self.read().store.confirmed(task_id).cloned()
    }

    /// Returns whether an optimistic write is pending for a task.
    #[must_use]
    pub fn has_pending(&self, task_id: TaskId) -> bool {
        self.read().store.pending_write(task_id).is_some()
    }

    /// Replaces the whole store with a freshly loaded task list.
    pub fn replace_all(&self, tasks: Vec<Task>) {
        let mut state = self.write();
        state.store.clear();
        let count = tasks.len();
        for task in tasks {
            merge_remote(&mut state.store, task);
        }
        state.refresh_due = false;
        info!(tasks = count, "task store loaded");
    }

    /// Merges a record from a push event.
    ///
    /// The record replaces the confirmed record only when its version is
    /// strictly newer; a newer record also discards any pending write.
    pub fn apply_remote(&self, task: Task) -> MergeOutcome {
        let task_id = task.id();
        let version = task.version();
        let outcome = merge_remote(&mut self.write().store, task);
        debug!(%task_id, %version, ?outcome, "merged remote task record");
        outcome
    }

    /// Starts an optimistic write by applying `transition` to the visible
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownTask`] when the task is not stored,
    /// [`ReconcileError::WritePending`] while an earlier write on the task
    /// awaits its answer, and [`ReconcileError::Precondition`] when the
    /// transition is not allowed from the visible record.
    pub fn begin(
        &self,
        task_id: TaskId,
        transition: TaskTransition,
        actor: &UserId,
    ) -> Result<(PendingWriteId, Task), ReconcileError> {
        let mut state = self.write();
        let current = state
            .store
            .get(task_id)
            .cloned()
            .ok_or(ReconcileError::UnknownTask(task_id))?;
        if let Some(pending) = state.store.pending_write(task_id) {
            debug!(%task_id, %pending, %transition, "write refused, earlier write in flight");
            return Err(ReconcileError::WritePending(task_id));
        }
        let optimistic =
            current
                .transitioned(transition, actor)
                .map_err(|error| ReconcileError::Precondition {
                    error,
                    current: Box::new(current.clone()),
                })?;

        state.next_write = state.next_write.saturating_add(1);
        let write_id = PendingWriteId::new(state.next_write);
        if !state.store.put_pending(write_id, optimistic.clone()) {
            return Err(ReconcileError::UnknownTask(task_id));
        }
        debug!(%task_id, %write_id, %transition, "optimistic write pending");
        Ok((write_id, optimistic))
    }

    /// Applies the service's answer to an optimistic write.
    ///
    /// The answer replaces the optimistic record unless a strictly newer
    /// record arrived meanwhile, in which case it is discarded as stale.
    pub fn confirm(&self, write_id: PendingWriteId, server_task: Task) -> ConfirmOutcome {
        let task_id = server_task.id();
        let version = server_task.version();
        let mut state = self.write();
        let cleared = state.store.clear_pending_if(task_id, write_id);
        let Some(confirmed_version) = state.store.confirmed(task_id).map(Task::version) else {
            debug!(%task_id, %write_id, "confirmation for evicted task discarded");
            return ConfirmOutcome::Stale;
        };
        if version < confirmed_version {
            debug!(
                %task_id,
                %write_id,
                %version,
                %confirmed_version,
                cleared,
                "stale confirmation discarded"
            );
            return ConfirmOutcome::Stale;
        }
        state.store.put_confirmed(server_task);
        debug!(%task_id, %write_id, %version, "optimistic write confirmed");
        ConfirmOutcome::Applied
    }

    /// Rolls back an optimistic write the service refused or never answered.
    ///
    /// The task reverts to its last confirmed record, which already reflects
    /// any push event merged while the write was pending.
    pub fn rollback(&self, task_id: TaskId, write_id: PendingWriteId) -> RollbackOutcome {
        if self.write().store.clear_pending_if(task_id, write_id) {
            debug!(%task_id, %write_id, "optimistic write rolled back");
            RollbackOutcome::RolledBack
        } else {
            RollbackOutcome::AlreadySuperseded
        }
    }

    /// Merges a full sprint snapshot after a reconnect.
    ///
    /// Each row merges like a push event. Tasks the snapshot no longer lists
    /// were deleted elsewhere and are evicted; the snapshot's order becomes
    /// the listing order.
    pub fn apply_snapshot(&self, tasks: Vec<Task>) -> SnapshotSummary {
        let mut summary = SnapshotSummary::default();
        let listed: Vec<TaskId> = tasks.iter().map(Task::id).collect();
        let mut state = self.write();
        for task in tasks {
            match merge_remote(&mut state.store, task) {
                MergeOutcome::Inserted => summary.inserted += 1,
                MergeOutcome::Applied { superseded_pending } => {
                    summary.applied += 1;
                    if superseded_pending {
                        summary.superseded_pending += 1;
                    }
                }
                MergeOutcome::Ignored => summary.ignored += 1,
            }
        }
        summary.evicted = state.store.retain_in_order(&listed);
        state.refresh_due = false;
        info!(
            inserted = summary.inserted,
            applied = summary.applied,
            ignored = summary.ignored,
            superseded_pending = summary.superseded_pending,
            evicted = summary.evicted,
            "snapshot merged"
        );
        summary
    }

    /// Records a push channel status change.
    ///
    /// Returns `true` when the channel came back after a disconnect and a
    /// snapshot refresh is due.
    pub fn set_channel_status(&self, status: ChannelStatus) -> bool {
        let mut state = self.write();
        let previous = state.channel;
        state.channel = status;
        if status == ChannelStatus::Disconnected {
            state.refresh_due = true;
        }
        if previous != status {
            info!(?previous, current = ?status, "push channel status changed");
        }
        status == ChannelStatus::Connected && state.refresh_due
    }

    /// Returns the last reported channel status.
    #[must_use]
    pub fn channel_status(&self) -> ChannelStatus {
        self.read().channel
    }

    /// Returns whether live events cannot be trusted until a snapshot lands.
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        let state = self.read();
        state.channel == ChannelStatus::Disconnected || state.refresh_due
    }
}

fn merge_remote(store: &mut TaskRecordStore, task: Task) -> MergeOutcome {
    let task_id = task.id();
    let Some(stored) = store.confirmed(task_id).map(Task::version) else {
        store.put_confirmed(task);
        return MergeOutcome::Inserted;
    };
    if !is_newer(task.version(), stored) {
        return MergeOutcome::Ignored;
    }
    store.put_confirmed(task);
    let superseded_pending = store.clear_pending(task_id);
    MergeOutcome::Applied { superseded_pending }
}

const fn is_newer(incoming: TaskVersion, stored: TaskVersion) -> bool {
    incoming.value() > stored.value()
}
