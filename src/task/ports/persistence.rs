//! Persistence service port: the system of record for task ownership.

use crate::task::domain::{SprintId, Task, TaskId, TaskStatus, UserId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for persistence service operations.
pub type TaskPersistenceResult<T> = Result<T, TaskPersistenceError>;

/// Task persistence service contract.
///
/// Every lifecycle call returns the updated record with its new version, or
/// a conflict when the service's current record fails the precondition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskPersistence: Send + Sync {
    /// Fetches every task of the sprint, in the service's display order.
    async fn fetch_sprint_tasks(&self, sprint_id: SprintId) -> TaskPersistenceResult<Vec<Task>>;

    /// Claims an available task for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Conflict`] when the task is no longer
    /// available.
    async fn claim(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task>;

    /// Releases a task owned by `user`.
    async fn release(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task>;

    /// Starts a task owned by `user`.
    async fn start(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task>;

    /// Completes an in-progress task owned by `user`.
    async fn complete(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task>;
}

/// The service's current view of a task that rejected a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConflict {
    /// Task identifier.
    pub task_id: TaskId,
    /// Status recorded by the service.
    pub status: TaskStatus,
    /// Owner recorded by the service.
    pub owner: Option<UserId>,
}

impl TaskConflict {
    /// Describes the conflicting state of `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            status: task.status(),
            owner: task.owner().cloned(),
        }
    }
}

impl fmt::Display for TaskConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.owner, self.status) {
            (Some(owner), TaskStatus::Owned) => {
                write!(f, "task {} already claimed by {owner}", self.task_id)
            }
            (Some(owner), TaskStatus::InProgress) => {
                write!(f, "task {} is in progress with {owner}", self.task_id)
            }
            (Some(owner), TaskStatus::Completed) => {
                write!(f, "task {} was completed by {owner}", self.task_id)
            }
            (Some(owner), status) => {
                write!(f, "task {} is {status} with {owner}", self.task_id)
            }
            (None, status) => write!(f, "task {} is {status}", self.task_id),
        }
    }
}

/// Errors returned by persistence service implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskPersistenceError {
    /// The service rejected the write because its precondition no longer
    /// holds.
    #[error("conflict: {0}")]
    Conflict(TaskConflict),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The request failed in transit or the service was unavailable.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskPersistenceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
