//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus, TaskTransition, UserId};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// A persisted record carries an owner that disagrees with its status.
    #[error("task {task_id} has status {status} but owner presence is {has_owner}")]
    OwnershipMismatch {
        /// Task identifier.
        task_id: TaskId,
        /// Persisted status.
        status: TaskStatus,
        /// Whether an owner was present.
        has_owner: bool,
    },

    /// The lifecycle does not allow the transition from the current status.
    #[error("cannot {transition} task {task_id} while it is {from}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested transition.
        transition: TaskTransition,
    },

    /// The task is already claimed by another contributor.
    #[error("task {task_id} already claimed by {owner}")]
    AlreadyClaimed {
        /// Task identifier.
        task_id: TaskId,
        /// Current owner.
        owner: UserId,
    },

    /// The acting user does not own the task.
    #[error("task {task_id} is owned by {owner}, not {actor}")]
    NotOwner {
        /// Task identifier.
        task_id: TaskId,
        /// Current owner.
        owner: UserId,
        /// User who attempted the transition.
        actor: UserId,
    },
}

/// Error returned while parsing task statuses from the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
