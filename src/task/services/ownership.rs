//! Ownership transition engine: claim, release, start, and complete.
//!
//! Every operation is applied optimistically through the [`Reconciler`] and
//! dispatched to the persistence service in the same call. The service's
//! answer decides the outcome; races between contributors are never settled
//! locally.

use super::reconciliation::{ConfirmOutcome, ReconcileError, Reconciler};
use crate::config::BoardConfig;
use crate::task::{
    domain::{Task, TaskId, TaskTransition, UserId},
    ports::{TaskConflict, TaskPersistence, TaskPersistenceError, TaskPersistenceResult},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced to the UI for lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum OwnershipError {
    /// The task's current state does not allow the operation.
    #[error("{0}")]
    Conflict(TaskConflict),

    /// The task is unknown to the board or the service.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// An earlier operation on the task is still waiting for the service.
    #[error("task {0} is busy with an earlier change")]
    WritePending(TaskId),

    /// The persistence service could not be reached.
    #[error("could not reach the task service: {0}")]
    Transport(#[source] TaskPersistenceError),

    /// The persistence service did not answer in time.
    #[error("task service did not answer for task {task_id} within {after:?}")]
    Timeout {
        /// Task identifier.
        task_id: TaskId,
        /// Configured wait.
        after: Duration,
    },
}

impl OwnershipError {
    /// Returns whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::WritePending(_) | Self::Transport(_) | Self::Timeout { .. }
        )
    }
}

/// Result type for ownership operations.
pub type OwnershipResult<T> = Result<T, OwnershipError>;

/// Result of a lifecycle operation the service accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Record now visible on the board.
    pub task: Task,
    /// Whether the service's answer became the stored record.
    pub confirmation: ConfirmOutcome,
}

/// Ownership transition orchestration service.
pub struct OwnershipService<P>
where
    P: TaskPersistence,
{
    persistence: Arc<P>,
    reconciler: Arc<Reconciler>,
    request_timeout: Duration,
}

impl<P> Clone for OwnershipService<P>
where
    P: TaskPersistence,
{
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
            reconciler: Arc::clone(&self.reconciler),
            request_timeout: self.request_timeout,
        }
    }
}

impl<P> OwnershipService<P>
where
    P: TaskPersistence,
{
    /// Creates a new ownership service.
    #[must_use]
    pub const fn new(persistence: Arc<P>, reconciler: Arc<Reconciler>, config: &BoardConfig) -> Self {
        Self {
            persistence,
            reconciler,
            request_timeout: config.request_timeout,
        }
    }

    /// Claims an available task for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`OwnershipError::Conflict`] when someone else holds the task,
    /// locally or according to the service, and a retryable error when the
    /// service cannot be reached. Returns [`OwnershipError::WritePending`]
    /// while an earlier operation on the task is unanswered. The optimistic
    /// change is rolled back on every error.
    pub async fn claim(&self, task_id: TaskId, actor: &UserId) -> OwnershipResult<TransitionOutcome> {
        self.transition(task_id, TaskTransition::Claim, actor).await
    }

    /// Releases a task owned by `actor`.
    ///
    /// # Errors
    ///
    /// See [`OwnershipService::claim`].
    pub async fn release(
        &self,
        task_id: TaskId,
        actor: &UserId,
    ) -> OwnershipResult<TransitionOutcome> {
        self.transition(task_id, TaskTransition::Release, actor).await
    }

    /// Starts work on a task owned by `actor`.
    ///
    /// # Errors
    ///
    /// See [`OwnershipService::claim`].
    pub async fn start(&self, task_id: TaskId, actor: &UserId) -> OwnershipResult<TransitionOutcome> {
        self.transition(task_id, TaskTransition::Start, actor).await
    }

    /// Completes an in-progress task owned by `actor`.
    ///
    /// # Errors
    ///
    /// See [`OwnershipService::claim`].
    pub async fn complete(
        &self,
        task_id: TaskId,
        actor: &UserId,
    ) -> OwnershipResult<TransitionOutcome> {
        self.transition(task_id, TaskTransition::Complete, actor).await
    }

    /// Applies `transition` optimistically and reconciles the service's
    /// answer.
    ///
    /// # Errors
    ///
    /// See [`OwnershipService::claim`].
    pub async fn transition(
        &self,
        task_id: TaskId,
        transition: TaskTransition,
        actor: &UserId,
    ) -> OwnershipResult<TransitionOutcome> {
        let (write_id, _optimistic) = self
            .reconciler
            .begin(task_id, transition, actor)
            .map_err(|err| match err {
                ReconcileError::UnknownTask(id) => OwnershipError::NotFound(id),
                ReconcileError::WritePending(id) => OwnershipError::WritePending(id),
                ReconcileError::Precondition { error, current } => {
                    warn!(%task_id, %transition, %actor, %error, "transition rejected locally");
                    OwnershipError::Conflict(TaskConflict::from_task(&current))
                }
            })?;

        let answer = tokio::time::timeout(
            self.request_timeout,
            self.dispatch(task_id, transition, actor),
        )
        .await;

        let failure = match answer {
            Ok(Ok(server_task)) => {
                let confirmation = self.reconciler.confirm(write_id, server_task.clone());
                let task = self.reconciler.get(task_id).unwrap_or(server_task);
                info!(
                    %task_id,
                    %transition,
                    %actor,
                    status = %task.status(),
                    ?confirmation,
                    "transition confirmed"
                );
                return Ok(TransitionOutcome { task, confirmation });
            }
            Ok(Err(TaskPersistenceError::Conflict(conflict))) => {
                warn!(%task_id, %transition, %actor, %conflict, "transition refused by service");
                OwnershipError::Conflict(conflict)
            }
            Ok(Err(TaskPersistenceError::NotFound(id))) => OwnershipError::NotFound(id),
            Ok(Err(err @ TaskPersistenceError::Transport(_))) => {
                warn!(%task_id, %transition, error = %err, "transition failed in transit");
                OwnershipError::Transport(err)
            }
            Err(_elapsed) => {
                warn!(%task_id, %transition, timeout = ?self.request_timeout, "transition timed out");
                OwnershipError::Timeout {
                    task_id,
                    after: self.request_timeout,
                }
            }
        };

        let rollback = self.reconciler.rollback(task_id, write_id);
        info!(%task_id, %transition, ?rollback, "optimistic write reverted");
        Err(failure)
    }

    async fn dispatch(
        &self,
        task_id: TaskId,
        transition: TaskTransition,
        actor: &UserId,
    ) -> TaskPersistenceResult<Task> {
        match transition {
            TaskTransition::Claim => self.persistence.claim(task_id, actor).await,
            TaskTransition::Release => self.persistence.release(task_id, actor).await,
            TaskTransition::Start => self.persistence.start(task_id, actor).await,
            TaskTransition::Complete => self.persistence.complete(task_id, actor).await,
        }
    }
}
