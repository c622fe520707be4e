//! In-memory persistence service for task ownership tests.
//!
//! Behaves like the system of record: it checks lifecycle preconditions
//! against its own records, assigns versions, and echoes every accepted
//! write to push subscribers. Failures and latency can be injected.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::Duration;
use tracing::warn;

use crate::config::BoardConfig;
use crate::task::{
    adapters::queue::{PushPublisher, QueuePushChannel, push_queue},
    domain::{SprintId, Task, TaskDomainError, TaskId, TaskTransition, UserId},
    ports::{
        ChannelStatus, PushMessage, TaskChangeEvent, TaskConflict, TaskPersistence,
        TaskPersistenceError, TaskPersistenceResult,
    },
};

/// Thread-safe in-memory persistence service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskPersistence {
    state: Arc<RwLock<InMemoryPersistenceState>>,
}

#[derive(Debug, Default)]
struct InMemoryPersistenceState {
    tasks: HashMap<TaskId, Task>,
    sprint_index: HashMap<SprintId, Vec<TaskId>>,
    subscribers: Vec<PushPublisher>,
    failures_remaining: usize,
    latency: Option<Duration>,
}

impl InMemoryTaskPersistence {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> TaskPersistenceResult<RwLockWriteGuard<'_, InMemoryPersistenceState>> {
        self.state
            .write()
            .map_err(|err| TaskPersistenceError::transport(std::io::Error::other(err.to_string())))
    }

    /// Adds a task to a sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn insert(&self, sprint_id: SprintId, task: Task) -> TaskPersistenceResult<()> {
        let mut state = self.lock()?;
        let task_id = task.id();
        if state.tasks.insert(task_id, task).is_none() {
            state.sprint_index.entry(sprint_id).or_default().push(task_id);
        }
        Ok(())
    }

    /// Deletes a task, as an administrator elsewhere would.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::NotFound`] when the task is unknown.
    pub fn delete(&self, task_id: TaskId) -> TaskPersistenceResult<Task> {
        let mut state = self.lock()?;
        let removed = state
            .tasks
            .remove(&task_id)
            .ok_or(TaskPersistenceError::NotFound(task_id))?;
        for ids in state.sprint_index.values_mut() {
            ids.retain(|id| *id != task_id);
        }
        Ok(removed)
    }

    /// Returns the service's current record for a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn get(&self, task_id: TaskId) -> TaskPersistenceResult<Option<Task>> {
        Ok(self.lock()?.tasks.get(&task_id).cloned())
    }

    /// Opens a push channel that receives every accepted write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn subscribe(&self, config: &BoardConfig) -> TaskPersistenceResult<QueuePushChannel> {
        let (publisher, channel) = push_queue(config);
        self.lock()?.subscribers.push(publisher);
        Ok(channel)
    }

    /// Sends a connection status signal to every subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn broadcast_status(&self, status: ChannelStatus) -> TaskPersistenceResult<()> {
        let mut state = self.lock()?;
        broadcast(&mut state, &PushMessage::Status { status });
        Ok(())
    }

    /// Makes the next `count` calls fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn fail_next(&self, count: usize) -> TaskPersistenceResult<()> {
        self.lock()?.failures_remaining = count;
        Ok(())
    }

    /// Delays every lifecycle answer by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPersistenceError::Transport`] when the store lock is
    /// poisoned.
    pub fn set_latency(&self, latency: Option<Duration>) -> TaskPersistenceResult<()> {
        self.lock()?.latency = latency;
        Ok(())
    }

    async fn delay(&self) -> TaskPersistenceResult<()> {
        let latency = self.lock()?.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }

    async fn apply(
        &self,
        task_id: TaskId,
        transition: TaskTransition,
        actor: &UserId,
    ) -> TaskPersistenceResult<Task> {
        self.delay().await?;
        let mut state = self.lock()?;
        take_injected_failure(&mut state)?;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or(TaskPersistenceError::NotFound(task_id))?;
        task.apply(transition, actor).map_err(|err| conflict(task, &err))?;
        task.advance_version();
        let updated = task.clone();

        broadcast(
            &mut state,
            &PushMessage::TaskChanged(TaskChangeEvent::new(updated.clone())),
        );
        Ok(updated)
    }
}

fn take_injected_failure(state: &mut InMemoryPersistenceState) -> TaskPersistenceResult<()> {
    if state.failures_remaining == 0 {
        return Ok(());
    }
    state.failures_remaining -= 1;
    Err(TaskPersistenceError::transport(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "injected transport failure",
    )))
}

fn conflict(task: &Task, err: &TaskDomainError) -> TaskPersistenceError {
    let conflict = TaskConflict::from_task(task);
    warn!(task_id = %task.id(), error = %err, "write refused by system of record");
    TaskPersistenceError::Conflict(conflict)
}

fn broadcast(state: &mut InMemoryPersistenceState, message: &PushMessage) {
    state.subscribers.retain(|subscriber| !subscriber.is_closed());
    for subscriber in &state.subscribers {
        if !subscriber.try_publish(message.clone()) {
            warn!("push subscriber queue full, message dropped");
        }
    }
}

#[async_trait]
impl TaskPersistence for InMemoryTaskPersistence {
    async fn fetch_sprint_tasks(&self, sprint_id: SprintId) -> TaskPersistenceResult<Vec<Task>> {
        let mut state = self.lock()?;
        take_injected_failure(&mut state)?;
        let tasks = state
            .sprint_index
            .get(&sprint_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tasks)
    }

    async fn claim(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task> {
        self.apply(task_id, TaskTransition::Claim, user).await
    }

    async fn release(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task> {
        self.apply(task_id, TaskTransition::Release, user).await
    }

    async fn start(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task> {
        self.apply(task_id, TaskTransition::Start, user).await
    }

    async fn complete(&self, task_id: TaskId, user: &UserId) -> TaskPersistenceResult<Task> {
        self.apply(task_id, TaskTransition::Complete, user).await
    }
}
