//! Sprint board service: the surface the UI layer drives.
//!
//! The service owns the reconciler for one open sprint, routes lifecycle
//! intents through the ownership engine, consumes push messages, and
//! derives the board view and sprint metrics on every read.

use super::board_view::{BoardFilter, BoardView, GroupBy};
use super::metrics::SprintMetrics;
use crate::config::BoardConfig;
use crate::sprint::domain::{Sprint, Story, StoryId};
use crate::task::{
    domain::{Task, TaskId, TaskStatus, UserId},
    ports::{ChannelStatus, PushChannel, PushMessage, TaskPersistence, TaskPersistenceError},
    services::{
        MergeOutcome, OwnershipError, OwnershipService, Reconciler, SnapshotSummary,
        TransitionOutcome,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for sprint board operations.
#[derive(Debug, Clone, Error)]
pub enum SprintBoardError {
    /// A lifecycle operation failed.
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
    /// Loading tasks from the persistence service failed.
    #[error(transparent)]
    Persistence(#[from] TaskPersistenceError),
}

impl SprintBoardError {
    /// Returns whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ownership(err) => err.is_retryable(),
            Self::Persistence(TaskPersistenceError::Transport(_)) => true,
            Self::Persistence(_) => false,
        }
    }
}

/// Result type for sprint board operations.
pub type SprintBoardResult<T> = Result<T, SprintBoardError>;

/// What handling one push message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// A task change was merged.
    Merged(MergeOutcome),
    /// A change to an unknown task of a story not on this board was ignored.
    Dropped(TaskId),
    /// The channel came back and a snapshot was merged.
    Refreshed(SnapshotSummary),
    /// A status change was recorded without a refresh.
    StatusRecorded(ChannelStatus),
}

/// Parameter object for opening a sprint board.
#[derive(Debug, Clone)]
pub struct SprintBoardParams {
    /// Sprint shown on the board.
    pub sprint: Sprint,
    /// Stories of the sprint, in display order.
    pub stories: Vec<Story>,
    /// User acting through this board.
    pub actor: UserId,
    /// Runtime tuning.
    pub config: BoardConfig,
}

/// Sprint board orchestration service.
pub struct SprintBoardService<P, C>
where
    P: TaskPersistence,
    C: Clock + Send + Sync,
{
    sprint: Sprint,
    stories: Vec<Story>,
    actor: UserId,
    persistence: Arc<P>,
    reconciler: Arc<Reconciler>,
    ownership: OwnershipService<P>,
    clock: Arc<C>,
    filter: RwLock<BoardFilter>,
}

impl<P, C> SprintBoardService<P, C>
where
    P: TaskPersistence,
    C: Clock + Send + Sync,
{
    /// Opens a board over an empty store; call [`Self::load`] next.
    #[must_use]
    pub fn new(params: SprintBoardParams, persistence: Arc<P>, clock: Arc<C>) -> Self {
        let reconciler = Arc::new(Reconciler::new());
        let ownership =
            OwnershipService::new(Arc::clone(&persistence), Arc::clone(&reconciler), &params.config);
        Self {
            sprint: params.sprint,
            stories: params.stories,
            actor: params.actor,
            persistence,
            reconciler,
            ownership,
            clock,
            filter: RwLock::new(BoardFilter::default()),
        }
    }

    /// Returns the sprint shown on the board.
    #[must_use]
    pub const fn sprint(&self) -> &Sprint {
        &self.sprint
    }

    /// Returns the loaded stories.
    #[must_use]
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Returns the user acting through this board.
    #[must_use]
    pub const fn actor(&self) -> &UserId {
        &self.actor
    }

    /// Returns the reconciler holding the task records.
    #[must_use]
    pub const fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Returns the current record of a task.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<Task> {
        self.reconciler.get(task_id)
    }

    /// Loads the sprint's tasks, replacing whatever the store held.
    ///
    /// # Errors
    ///
    /// Returns [`SprintBoardError::Persistence`] when the fetch fails.
    pub async fn load(&self) -> SprintBoardResult<usize> {
        let tasks = self.persistence.fetch_sprint_tasks(self.sprint.id()).await?;
        let count = tasks.len();
        self.reconciler.replace_all(tasks);
        Ok(count)
    }

    /// Fetches a full snapshot and merges it into the store.
    ///
    /// # Errors
    ///
    /// Returns [`SprintBoardError::Persistence`] when the fetch fails; the
    /// board keeps reporting [`Self::is_reconnecting`] until a refresh
    /// succeeds.
    pub async fn refresh(&self) -> SprintBoardResult<SnapshotSummary> {
        let tasks = self.persistence.fetch_sprint_tasks(self.sprint.id()).await?;
        Ok(self.reconciler.apply_snapshot(tasks))
    }

    /// Returns whether the board is waiting for a post-reconnect snapshot.
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        self.reconciler.is_reconnecting()
    }

    /// Returns the current view settings.
    #[must_use]
    pub fn filter(&self) -> BoardFilter {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects the statuses to show and returns the new view.
    ///
    /// An empty selection shows every status.
    pub fn set_filter(&self, statuses: impl IntoIterator<Item = TaskStatus>) -> BoardView {
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .statuses = statuses.into_iter().collect();
        self.view()
    }

    /// Selects the grouping mode and returns the new view.
    pub fn set_group_by(&self, group_by: GroupBy) -> BoardView {
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .group_by = group_by;
        self.view()
    }

    /// Derives the board view from the current records.
    #[must_use]
    pub fn view(&self) -> BoardView {
        BoardView::compute(&self.reconciler.tasks(), &self.stories, &self.filter())
    }

    /// Derives the sprint metrics as of the clock's current time.
    #[must_use]
    pub fn metrics(&self) -> SprintMetrics {
        self.metrics_at(self.clock.utc())
    }

    /// Derives the sprint metrics as of `now`.
    ///
    /// Tasks whose story is not loaded are not counted.
    #[must_use]
    pub fn metrics_at(&self, now: DateTime<Utc>) -> SprintMetrics {
        let known: HashSet<StoryId> = self.stories.iter().map(Story::id).collect();
        let tasks: Vec<Task> = self
            .reconciler
            .tasks()
            .into_iter()
            .filter(|task| known.contains(&task.story_id()))
            .collect();
        SprintMetrics::compute(&self.sprint, &tasks, now)
    }

    /// Claims a task for the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`SprintBoardError::Ownership`] when the claim conflicts or
    /// the service cannot be reached.
    pub async fn claim(&self, task_id: TaskId) -> SprintBoardResult<TransitionOutcome> {
        Ok(self.ownership.claim(task_id, &self.actor).await?)
    }

    /// Releases a task the acting user owns.
    ///
    /// # Errors
    ///
    /// See [`Self::claim`].
    pub async fn release(&self, task_id: TaskId) -> SprintBoardResult<TransitionOutcome> {
        Ok(self.ownership.release(task_id, &self.actor).await?)
    }

    /// Starts a task the acting user owns.
    ///
    /// # Errors
    ///
    /// See [`Self::claim`].
    pub async fn start(&self, task_id: TaskId) -> SprintBoardResult<TransitionOutcome> {
        Ok(self.ownership.start(task_id, &self.actor).await?)
    }

    /// Completes a task the acting user is working on.
    ///
    /// # Errors
    ///
    /// See [`Self::claim`].
    pub async fn complete(&self, task_id: TaskId) -> SprintBoardResult<TransitionOutcome> {
        Ok(self.ownership.complete(task_id, &self.actor).await?)
    }

    /// Applies one push message.
    ///
    /// A `connected` signal after a disconnect triggers a snapshot refresh.
    /// The push channel carries writes from every sprint, so a change to an
    /// unknown task is only inserted when its story is loaded here.
    ///
    /// # Errors
    ///
    /// Returns [`SprintBoardError::Persistence`] when the refresh fetch
    /// fails.
    pub async fn handle_push(&self, message: PushMessage) -> SprintBoardResult<PushOutcome> {
        match message {
            PushMessage::TaskChanged(event) => {
                let task_id = event.task.id();
                if self.reconciler.get(task_id).is_none() && !self.has_story(event.task.story_id()) {
                    debug!(
                        %task_id,
                        story_id = %event.task.story_id(),
                        sprint_id = %self.sprint.id(),
                        "push for task outside this board dropped"
                    );
                    return Ok(PushOutcome::Dropped(task_id));
                }
                Ok(PushOutcome::Merged(self.reconciler.apply_remote(event.task)))
            }
            PushMessage::Status { status } => {
                if self.reconciler.set_channel_status(status) {
                    info!(sprint_id = %self.sprint.id(), "push channel reconnected, refreshing");
                    Ok(PushOutcome::Refreshed(self.refresh().await?))
                } else {
                    Ok(PushOutcome::StatusRecorded(status))
                }
            }
        }
    }

    fn has_story(&self, story_id: StoryId) -> bool {
        self.stories.iter().any(|story| story.id() == story_id)
    }

    /// Consumes push messages until the channel closes.
    ///
    /// Failures are logged and do not stop the loop. Returns the number of
    /// messages handled.
    pub async fn run_push_loop(&self, channel: &mut impl PushChannel) -> usize {
        let mut handled = 0_usize;
        while let Some(message) = channel.recv().await {
            handled += 1;
            if let Err(err) = self.handle_push(message).await {
                warn!(error = %err, retryable = err.is_retryable(), "push message not applied");
            }
        }
        handled
    }
}
