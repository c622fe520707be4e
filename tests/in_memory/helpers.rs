//! Shared test helpers for in-memory persistence integration tests.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use sprintboard::{
    config::BoardConfig,
    sprint::{
        domain::{Sprint, Story},
        services::{SprintBoardParams, SprintBoardService},
    },
    task::{
        adapters::memory::InMemoryTaskPersistence,
        domain::{Task, TaskId, UserId},
    },
};

/// Board service type used by the integration tests.
pub type TestBoard = SprintBoardService<InMemoryTaskPersistence, DefaultClock>;

/// A sprint with one story and its tasks seeded in a shared service.
pub struct SharedSprint {
    pub persistence: Arc<InMemoryTaskPersistence>,
    pub sprint: Sprint,
    pub stories: Vec<Story>,
    pub task_ids: Vec<TaskId>,
}

impl SharedSprint {
    /// Opens a board for `user` without loading it.
    ///
    /// # Errors
    ///
    /// Returns an error if `user` is blank.
    pub fn board(&self, user: &str) -> Result<TestBoard, eyre::Report> {
        Ok(SprintBoardService::new(
            SprintBoardParams {
                sprint: self.sprint.clone(),
                stories: self.stories.clone(),
                actor: UserId::new(user)?,
                config: BoardConfig::strict(),
            },
            Arc::clone(&self.persistence),
            Arc::new(DefaultClock),
        ))
    }

    /// Returns the identifier of the `index`th seeded task.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer tasks were seeded.
    pub fn task_id(&self, index: usize) -> Result<TaskId, eyre::Report> {
        self.task_ids
            .get(index)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task at index {index}"))
    }
}

/// Seeds a one-week sprint with one story holding three available tasks.
///
/// # Errors
///
/// Returns an error if a fixture record is invalid.
pub fn seed_sprint() -> Result<SharedSprint, eyre::Report> {
    let now = Utc::now();
    let sprint = Sprint::new("Sprint 4", now - TimeDelta::days(2), now + TimeDelta::days(5))?;
    let story = Story::new("Checkout")?;
    let persistence = Arc::new(InMemoryTaskPersistence::new());
    let mut task_ids = Vec::new();
    for title in ["Cart summary", "Payment form", "Receipt email"] {
        let task = Task::new(story.id(), title)?;
        task_ids.push(task.id());
        persistence.insert(sprint.id(), task)?;
    }
    Ok(SharedSprint {
        persistence,
        sprint,
        stories: vec![story],
        task_ids,
    })
}

/// Provides a freshly seeded sprint for each test.
#[fixture]
pub fn shared() -> Result<SharedSprint, eyre::Report> {
    seed_sprint()
}
