//! Shared world state for task claim BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use sprintboard::{
    config::BoardConfig,
    sprint::{
        domain::{Sprint, Story},
        services::{BoardView, SprintBoardError, SprintBoardParams, SprintBoardService},
    },
    task::{
        adapters::memory::InMemoryTaskPersistence,
        domain::{Task, TaskId, UserId},
        services::TransitionOutcome,
    },
};

/// Board service type used by the BDD world.
pub type TestBoard = SprintBoardService<InMemoryTaskPersistence, DefaultClock>;

/// Scenario world for task claim behaviour tests.
pub struct BoardWorld {
    pub persistence: Arc<InMemoryTaskPersistence>,
    pub sprint: Sprint,
    pub stories: Vec<Story>,
    pub task_ids: HashMap<String, TaskId>,
    pub boards: HashMap<String, TestBoard>,
    pub last_result: Option<Result<TransitionOutcome, SprintBoardError>>,
    pub last_view: Option<BoardView>,
}

impl BoardWorld {
    /// Creates a world with a one-week sprint and no stories.
    ///
    /// # Panics
    ///
    /// Panics if the fixed sprint fixture is invalid.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        let sprint = Sprint::new("Sprint 1", now - TimeDelta::days(7), now + TimeDelta::days(7))
            .expect("fixed sprint fixture is valid");
        Self {
            persistence: Arc::new(InMemoryTaskPersistence::new()),
            sprint,
            stories: Vec::new(),
            task_ids: HashMap::new(),
            boards: HashMap::new(),
            last_result: None,
            last_view: None,
        }
    }

    /// Returns the story titled `title`, adding it when missing.
    pub fn story(&mut self, title: &str) -> Result<Story, eyre::Report> {
        if let Some(existing) = self.stories.iter().find(|story| story.title() == title) {
            return Ok(existing.clone());
        }
        let story = Story::new(title)?;
        self.stories.push(story.clone());
        Ok(story)
    }

    /// Seeds a task in the persistence service.
    pub fn seed(&mut self, title: &str, task: Task) -> Result<(), eyre::Report> {
        self.task_ids.insert(title.to_owned(), task.id());
        self.persistence.insert(self.sprint.id(), task)?;
        Ok(())
    }

    /// Opens and loads a board for `user`.
    pub fn open_board(&mut self, user: &str) -> Result<(), eyre::Report> {
        let board = SprintBoardService::new(
            SprintBoardParams {
                sprint: self.sprint.clone(),
                stories: self.stories.clone(),
                actor: UserId::new(user)?,
                config: BoardConfig::strict(),
            },
            Arc::clone(&self.persistence),
            Arc::new(DefaultClock),
        );
        run_async(board.load())?;
        self.boards.insert(user.to_owned(), board);
        Ok(())
    }

    /// Returns the board opened by `user`.
    pub fn board(&self, user: &str) -> Result<&TestBoard, eyre::Report> {
        self.boards
            .get(user)
            .ok_or_else(|| eyre::eyre!("no board open for {user}"))
    }

    /// Returns the identifier of the task titled `title`.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.task_ids
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task {title}"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
