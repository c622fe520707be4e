//! Filtered, grouped, and counted view of the sprint's tasks.

use crate::sprint::domain::{Story, StoryId};
use crate::task::domain::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How the board groups visible tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One group per story, in story order.
    #[default]
    Story,
    /// One group per status, in lifecycle order.
    Status,
}

/// User-selected view settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilter {
    /// Statuses to show; empty shows every status.
    pub statuses: BTreeSet<TaskStatus>,
    /// Grouping mode.
    pub group_by: GroupBy,
}

impl BoardFilter {
    /// Creates a filter that shows everything grouped by story.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selected statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Sets the grouping mode.
    #[must_use]
    pub const fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Returns whether tasks in `status` are shown.
    #[must_use]
    pub fn shows(&self, status: TaskStatus) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&status)
    }
}

/// What a group of tasks is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    /// Tasks of one story.
    Story {
        /// Story identifier.
        story_id: StoryId,
        /// Story title.
        title: String,
    },
    /// Tasks in one status.
    Status {
        /// Shared status.
        status: TaskStatus,
    },
}

/// One group of visible tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGroup {
    /// Group key.
    pub key: GroupKey,
    /// Visible tasks in listing order.
    pub tasks: Vec<Task>,
}

impl TaskGroup {
    /// Returns the number of visible tasks in the group.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the count label, e.g. `"1 task"` or `"3 tasks"`.
    #[must_use]
    pub fn label(&self) -> String {
        task_count_label(self.count())
    }
}

/// Formats a task count with the right plural.
#[must_use]
pub fn task_count_label(count: usize) -> String {
    if count == 1 {
        "1 task".to_owned()
    } else {
        format!("{count} tasks")
    }
}

/// Tasks per status across the whole sprint, regardless of filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Unclaimed tasks.
    pub available: usize,
    /// Claimed, not started tasks.
    pub owned: usize,
    /// Tasks being worked on.
    pub in_progress: usize,
    /// Finished tasks.
    pub completed: usize,
}

impl StatusCounts {
    /// Counts `tasks` by status.
    #[must_use]
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            let slot = match task.status() {
                TaskStatus::Available => &mut counts.available,
                TaskStatus::Owned => &mut counts.owned,
                TaskStatus::InProgress => &mut counts.in_progress,
                TaskStatus::Completed => &mut counts.completed,
            };
            *slot += 1;
            counts
        })
    }

    /// Returns the count for one status.
    #[must_use]
    pub const fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Available => self.available,
            TaskStatus::Owned => self.owned,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    /// Returns the number of counted tasks.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.available + self.owned + self.in_progress + self.completed
    }
}

/// Whether the board has anything to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardContents {
    /// The sprint has no tasks at all.
    NoTasks,
    /// Tasks exist but the filter hides all of them.
    NoMatches,
    /// At least one task is visible.
    Tasks,
}

/// Derived read model of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Tasks passing the filter, in listing order.
    pub visible_tasks: Vec<Task>,
    /// Visible tasks grouped per the filter's grouping mode.
    pub groups: Vec<TaskGroup>,
    /// Per-status totals over the unfiltered task set.
    pub status_totals: StatusCounts,
    /// Empty-result signal.
    pub contents: BoardContents,
    /// Tasks left out because their story is not loaded.
    pub orphaned_tasks: usize,
}

impl BoardView {
    /// Derives the board from the current tasks, the loaded stories, and the
    /// view settings.
    ///
    /// Tasks whose story is not among `stories` are left out of every list
    /// and count.
    #[must_use]
    pub fn compute(tasks: &[Task], stories: &[Story], filter: &BoardFilter) -> Self {
        let known: HashSet<StoryId> = stories.iter().map(Story::id).collect();
        let on_board: Vec<&Task> = tasks
            .iter()
            .filter(|task| known.contains(&task.story_id()))
            .collect();
        let orphaned_tasks = tasks.len() - on_board.len();
        let status_totals = StatusCounts::tally(on_board.iter().copied());

        let visible_tasks: Vec<Task> = on_board
            .into_iter()
            .filter(|task| filter.shows(task.status()))
            .cloned()
            .collect();

        let groups = match filter.group_by {
            GroupBy::Story => group_by_story(&visible_tasks, stories),
            GroupBy::Status => group_by_status(&visible_tasks),
        };

        let contents = if status_totals.total() == 0 {
            BoardContents::NoTasks
        } else if visible_tasks.is_empty() {
            BoardContents::NoMatches
        } else {
            BoardContents::Tasks
        };

        Self {
            visible_tasks,
            groups,
            status_totals,
            contents,
            orphaned_tasks,
        }
    }

    /// Returns the number of visible tasks.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible_tasks.len()
    }
}

fn group_by_story(visible: &[Task], stories: &[Story]) -> Vec<TaskGroup> {
    let mut seen = HashSet::with_capacity(stories.len());
    stories
        .iter()
        .filter(|story| seen.insert(story.id()))
        .map(|story| TaskGroup {
            key: GroupKey::Story {
                story_id: story.id(),
                title: story.title().to_owned(),
            },
            tasks: visible
                .iter()
                .filter(|task| task.story_id() == story.id())
                .cloned()
                .collect(),
        })
        .filter(|group| !group.tasks.is_empty())
        .collect()
}

fn group_by_status(visible: &[Task]) -> Vec<TaskGroup> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| TaskGroup {
            key: GroupKey::Status { status },
            tasks: visible
                .iter()
                .filter(|task| task.status() == status)
                .cloned()
                .collect(),
        })
        .filter(|group| !group.tasks.is_empty())
        .collect()
}
