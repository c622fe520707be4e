//! Sprint progress figures.
//!
//! Everything here is a pure function of its inputs. Callers recompute on
//! every read instead of caching, so the figures always track the current
//! task set and sprint dates.

use crate::sprint::domain::Sprint;
use crate::task::domain::{Task, TaskStatus};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Whole days left until `end`, rounded up and never negative.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use sprintboard::sprint::services::days_remaining;
///
/// let now = Utc::now();
/// assert_eq!(days_remaining(now, now + TimeDelta::hours(30)), 2);
/// assert_eq!(days_remaining(now, now - TimeDelta::days(1)), 0);
/// ```
#[must_use]
pub fn days_remaining(now: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let remaining = end.signed_duration_since(now);
    if remaining <= TimeDelta::zero() {
        return 0;
    }
    let whole_days = remaining.num_days();
    let partial_day = remaining - TimeDelta::days(whole_days) > TimeDelta::zero();
    u64::try_from(whole_days)
        .unwrap_or(0)
        .saturating_add(u64::from(partial_day))
}

/// Share of completed tasks as a whole percentage, rounded half up.
///
/// An empty task set is 0% complete.
///
/// # Examples
///
/// ```
/// use sprintboard::sprint::services::completion_percentage;
///
/// assert_eq!(completion_percentage(1, 3), 33);
/// assert_eq!(completion_percentage(2, 3), 67);
/// assert_eq!(completion_percentage(0, 0), 0);
/// ```
#[must_use]
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    let total = widen(total);
    let completed = widen(completed).min(total);
    let doubled_total = total.saturating_mul(2);
    let percent = completed
        .saturating_mul(200)
        .saturating_add(total)
        .checked_div(doubled_total)
        .unwrap_or(0);
    u8::try_from(percent).unwrap_or(100)
}

/// Human-readable completion summary, e.g. `"3 of 4 tasks"`.
#[must_use]
pub fn task_progress(completed: usize, total: usize) -> String {
    format!("{completed} of {total} tasks")
}

fn widen(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Progress figures for one sprint at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintMetrics {
    /// Days left until the sprint ends.
    pub days_remaining: u64,
    /// Length of the sprint in days.
    pub sprint_length_days: u64,
    /// Tasks in the `completed` status.
    pub completed_tasks: usize,
    /// All tasks on the board.
    pub total_tasks: usize,
    /// Completed share of tasks.
    pub completion_percentage: u8,
    /// Completion summary text.
    pub task_progress: String,
    /// Completed share of committed points.
    pub points_completion_percentage: u8,
}

impl SprintMetrics {
    /// Computes the metrics of `sprint` over `tasks` as of `now`.
    #[must_use]
    pub fn compute(sprint: &Sprint, tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total_tasks = tasks.len();
        let completed_tasks = tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Completed)
            .count();
        let committed = usize::try_from(sprint.committed_points()).unwrap_or(usize::MAX);
        let completed_points = usize::try_from(sprint.completed_points()).unwrap_or(usize::MAX);

        Self {
            days_remaining: days_remaining(now, sprint.end_date()),
            sprint_length_days: days_remaining(sprint.start_date(), sprint.end_date()),
            completed_tasks,
            total_tasks,
            completion_percentage: completion_percentage(completed_tasks, total_tasks),
            task_progress: task_progress(completed_tasks, total_tasks),
            points_completion_percentage: completion_percentage(completed_points, committed),
        }
    }
}
