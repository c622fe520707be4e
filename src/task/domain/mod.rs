//! Domain model for task ownership.
//!
//! The task domain models the ownership lifecycle (claim, release, start,
//! complete) and the versioned task record while keeping all infrastructure
//! concerns outside of the domain boundary.

mod error;
mod ids;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{SprintId, StoryId, TaskId, UserId};
pub use status::{TaskAssignment, TaskStatus, TaskTransition};
pub use task::{PersistedTaskData, Task, TaskVersion};
