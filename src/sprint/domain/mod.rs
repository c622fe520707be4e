//! Domain model for sprints and the stories they contain.

mod error;
mod sprint;
mod story;

pub use crate::task::domain::{SprintId, StoryId};
pub use error::SprintDomainError;
pub use sprint::Sprint;
pub use story::Story;
