//! Story: the grouping container for tasks.

use super::{SprintDomainError, StoryId};
use serde::{Deserialize, Serialize};

/// Story loaded with the sprint.
///
/// The board only reads stories; their status is an opaque label owned by
/// the story workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    id: StoryId,
    title: String,
    status: String,
}

impl Story {
    /// Creates a story with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SprintDomainError::EmptyStoryTitle`] when the title is
    /// blank.
    pub fn new(title: impl Into<String>) -> Result<Self, SprintDomainError> {
        Self::from_parts(StoryId::new(), title, "")
    }

    /// Reconstructs a story loaded from the persistence service.
    ///
    /// # Errors
    ///
    /// Returns [`SprintDomainError::EmptyStoryTitle`] when the title is
    /// blank.
    pub fn from_parts(
        id: StoryId,
        title: impl Into<String>,
        status: impl Into<String>,
    ) -> Result<Self, SprintDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SprintDomainError::EmptyStoryTitle);
        }
        Ok(Self {
            id,
            title: trimmed.to_owned(),
            status: status.into(),
        })
    }

    /// Returns the story identifier.
    #[must_use]
    pub const fn id(&self) -> StoryId {
        self.id
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the story workflow status label.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }
}
