//! Error types for sprint domain validation.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing sprint domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SprintDomainError {
    /// The sprint name is empty after trimming.
    #[error("sprint name must not be empty")]
    EmptySprintName,

    /// The story title is empty after trimming.
    #[error("story title must not be empty")]
    EmptyStoryTitle,

    /// The sprint ends before it starts.
    #[error("sprint ends at {end} before it starts at {start}")]
    InvalidDateRange {
        /// Start date.
        start: DateTime<Utc>,
        /// End date.
        end: DateTime<Utc>,
    },
}
