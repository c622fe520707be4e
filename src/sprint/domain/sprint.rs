//! Sprint: the time box the board covers.

use super::{SprintDomainError, SprintId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time-boxed container for committed stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    id: SprintId,
    name: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    capacity_points: u32,
    committed_points: u32,
    completed_points: u32,
}

impl Sprint {
    /// Creates a sprint with no points recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SprintDomainError::EmptySprintName`] for a blank name and
    /// [`SprintDomainError::InvalidDateRange`] when `end_date` precedes
    /// `start_date`.
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, SprintDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SprintDomainError::EmptySprintName);
        }
        if end_date < start_date {
            return Err(SprintDomainError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: SprintId::new(),
            name: trimmed.to_owned(),
            start_date,
            end_date,
            capacity_points: 0,
            committed_points: 0,
            completed_points: 0,
        })
    }

    /// Sets the sprint identifier assigned by the persistence service.
    #[must_use]
    pub const fn with_id(mut self, id: SprintId) -> Self {
        self.id = id;
        self
    }

    /// Sets the point totals.
    #[must_use]
    pub const fn with_points(mut self, capacity: u32, committed: u32, completed: u32) -> Self {
        self.capacity_points = capacity;
        self.committed_points = committed;
        self.completed_points = completed;
        self
    }

    /// Returns the sprint identifier.
    #[must_use]
    pub const fn id(&self) -> SprintId {
        self.id
    }

    /// Returns the sprint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the start date.
    #[must_use]
    pub const fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Returns the end date.
    #[must_use]
    pub const fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Returns the team's capacity in points.
    #[must_use]
    pub const fn capacity_points(&self) -> u32 {
        self.capacity_points
    }

    /// Returns the committed points.
    #[must_use]
    pub const fn committed_points(&self) -> u32 {
        self.committed_points
    }

    /// Returns the completed points.
    #[must_use]
    pub const fn completed_points(&self) -> u32 {
        self.completed_points
    }
}
