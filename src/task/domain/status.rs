//! Task lifecycle states, transitions, and the ownership they imply.

use super::{ParseTaskStatusError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Variants are declared in lifecycle order, so the derived `Ord` matches
/// the board's fixed status ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Nobody has claimed the task.
    Available,
    /// A contributor has claimed the task but not started it.
    Owned,
    /// The owner is working on the task.
    InProgress,
    /// The owner has finished the task.
    Completed,
}

impl TaskStatus {
    /// Every status in board order.
    pub const ALL: [Self; 4] = [
        Self::Available,
        Self::Owned,
        Self::InProgress,
        Self::Completed,
    ];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Owned => "owned",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
        }
    }

    /// Returns the position of this status along the lifecycle.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Available => 0,
            Self::Owned => 1,
            Self::InProgress => 2,
            Self::Completed => 3,
        }
    }

    /// Returns whether no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns the status reached by applying `transition`, if the lifecycle
    /// permits it from this status.
    #[must_use]
    pub const fn after(self, transition: TaskTransition) -> Option<Self> {
        match (self, transition) {
            (Self::Available, TaskTransition::Claim) => Some(Self::Owned),
            (Self::Owned, TaskTransition::Release) => Some(Self::Available),
            (Self::Owned, TaskTransition::Start) => Some(Self::InProgress),
            (Self::InProgress, TaskTransition::Complete) => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "owned" => Ok(Self::Owned),
            "inprogress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Ownership lifecycle operation requested by a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTransition {
    /// Take ownership of an available task.
    Claim,
    /// Give an owned task back to the pool.
    Release,
    /// Begin work on an owned task.
    Start,
    /// Finish work on an in-progress task.
    Complete,
}

impl TaskTransition {
    /// Returns the canonical name of the transition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Release => "release",
            Self::Start => "start",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for TaskTransition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Status and owner of a task as one value.
///
/// Only [`TaskAssignment::Available`] carries no owner, so a task cannot be
/// owned while available or ownerless while claimed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskAssignment {
    /// Unclaimed.
    Available,
    /// Claimed by the given user.
    Owned(UserId),
    /// Being worked on by the given user.
    InProgress(UserId),
    /// Finished by the given user.
    Completed(UserId),
}

impl TaskAssignment {
    /// Builds an assignment from a status and optional owner.
    ///
    /// Returns `None` when the owner's presence disagrees with the status.
    #[must_use]
    pub fn from_parts(status: TaskStatus, owner: Option<UserId>) -> Option<Self> {
        match (status, owner) {
            (TaskStatus::Available, None) => Some(Self::Available),
            (TaskStatus::Owned, Some(user)) => Some(Self::Owned(user)),
            (TaskStatus::InProgress, Some(user)) => Some(Self::InProgress(user)),
            (TaskStatus::Completed, Some(user)) => Some(Self::Completed(user)),
            _ => None,
        }
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        match self {
            Self::Available => TaskStatus::Available,
            Self::Owned(_) => TaskStatus::Owned,
            Self::InProgress(_) => TaskStatus::InProgress,
            Self::Completed(_) => TaskStatus::Completed,
        }
    }

    /// Returns the owning user, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        match self {
            Self::Available => None,
            Self::Owned(user) | Self::InProgress(user) | Self::Completed(user) => Some(user),
        }
    }
}
