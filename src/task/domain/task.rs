//! Task aggregate root and the persisted record it travels as.

use super::{StoryId, TaskAssignment, TaskDomainError, TaskId, TaskStatus, TaskTransition, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Server-assigned per-task version counter.
///
/// Every accepted write increments the counter, so a larger version is
/// always the causally later record for the same task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskVersion(u64);

impl TaskVersion {
    /// Version of a freshly created task.
    pub const INITIAL: Self = Self(1);

    /// Wraps a raw version number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the version following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for TaskVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedTaskData", into = "PersistedTaskData")]
pub struct Task {
    id: TaskId,
    story_id: StoryId,
    title: String,
    description: Option<String>,
    assignment: TaskAssignment,
    acceptance_criteria_refs: BTreeSet<String>,
    version: TaskVersion,
}

/// Flat record form used by the persistence service and push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTaskData {
    /// Task identifier.
    pub id: TaskId,
    /// Owning story identifier.
    pub story_id: StoryId,
    /// Display title.
    pub title: String,
    /// Display description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Owning user, present iff the status is not `available`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<UserId>,
    /// Acceptance criterion identifiers.
    #[serde(default)]
    pub acceptance_criteria_refs: BTreeSet<String>,
    /// Server-assigned version.
    pub version: TaskVersion,
}

impl Task {
    /// Creates a new, unclaimed task for a story.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(story_id: StoryId, title: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskTitle);
        }
        Ok(Self {
            id: TaskId::new(),
            story_id,
            title: trimmed.to_owned(),
            description: None,
            assignment: TaskAssignment::Available,
            acceptance_criteria_refs: BTreeSet::new(),
            version: TaskVersion::INITIAL,
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the acceptance criterion references.
    #[must_use]
    pub fn with_acceptance_criteria(mut self, refs: impl IntoIterator<Item = String>) -> Self {
        self.acceptance_criteria_refs = refs.into_iter().collect();
        self
    }

    /// Reconstructs a task from a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::OwnershipMismatch`] when the owner's
    /// presence disagrees with the status.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let has_owner = data.owner_user_id.is_some();
        let assignment = TaskAssignment::from_parts(data.status, data.owner_user_id).ok_or(
            TaskDomainError::OwnershipMismatch {
                task_id: data.id,
                status: data.status,
                has_owner,
            },
        )?;
        Ok(Self {
            id: data.id,
            story_id: data.story_id,
            title: data.title,
            description: data.description,
            assignment,
            acceptance_criteria_refs: data.acceptance_criteria_refs,
            version: data.version,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning story identifier.
    #[must_use]
    pub const fn story_id(&self) -> StoryId {
        self.story_id
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the display description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the status and owner as one value.
    #[must_use]
    pub const fn assignment(&self) -> &TaskAssignment {
        &self.assignment
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.assignment.status()
    }

    /// Returns the owning user, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.assignment.owner()
    }

    /// Returns the acceptance criterion references.
    #[must_use]
    pub const fn acceptance_criteria_refs(&self) -> &BTreeSet<String> {
        &self.acceptance_criteria_refs
    }

    /// Returns the server-assigned version.
    #[must_use]
    pub const fn version(&self) -> TaskVersion {
        self.version
    }

    /// Checks whether `actor` may apply `transition` to this task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyClaimed`] when claiming a task that
    /// someone else holds, [`TaskDomainError::NotOwner`] when a non-owner
    /// acts on an owned task, and [`TaskDomainError::InvalidStateTransition`]
    /// when the lifecycle forbids the transition.
    pub fn check(&self, transition: TaskTransition, actor: &UserId) -> Result<(), TaskDomainError> {
        self.next_assignment(transition, actor).map(|_| ())
    }

    /// Applies an ownership transition on behalf of `actor`.
    ///
    /// The version is left untouched; only the system of record assigns
    /// versions.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Task::check`]; the task is unchanged on
    /// error.
    pub fn apply(
        &mut self,
        transition: TaskTransition,
        actor: &UserId,
    ) -> Result<(), TaskDomainError> {
        self.assignment = self.next_assignment(transition, actor)?;
        Ok(())
    }

    /// Returns a copy of this task with `transition` applied.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Task::check`].
    pub fn transitioned(
        &self,
        transition: TaskTransition,
        actor: &UserId,
    ) -> Result<Self, TaskDomainError> {
        let mut next = self.clone();
        next.apply(transition, actor)?;
        Ok(next)
    }

    /// Advances the version after the system of record accepted a write.
    pub(crate) const fn advance_version(&mut self) {
        self.version = self.version.next();
    }

    fn next_assignment(
        &self,
        transition: TaskTransition,
        actor: &UserId,
    ) -> Result<TaskAssignment, TaskDomainError> {
        let from = self.status();
        let invalid = TaskDomainError::InvalidStateTransition {
            task_id: self.id,
            from,
            transition,
        };

        let Some(next_status) = from.after(transition) else {
            return match (transition, self.owner()) {
                (TaskTransition::Claim, Some(owner)) if owner != actor => {
                    Err(TaskDomainError::AlreadyClaimed {
                        task_id: self.id,
                        owner: owner.clone(),
                    })
                }
                _ => Err(invalid),
            };
        };

        if transition == TaskTransition::Claim {
            return Ok(TaskAssignment::Owned(actor.clone()));
        }

        let owner = self.owner().ok_or_else(|| invalid.clone())?;
        if owner != actor {
            return Err(TaskDomainError::NotOwner {
                task_id: self.id,
                owner: owner.clone(),
                actor: actor.clone(),
            });
        }

        TaskAssignment::from_parts(
            next_status,
            (next_status != TaskStatus::Available).then(|| owner.clone()),
        )
        .ok_or(invalid)
    }
}

impl TryFrom<PersistedTaskData> for Task {
    type Error = TaskDomainError;

    fn try_from(value: PersistedTaskData) -> Result<Self, Self::Error> {
        Self::from_persisted(value)
    }
}

impl From<Task> for PersistedTaskData {
    fn from(task: Task) -> Self {
        let status = task.status();
        let owner_user_id = task.owner().cloned();
        Self {
            id: task.id,
            story_id: task.story_id,
            title: task.title,
            description: task.description,
            status,
            owner_user_id,
            acceptance_criteria_refs: task.acceptance_criteria_refs,
            version: task.version,
        }
    }
}
