//! Unit tests for the task module.
//!
//! Tests are organised by component: domain rules and the transition table,
//! the reconciliation layer's merge rules, push frame decoding, and the
//! ownership engine's optimistic write handling.


use crate::task::domain::{
    PersistedTaskData, StoryId, Task, TaskDomainError, TaskId, TaskStatus, TaskVersion, UserId,
};

/// Builds a task record the way the persistence service would send it.
fn record(
    id: TaskId,
    status: TaskStatus,
    owner: Option<&str>,
    version: u64,
) -> Result<Task, TaskDomainError> {
    let owner_user_id = owner.map(UserId::new).transpose()?;
    Task::from_persisted(PersistedTaskData {
        id,
        story_id: StoryId::from_uuid(uuid::Uuid::nil()),
        title: "Write reconciliation tests".to_owned(),
        description: None,
        status,
        owner_user_id,
        acceptance_criteria_refs: Default::default(),
        version: TaskVersion::new(version),
    })
}

fn user(name: &str) -> UserId {
    UserId::new(name).expect("valid user id")
}
