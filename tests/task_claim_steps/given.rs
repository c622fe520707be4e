//! Given steps for task claim BDD scenarios.

use super::world::BoardWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use sprintboard::task::domain::{PersistedTaskData, Task, TaskStatus, TaskVersion, UserId};

#[given(r#"a story "{story}" with an available task "{task}""#)]
fn story_with_available_task(
    world: &mut BoardWorld,
    story: String,
    task: String,
) -> Result<(), eyre::Report> {
    let story = world.story(&story)?;
    let record = Task::new(story.id(), task.as_str())?;
    world.seed(&task, record)
}

#[given(r#"a story "{story}" with a completed task "{task}""#)]
fn story_with_completed_task(
    world: &mut BoardWorld,
    story: String,
    task: String,
) -> Result<(), eyre::Report> {
    let story = world.story(&story)?;
    let seed = Task::new(story.id(), task.as_str())?;
    let record = Task::from_persisted(PersistedTaskData {
        status: TaskStatus::Completed,
        owner_user_id: Some(UserId::new("dev")?),
        version: TaskVersion::new(4),
        ..PersistedTaskData::from(seed)
    })?;
    world.seed(&task, record)
}

#[given(r#""{user}" has the board open"#)]
fn user_has_board_open(world: &mut BoardWorld, user: String) -> Result<(), eyre::Report> {
    world
        .open_board(&user)
        .wrap_err_with(|| format!("open board for {user}"))
}
