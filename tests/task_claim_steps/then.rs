//! Then steps for task claim BDD scenarios.

use super::world::BoardWorld;
use rstest_bdd_macros::then;
use sprintboard::{
    sprint::services::{GroupKey, SprintBoardError},
    task::{domain::TaskStatus, services::OwnershipError},
};

#[then(r#""{user}" sees "{task}" as "{status}""#)]
fn user_sees_status(
    world: &BoardWorld,
    user: String,
    task: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let record = world
        .board(&user)?
        .task(world.task_id(&task)?)
        .ok_or_else(|| eyre::eyre!("{user} does not see {task}"))?;
    eyre::ensure!(
        record.status() == expected,
        "expected {task} to be {expected}, found {}",
        record.status()
    );
    Ok(())
}

#[then(r#""{user}" sees "{task}" owned by "{owner}""#)]
fn user_sees_owner(
    world: &BoardWorld,
    user: String,
    task: String,
    owner: String,
) -> Result<(), eyre::Report> {
    let record = world
        .board(&user)?
        .task(world.task_id(&task)?)
        .ok_or_else(|| eyre::eyre!("{user} does not see {task}"))?;
    let found = record.owner().map(|id| id.as_str().to_owned());
    eyre::ensure!(
        found.as_deref() == Some(owner.as_str()),
        "expected owner {owner}, found {found:?}"
    );
    Ok(())
}

#[then(r#"the last operation fails with a conflict naming "{owner}""#)]
fn last_operation_conflicts(world: &BoardWorld, owner: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no operation recorded"))?;
    let Err(SprintBoardError::Ownership(OwnershipError::Conflict(conflict))) = result else {
        return Err(eyre::eyre!("expected conflict, got {result:?}"));
    };
    let named = conflict.owner.as_ref().map(|id| id.as_str());
    eyre::ensure!(named == Some(owner.as_str()), "conflict names {named:?}");
    Ok(())
}

#[then(r#""{user}" sees progress "{progress}""#)]
fn user_sees_progress(
    world: &BoardWorld,
    user: String,
    progress: String,
) -> Result<(), eyre::Report> {
    let metrics = world.board(&user)?.metrics();
    eyre::ensure!(
        metrics.task_progress == progress,
        "expected {progress}, found {}",
        metrics.task_progress
    );
    Ok(())
}

fn story_titles(world: &BoardWorld) -> Result<Vec<String>, eyre::Report> {
    let view = world
        .last_view
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no board view recorded"))?;
    Ok(view
        .groups
        .iter()
        .filter_map(|group| match &group.key {
            GroupKey::Story { title, .. } => Some(title.clone()),
            GroupKey::Status { .. } => None,
        })
        .collect())
}

#[then(r#""{user}" sees the story "{story}""#)]
fn user_sees_story(world: &BoardWorld, user: String, story: String) -> Result<(), eyre::Report> {
    let titles = story_titles(world)?;
    eyre::ensure!(titles.contains(&story), "{user} sees only {titles:?}");
    Ok(())
}

#[then(r#""{user}" does not see the story "{story}""#)]
fn user_does_not_see_story(
    world: &BoardWorld,
    user: String,
    story: String,
) -> Result<(), eyre::Report> {
    let titles = story_titles(world)?;
    eyre::ensure!(!titles.contains(&story), "{user} still sees {story}");
    Ok(())
}

#[then(r#""{user}" no longer sees "{task}""#)]
fn user_no_longer_sees(world: &BoardWorld, user: String, task: String) -> Result<(), eyre::Report> {
    let board = world.board(&user)?;
    eyre::ensure!(
        board.task(world.task_id(&task)?).is_none(),
        "{user} still sees {task}"
    );
    eyre::ensure!(!board.is_reconnecting(), "board still waiting for refresh");
    Ok(())
}
