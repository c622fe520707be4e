//! When steps for task claim BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use sprintboard::task::{
    domain::{TaskStatus, TaskTransition},
    ports::{ChannelStatus, PushMessage},
};

fn act(
    world: &mut BoardWorld,
    user: &str,
    task: &str,
    transition: TaskTransition,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(task)?;
    let board = world.board(user)?;
    let result = run_async(async {
        match transition {
            TaskTransition::Claim => board.claim(task_id).await,
            TaskTransition::Release => board.release(task_id).await,
            TaskTransition::Start => board.start(task_id).await,
            TaskTransition::Complete => board.complete(task_id).await,
        }
    });
    world.last_result = Some(result);
    Ok(())
}

#[when(r#""{user}" claims "{task}""#)]
fn user_claims(world: &mut BoardWorld, user: String, task: String) -> Result<(), eyre::Report> {
    act(world, &user, &task, TaskTransition::Claim)
}

#[when(r#""{user}" starts "{task}""#)]
fn user_starts(world: &mut BoardWorld, user: String, task: String) -> Result<(), eyre::Report> {
    act(world, &user, &task, TaskTransition::Start)
}

#[when(r#""{user}" completes "{task}""#)]
fn user_completes(world: &mut BoardWorld, user: String, task: String) -> Result<(), eyre::Report> {
    act(world, &user, &task, TaskTransition::Complete)
}

#[when(r#""{user}" filters the board to "{status}""#)]
fn user_filters(world: &mut BoardWorld, user: String, status: String) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(status.as_str())?;
    let view = world.board(&user)?.set_filter([status]);
    world.last_view = Some(view);
    Ok(())
}

#[when(r#""{task}" is deleted elsewhere"#)]
fn task_deleted_elsewhere(world: &mut BoardWorld, task: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&task)?;
    world.persistence.delete(task_id)?;
    Ok(())
}

#[when(r#""{user}" loses and regains the push channel"#)]
fn user_reconnects(world: &mut BoardWorld, user: String) -> Result<(), eyre::Report> {
    let board = world.board(&user)?;
    for status in [ChannelStatus::Disconnected, ChannelStatus::Connected] {
        run_async(board.handle_push(PushMessage::Status { status }))
            .wrap_err("apply channel status")?;
    }
    Ok(())
}
