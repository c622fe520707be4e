//! Boards converging on the same records through push messages.

use super::helpers::{SharedSprint, shared};
use rstest::rstest;
use sprintboard::{
    config::BoardConfig,
    sprint::services::PushOutcome,
    task::{domain::TaskStatus, services::MergeOutcome},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn peer_changes_reach_other_boards(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;
    let mut bob_channel = shared.persistence.subscribe(&BoardConfig::strict())?;
    let task_id = shared.task_id(0)?;

    alice.claim(task_id).await?;
    alice.start(task_id).await?;

    let mut applied = 0_usize;
    while let Some(message) = bob_channel.try_recv() {
        if let PushOutcome::Merged(MergeOutcome::Applied { .. }) = bob.handle_push(message).await? {
            applied += 1;
        }
    }

    eyre::ensure!(applied == 2, "expected two applied changes, got {applied}");
    eyre::ensure!(bob.task(task_id) == alice.task(task_id));
    let view = bob.view();
    eyre::ensure!(view.status_totals.get(TaskStatus::InProgress) == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn own_echo_after_confirmation_is_ignored(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    alice.load().await?;
    let mut channel = shared.persistence.subscribe(&BoardConfig::strict())?;
    let task_id = shared.task_id(1)?;

    let confirmed = alice.claim(task_id).await?;
    let echo = channel
        .try_recv()
        .ok_or_else(|| eyre::eyre!("no echo published"))?;
    let outcome = alice.handle_push(echo).await?;

    eyre::ensure!(outcome == PushOutcome::Merged(MergeOutcome::Ignored));
    eyre::ensure!(alice.task(task_id) == Some(confirmed.task));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_order_delivery_keeps_newest_record(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;
    let mut bob_channel = shared.persistence.subscribe(&BoardConfig::strict())?;
    let task_id = shared.task_id(2)?;

    alice.claim(task_id).await?;
    alice.start(task_id).await?;
    alice.complete(task_id).await?;

    let mut messages = Vec::new();
    while let Some(message) = bob_channel.try_recv() {
        messages.push(message);
    }
    for message in messages.into_iter().rev() {
        bob.handle_push(message).await?;
    }

    let seen = bob
        .task(task_id)
        .ok_or_else(|| eyre::eyre!("task missing on bob's board"))?;
    eyre::ensure!(seen.status() == TaskStatus::Completed);
    eyre::ensure!(bob.metrics().task_progress == "1 of 3 tasks");
    Ok(())
}
