//! Races between boards that share one persistence service.

use super::helpers::{SharedSprint, shared};
use rstest::rstest;
use sprintboard::{
    sprint::services::SprintBoardError,
    task::{domain::TaskStatus, services::OwnershipError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn simultaneous_claims_settle_on_one_owner(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;
    let task_id = shared.task_id(0)?;

    let (a, b) = tokio::join!(alice.claim(task_id), bob.claim(task_id));

    let (winner, loser, lost) = match (a, b) {
        (Ok(_), Err(err)) => (&alice, &bob, err),
        (Err(err), Ok(_)) => (&bob, &alice, err),
        other => return Err(eyre::eyre!("expected exactly one winner, got {other:?}")),
    };
    eyre::ensure!(
        matches!(lost, SprintBoardError::Ownership(OwnershipError::Conflict(_))),
        "loser should see a conflict, got {lost:?}"
    );

    let server = shared
        .persistence
        .get(task_id)?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(server.owner() == Some(winner.actor()));
    let on_loser = loser
        .task(task_id)
        .ok_or_else(|| eyre::eyre!("task missing on loser's board"))?;
    eyre::ensure!(on_loser.status() == TaskStatus::Available);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claims_on_different_tasks_both_succeed(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;

    let (a, b) = tokio::join!(
        alice.claim(shared.task_id(0)?),
        bob.claim(shared.task_id(1)?)
    );

    eyre::ensure!(a?.task.owner() == Some(alice.actor()));
    eyre::ensure!(b?.task.owner() == Some(bob.actor()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_board_cannot_start_task_claimed_elsewhere(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;
    let task_id = shared.task_id(2)?;
    alice.claim(task_id).await?;

    let result = bob.claim(task_id).await;

    let Err(SprintBoardError::Ownership(OwnershipError::Conflict(conflict))) = result else {
        return Err(eyre::eyre!("expected conflict, got {result:?}"));
    };
    eyre::ensure!(conflict.owner.as_ref() == Some(alice.actor()));
    eyre::ensure!(conflict.to_string().ends_with("already claimed by alice"));
    Ok(())
}
