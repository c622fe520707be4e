//! Snapshot refresh after the push channel drops.

use super::helpers::{SharedSprint, shared};
use rstest::rstest;
use sprintboard::{
    config::BoardConfig,
    task::{
        domain::TaskStatus,
        ports::{ChannelStatus, PushMessage},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn changes_missed_while_offline_arrive_with_refresh(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    let bob = shared.board("bob")?;
    alice.load().await?;
    bob.load().await?;
    let mut bob_channel = shared.persistence.subscribe(&BoardConfig::strict())?;
    let claimed = shared.task_id(0)?;
    let deleted = shared.task_id(1)?;

    shared.persistence.broadcast_status(ChannelStatus::Disconnected)?;
    alice.claim(claimed).await?;
    shared.persistence.delete(deleted)?;
    shared.persistence.broadcast_status(ChannelStatus::Connected)?;

    let mut messages = Vec::new();
    while let Some(message) = bob_channel.try_recv() {
        messages.push(message);
    }
    // Drop the peer change so only the refresh can deliver it.
    messages.retain(|message| !matches!(message, PushMessage::TaskChanged(_)));
    for message in messages {
        bob.handle_push(message).await?;
    }

    let seen = bob
        .task(claimed)
        .ok_or_else(|| eyre::eyre!("claimed task missing"))?;
    eyre::ensure!(seen.status() == TaskStatus::Owned);
    eyre::ensure!(bob.task(deleted).is_none());
    eyre::ensure!(!bob.is_reconnecting());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_leaves_board_waiting(
    shared: Result<SharedSprint, eyre::Report>,
) -> Result<(), eyre::Report> {
    let shared = shared?;
    let alice = shared.board("alice")?;
    alice.load().await?;
    let mut channel = shared.persistence.subscribe(&BoardConfig::strict())?;

    shared.persistence.broadcast_status(ChannelStatus::Disconnected)?;
    shared.persistence.broadcast_status(ChannelStatus::Connected)?;
    shared.persistence.fail_next(1)?;

    let mut failures = 0_usize;
    while let Some(message) = channel.try_recv() {
        if let Err(err) = alice.handle_push(message).await {
            eyre::ensure!(err.is_retryable());
            failures += 1;
        }
    }

    eyre::ensure!(failures == 1);
    eyre::ensure!(alice.is_reconnecting());
    alice.refresh().await?;
    eyre::ensure!(!alice.is_reconnecting());
    Ok(())
}
