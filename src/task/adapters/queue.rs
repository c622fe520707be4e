//! Message-queue push channel backed by a tokio mpsc queue.

use crate::config::BoardConfig;
use crate::task::ports::{PushChannel, PushMessage};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Error returned when the receiving side of a push queue is gone.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("push queue closed")]
pub struct PushQueueClosed;

/// Sending half of a push queue.
#[derive(Debug, Clone)]
pub struct PushPublisher {
    sender: mpsc::Sender<PushMessage>,
}

impl PushPublisher {
    /// Enqueues a message, waiting for room when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`PushQueueClosed`] when the channel has been dropped.
    pub async fn publish(&self, message: PushMessage) -> Result<(), PushQueueClosed> {
        self.sender.send(message).await.map_err(|_| PushQueueClosed)
    }

    /// Enqueues a message without waiting.
    ///
    /// Returns `false` when the queue is full or closed and the message was
    /// dropped.
    #[must_use]
    pub fn try_publish(&self, message: PushMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Closed(_)) => false,
        }
    }

    /// Returns whether the receiving side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Receiving half of a push queue.
#[derive(Debug)]
pub struct QueuePushChannel {
    receiver: mpsc::Receiver<PushMessage>,
}

impl QueuePushChannel {
    /// Takes the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<PushMessage> {
        self.receiver.try_recv().ok()
    }
}

#[async_trait]
impl PushChannel for QueuePushChannel {
    async fn recv(&mut self) -> Option<PushMessage> {
        self.receiver.recv().await
    }
}

/// Creates a bounded push queue sized by `config`.
#[must_use]
pub fn push_queue(config: &BoardConfig) -> (PushPublisher, QueuePushChannel) {
    let (sender, receiver) = mpsc::channel(config.push_queue_capacity.max(1));
    (PushPublisher { sender }, QueuePushChannel { receiver })
}
