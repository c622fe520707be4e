//! Push channel port: task-change notifications from every contributor.

use crate::task::domain::{Task, TaskId, TaskVersion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A change to one task made by any user, the local one included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChangeEvent {
    /// Full record after the change.
    pub task: Task,
}

impl TaskChangeEvent {
    /// Wraps a changed task record.
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self { task }
    }

    /// Returns the changed task's identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task.id()
    }

    /// Returns the ordering marker of the change.
    #[must_use]
    pub const fn version(&self) -> TaskVersion {
        self.task.version()
    }
}

/// Connection state reported by the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Live events are flowing.
    Connected,
    /// Events may have been missed.
    Disconnected,
}

/// One message delivered by the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// A task changed.
    TaskChanged(TaskChangeEvent),
    /// The connection state changed.
    Status {
        /// New connection state.
        status: ChannelStatus,
    },
}

impl PushMessage {
    /// Decodes a JSON push frame.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the frame is malformed or the
    /// task record violates domain invariants.
    pub fn from_json(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Transport-agnostic source of push messages.
#[async_trait]
pub trait PushChannel: Send {
    /// Waits for the next message; `None` once the channel is closed.
    async fn recv(&mut self) -> Option<PushMessage>;
}
