//! Port contracts for task ownership and reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces for the persistence
//! service (the system of record) and the push channel.

pub mod persistence;
pub mod push;

pub use persistence::{TaskConflict, TaskPersistence, TaskPersistenceError, TaskPersistenceResult};
pub use push::{ChannelStatus, PushChannel, PushMessage, TaskChangeEvent};

#[cfg(test)]
pub use persistence::MockTaskPersistence;
