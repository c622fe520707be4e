//! Sprintboard: task ownership and live sprint board reconciliation.
//!
//! This crate keeps a sprint's task board consistent while the acting user's
//! optimistic edits, the persistence service's responses, and asynchronously
//! delivered push events interleave in arbitrary order.
//!
//! # Architecture
//!
//! Sprintboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory service,
//!   message queues)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, ownership transitions, and reconciliation
//! - [`sprint`]: Stories, sprints, board views, and sprint metrics
//! - [`config`]: Runtime tuning for the board

pub mod config;
pub mod sprint;
pub mod task;
