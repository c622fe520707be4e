//! Task ownership and board reconciliation for Sprintboard.
//!
//! This module enforces the self-assignment workflow (claim, release, start,
//! complete) and keeps an in-memory record of the sprint's tasks consistent
//! while optimistic local writes, service answers, and push events arrive in
//! any order. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
