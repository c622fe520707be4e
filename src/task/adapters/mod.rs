//! Adapter implementations for task persistence and push delivery ports.

pub mod memory;
pub mod queue;
