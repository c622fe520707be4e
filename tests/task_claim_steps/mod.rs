//! Step definitions for task claim scenarios.

mod given;
mod then;
mod when;
pub mod world;
