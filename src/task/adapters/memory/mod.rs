//! In-memory adapters for task ownership tests and local tooling.

mod persistence;

pub use persistence::InMemoryTaskPersistence;
