//! Adapter implementations of the outbound ports.

pub mod storage;

pub use storage::{InMemoryStore, JsonFileStore};
