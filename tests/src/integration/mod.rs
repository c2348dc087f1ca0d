//! Cross-component integration tests, run against the real file store.

pub mod formation_flow;
pub mod persistence;
