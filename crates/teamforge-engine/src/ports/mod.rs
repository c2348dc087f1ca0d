//! Ports: the engine's driving API and its driven dependencies.

pub mod inbound;
pub mod outbound;

pub use inbound::FormationApi;
pub use outbound::{
    DocumentStore, LogNotifier, MockTimeSource, SystemTimeSource, TeamNotifier, TimeSource,
};
