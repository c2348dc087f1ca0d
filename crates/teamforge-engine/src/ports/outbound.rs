//! Outbound (driven) ports: dependencies the engine requires the host to
//! provide, plus default implementations.

use crate::domain::{RoundReport, StateDocument, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstract interface over the durable state store.
///
/// Production: [`JsonFileStore`](crate::adapters::storage::JsonFileStore).
/// Testing: [`InMemoryStore`](crate::adapters::storage::InMemoryStore).
///
/// Implementations must honor the atomic-swap contract: a partially written
/// document is never observable, regardless of crashes mid-save. A key-value
/// or embedded database can be substituted behind this trait without touching
/// engine logic.
pub trait DocumentStore: Send {
    /// Returns the current snapshot.
    fn load(&mut self) -> Result<StateDocument, StoreError>;

    /// Persists the full document atomically.
    fn save(&mut self, doc: &StateDocument) -> Result<(), StoreError>;
}

/// Abstract interface for time, so tests can pin the clock.
pub trait TimeSource: Send + Sync {
    /// Current instant, UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Default system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Sink for round results, implemented by the collaborating notification
/// layer. The engine performs no network I/O itself; it only hands over the
/// newly created teams and their member lists.
#[async_trait]
pub trait TeamNotifier: Send + Sync {
    /// Called after a round persists at least one team.
    async fn teams_formed(&self, report: &RoundReport);
}

/// Default notifier that only logs. Hosts replace this with a real delivery
/// adapter.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl TeamNotifier for LogNotifier {
    async fn teams_formed(&self, report: &RoundReport) {
        for team in &report.created {
            tracing::info!(
                "[notify] team {} formed with {} members (lead: {:?})",
                team.id,
                team.members.len(),
                team.members.first()
            );
        }
    }
}

/// Settable clock for tests.
#[derive(Debug)]
pub struct MockTimeSource {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl MockTimeSource {
    /// Creates a clock pinned at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = now;
    }
}

impl TimeSource for MockTimeSource {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}
