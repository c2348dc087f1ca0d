//! # Team Formation Engine
//!
//! Pairs waiting participants into fixed-size teams on a recurring cadence
//! and on manual trigger, persisting membership durably. The engine is a
//! library: registration flows, admin commands, and the notification layer
//! are external collaborators consuming the ports below.
//!
//! ## Components
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - JsonFileStore (atomic rename), InMemoryStore       │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - FormationApi trait                         │
//! │  ports/outbound.rs - DocumentStore, TimeSource, TeamNotifier    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs - Participant, Team, StateDocument          │
//! │  domain/matcher.rs  - pure elastic batch matching               │
//! │  domain/errors.rs   - EngineError / StoreError                  │
//! │  service.rs         - load-mutate-save registry operations      │
//! │  scheduler.rs       - cadence loop + manual trigger             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data flow
//!
//! ```text
//! cron tick / admin command
//!         │
//!         ↓
//!   MatchScheduler ──→ FormationService::run_matching_round
//!                            │  load queue snapshot
//!                            │  match_round(queue, base, elastic)
//!                            │  create teams + drain queue
//!                            │  one atomic save
//!                            ↓
//!                      RoundReport ──→ TeamNotifier (host-provided)
//! ```
//!
//! ## Consistency
//!
//! - Single-writer: every operation is one load-mutate-save cycle under the
//!   service's process-local lock; no two rounds can interleave.
//! - Atomic persistence: the file store writes to a temp file and renames,
//!   so readers never observe a torn document.
//! - Participant status and queue membership change together in the same
//!   cycle; the queue never holds a teamed participant.
//! - A store failure abandons the triggering operation whole; the previous
//!   snapshot stays intact. Participants are never silently dropped.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod scheduler;
pub mod service;

pub use adapters::{InMemoryStore, JsonFileStore};
pub use config::{EngineConfig, ScheduleConfig};
pub use domain::{
    match_round, match_stats, EngineError, MatchOutcome, MatchStats, Participant, ParticipantId,
    ParticipantStatus, Question, QuestionId, Result, RoundReport, StateDocument, StoreError, Team,
    TeamId, TeamStats, TeamStatus, TeamSummary,
};
pub use ports::{DocumentStore, FormationApi, LogNotifier, SystemTimeSource, TeamNotifier, TimeSource};
pub use scheduler::{next_occurrence, MatchScheduler, SchedulerState, SchedulerStatus};
pub use service::FormationService;
