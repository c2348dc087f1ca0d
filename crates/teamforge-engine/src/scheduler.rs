//! Cadence scheduler driving recurring matching rounds.
//!
//! The loop is cooperative: compute the next occurrence, sleep until it (or
//! until shutdown), run exactly one round, repeat. The next occurrence is
//! always recomputed from wall-clock time, never from "time since last run",
//! so a manual trigger in between does not shift the rhythm and neither does
//! a process restart.
//!
//! State machine:
//! ```text
//! [IDLE] ──→ [WAITING until t] ──t reached──→ [RUNNING] ──→ [IDLE] ──→ ...
//!    │              │
//!    └──────────────┴── shutdown ──→ [STOPPED]
//! ```
//!
//! Shutdown interrupts a wait immediately; a round already in flight runs to
//! completion first (team creation is never preempted halfway).

use crate::config::ScheduleConfig;
use crate::domain::{Result, RoundReport};
use crate::ports::inbound::FormationApi;
use crate::ports::outbound::TeamNotifier;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Computes the next cadence boundary strictly after `now`.
///
/// The candidate is `now`'s date at `schedule.hour_utc`; if that is not in
/// the future it advances one day, then day-by-day until the date's offset
/// from `schedule.epoch` is a whole multiple of `schedule.interval_days`.
/// Deterministic: equal inputs give equal outputs.
pub fn next_occurrence(now: DateTime<Utc>, schedule: &ScheduleConfig) -> DateTime<Utc> {
    let mut candidate = now
        .date_naive()
        .and_hms_opt(schedule.hour_utc, 0, 0)
        .expect("hour validated at startup")
        .and_utc();

    if candidate <= now {
        candidate += Duration::days(1);
    }
    while (candidate.date_naive() - schedule.epoch)
        .num_days()
        .rem_euclid(schedule.interval_days)
        != 0
    {
        candidate += Duration::days(1);
    }
    candidate
}

/// Scheduler lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Between rounds, not yet waiting.
    Idle,
    /// Suspended until the given instant.
    Waiting {
        /// Wake-up instant.
        until: DateTime<Utc>,
    },
    /// A matching round is in flight (non-preemptible).
    Running,
    /// Shut down; no further rounds will run.
    Stopped,
}

/// Observability snapshot of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Current lifecycle state.
    pub state: SchedulerState,
    /// Next scheduled round, while known.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Rounds completed since startup (scheduled and manual).
    pub rounds_completed: u64,
    /// Completion instant of the most recent round.
    pub last_round_at: Option<DateTime<Utc>>,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: SchedulerState::Idle,
            next_run_at: None,
            rounds_completed: 0,
            last_round_at: None,
        }
    }
}

/// Drives matching rounds on the configured cadence and on demand.
///
/// Manual triggers call [`run_round_now`](Self::run_round_now) directly; the
/// engine service serializes rounds internally, so a manual round and the
/// scheduled loop can never interleave their store transactions.
pub struct MatchScheduler {
    service: Arc<dyn FormationApi>,
    notifier: Arc<dyn TeamNotifier>,
    schedule: ScheduleConfig,
    status: RwLock<SchedulerStatus>,
}

impl MatchScheduler {
    /// Creates a scheduler over a validated cadence.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the cadence is rejected; fatal at startup.
    pub fn new(
        service: Arc<dyn FormationApi>,
        notifier: Arc<dyn TeamNotifier>,
        schedule: ScheduleConfig,
    ) -> Result<Self> {
        schedule.validate()?;
        Ok(Self {
            service,
            notifier,
            schedule,
            status: RwLock::new(SchedulerStatus::default()),
        })
    }

    /// The configured cadence.
    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    /// Current status snapshot.
    pub fn status(&self) -> SchedulerStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_status(&self, f: impl FnOnce(&mut SchedulerStatus)) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut status);
    }

    /// Runs one matching round immediately, sharing the scheduled path:
    /// round, notification, structured event. Used by the admin trigger;
    /// does not disturb the next scheduled occurrence.
    pub async fn run_round_now(&self) -> Result<RoundReport> {
        let report = self.service.run_matching_round()?;
        let now = Utc::now();
        self.update_status(|s| {
            s.rounds_completed += 1;
            s.last_round_at = Some(now);
        });

        if report.created.is_empty() {
            tracing::info!(
                "[scheduler] queue below team base ({} waiting), no teams formed",
                report.remaining
            );
            return Ok(report);
        }

        self.notifier.teams_formed(&report).await;

        let event = serde_json::json!({
            "timestamp": now.to_rfc3339_opts(SecondsFormat::Micros, true),
            "subsystem": "scheduler",
            "event_type": "TeamsFormed",
            "correlation_id": uuid::Uuid::new_v4().to_string(),
            "teams": report.created.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            "participants_placed": report.placed(),
            "remaining": report.remaining,
        });
        tracing::info!("EVENT_FLOW_JSON {event}");

        Ok(report)
    }

    /// The cooperative cadence loop. Returns once `shutdown` flips to true
    /// (or its sender is dropped); a wait is interrupted immediately, an
    /// in-flight round finishes first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "[scheduler] started: every {} day(s) at {:02}:00 UTC",
            self.schedule.interval_days,
            self.schedule.hour_utc
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let now = Utc::now();
            let next = next_occurrence(now, &self.schedule);
            self.update_status(|s| {
                s.state = SchedulerState::Waiting { until: next };
                s.next_run_at = Some(next);
            });
            tracing::info!("[scheduler] next matching round at {}", next.to_rfc3339());

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            self.update_status(|s| s.state = SchedulerState::Running);
            if let Err(e) = self.run_round_now().await {
                tracing::error!("[scheduler] matching round failed: {e}");
            }
            self.update_status(|s| s.state = SchedulerState::Idle);
        }

        self.update_status(|s| {
            s.state = SchedulerState::Stopped;
            s.next_run_at = None;
        });
        tracing::info!("[scheduler] stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryStore;
    use crate::config::EngineConfig;
    use crate::ports::outbound::{LogNotifier, MockTimeSource};
    use crate::service::FormationService;
    use chrono::{NaiveDate, TimeZone};

    fn schedule() -> ScheduleConfig {
        ScheduleConfig::default()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn before_the_hour_on_an_even_day_fires_same_day() {
        // 2024-01-01 is the epoch itself: offset 0, divisible by 2.
        let next = next_occurrence(at(2024, 1, 1, 9, 0), &schedule());
        assert_eq!(next, at(2024, 1, 1, 12, 0));
    }

    #[test]
    fn after_the_hour_skips_to_the_next_even_day() {
        let next = next_occurrence(at(2024, 1, 1, 13, 0), &schedule());
        assert_eq!(next, at(2024, 1, 3, 12, 0));
    }

    #[test]
    fn exactly_at_the_hour_is_not_today() {
        let next = next_occurrence(at(2024, 1, 1, 12, 0), &schedule());
        assert_eq!(next, at(2024, 1, 3, 12, 0));
    }

    #[test]
    fn odd_day_before_the_hour_waits_for_the_even_day() {
        let next = next_occurrence(at(2024, 1, 2, 9, 0), &schedule());
        assert_eq!(next, at(2024, 1, 3, 12, 0));
    }

    #[test]
    fn custom_interval_keeps_the_epoch_rhythm() {
        let mut cadence = schedule();
        cadence.interval_days = 3;
        // 2024-01-05 is 4 days past the epoch; next multiple of 3 is day 6.
        let next = next_occurrence(at(2024, 1, 5, 9, 0), &cadence);
        assert_eq!(next, at(2024, 1, 7, 12, 0));
    }

    #[test]
    fn dates_before_the_epoch_still_land_on_the_rhythm() {
        let next = next_occurrence(at(2023, 12, 29, 13, 0), &schedule());
        // 2023-12-30 is -2 days from the epoch: a whole multiple of 2.
        assert_eq!(next, at(2023, 12, 30, 12, 0));
    }

    #[test]
    fn occurrence_is_strictly_future_and_deterministic() {
        let mut cadence = schedule();
        cadence.epoch = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        for hour in 0..24 {
            let now = at(2024, 3, 9, hour, 30);
            let next = next_occurrence(now, &cadence);
            assert!(next > now);
            assert_eq!(next, next_occurrence(now, &cadence));
            assert_eq!(
                (next.date_naive() - cadence.epoch)
                    .num_days()
                    .rem_euclid(cadence.interval_days),
                0
            );
        }
    }

    fn scheduler_over(ids: std::ops::RangeInclusive<u64>) -> MatchScheduler {
        let clock = Arc::new(MockTimeSource::new(at(2024, 6, 3, 12, 0)));
        let service = Arc::new(
            FormationService::new(InMemoryStore::new(), EngineConfig::default(), clock).unwrap(),
        );
        for id in ids {
            service.enqueue(id).unwrap();
        }
        MatchScheduler::new(service, Arc::new(LogNotifier), schedule()).unwrap()
    }

    #[test]
    fn bad_cadence_is_rejected_at_construction() {
        let clock = Arc::new(MockTimeSource::new(at(2024, 6, 3, 12, 0)));
        let service = Arc::new(
            FormationService::new(InMemoryStore::new(), EngineConfig::default(), clock).unwrap(),
        );
        let mut cadence = schedule();
        cadence.hour_utc = 24;
        assert!(MatchScheduler::new(service, Arc::new(LogNotifier), cadence).is_err());
    }

    #[tokio::test]
    async fn manual_round_runs_and_counts() {
        let scheduler = scheduler_over(1..=7);
        let report = scheduler.run_round_now().await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].members.len(), 7);

        let status = scheduler.status();
        assert_eq!(status.rounds_completed, 1);
        assert!(status.last_round_at.is_some());
    }

    #[tokio::test]
    async fn manual_round_with_short_queue_is_a_no_op() {
        let scheduler = scheduler_over(1..=3);
        let report = scheduler.run_round_now().await.unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.remaining, 3);
    }

    #[tokio::test]
    async fn shutdown_interrupts_the_wait_promptly() {
        let scheduler = Arc::new(scheduler_over(1..=2));
        let (tx, rx) = watch::channel(false);

        let handle = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(rx).await })
        };

        // Give the loop a moment to enter its wait, then stop it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(matches!(
            scheduler.status().state,
            SchedulerState::Waiting { .. }
        ));
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("scheduler did not stop promptly")
            .unwrap();
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
        // The wait was interrupted, not completed: no round ran.
        assert_eq!(scheduler.status().rounds_completed, 0);
    }

    #[tokio::test]
    async fn dropping_the_shutdown_sender_stops_the_loop() {
        let scheduler = Arc::new(scheduler_over(1..=2));
        let (tx, rx) = watch::channel(false);

        let handle = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(rx).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("scheduler did not stop promptly")
            .unwrap();
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
    }
}
