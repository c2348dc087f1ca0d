//! End-to-end formation flow:
//!
//! ```text
//! enqueue ──→ matching round ──→ teams persisted, queue drained
//!    ↑                                   │
//!    └────────── disband ←───────────────┘
//! ```
//!
//! All scenarios run over a `JsonFileStore` in a temp directory, the same
//! adapter the runtime wires in production.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use chrono::{TimeZone, Utc};

#[cfg(test)]
use teamforge_engine::ports::MockTimeSource;

#[cfg(test)]
use teamforge_engine::{
    EngineConfig, FormationApi, FormationService, JsonFileStore, LogNotifier, MatchScheduler,
    ParticipantStatus, ScheduleConfig, SchedulerState, TeamStatus,
};

/// Service over a fresh file store in `dir`, with a pinned clock.
#[cfg(test)]
fn file_service(dir: &tempfile::TempDir) -> FormationService<JsonFileStore> {
    let store = JsonFileStore::open(dir.path().join("state.json")).unwrap();
    let clock = Arc::new(MockTimeSource::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
    ));
    FormationService::new(store, EngineConfig::default(), clock).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_round_disband_round_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let svc = file_service(&dir);

        for id in 1..=9 {
            svc.enqueue(id).unwrap();
        }

        // First round: one team of seven, two stay waiting.
        let first = svc.run_matching_round().unwrap();
        assert_eq!(first.created.len(), 1);
        assert_eq!(first.created[0].id, "T-1");
        assert_eq!(first.created[0].members, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(svc.queue_preview(10).unwrap(), vec![8, 9]);

        // Priority re-entry: released members line up ahead of 8 and 9.
        let released = svc.disband("T-1", true).unwrap();
        assert_eq!(released, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            svc.queue_preview(10).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
        );
        assert_eq!(
            svc.get_team("T-1").unwrap().unwrap().status,
            TeamStatus::Archived
        );

        // Second round resumes the counter and reforms from the full queue.
        let second = svc.run_matching_round().unwrap();
        assert_eq!(second.created.len(), 1);
        assert_eq!(second.created[0].id, "T-2");
        assert_eq!(second.created[0].members, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(svc.queue_preview(10).unwrap(), vec![8, 9]);
    }

    #[test]
    fn member_removal_then_reenqueue_via_the_public_api() {
        let dir = tempfile::tempdir().unwrap();
        let svc = file_service(&dir);

        for id in 1..=5 {
            svc.enqueue(id).unwrap();
        }
        svc.run_matching_round().unwrap();

        svc.remove_member("T-1", 2).unwrap();
        let participant = svc.get_participant(2).unwrap().unwrap();
        assert_eq!(participant.status, ParticipantStatus::Waiting);
        // Re-entry is explicit.
        assert_eq!(svc.position_of(2).unwrap(), None);
        svc.enqueue(2).unwrap();
        assert_eq!(svc.position_of(2).unwrap(), Some(0));
    }

    #[test]
    fn conservation_across_a_full_round() {
        let dir = tempfile::tempdir().unwrap();
        let svc = file_service(&dir);

        for id in 1..=23 {
            svc.enqueue(id).unwrap();
        }
        let report = svc.run_matching_round().unwrap();

        let placed: usize = report.created.iter().map(|t| t.members.len()).sum();
        assert_eq!(placed + report.remaining, 23);
        for team in &report.created {
            assert!(team.members.len() >= 5 && team.members.len() <= 7);
        }
    }

    #[tokio::test]
    async fn manual_trigger_and_scheduler_share_one_engine() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(file_service(&dir));
        for id in 1..=5 {
            svc.enqueue(id).unwrap();
        }

        let scheduler = Arc::new(
            MatchScheduler::new(
                Arc::clone(&svc) as Arc<dyn FormationApi>,
                Arc::new(LogNotifier),
                ScheduleConfig::default(),
            )
            .unwrap(),
        );

        let (tx, rx) = tokio::sync::watch::channel(false);
        let loop_task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(rx).await })
        };

        // While the loop waits for its cadence boundary, an admin triggers a
        // round manually through the same path.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let report = scheduler.run_round_now().await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(svc.queue_size().unwrap(), 0);

        // The manual round did not disturb the scheduled occurrence.
        assert!(matches!(
            scheduler.status().state,
            SchedulerState::Waiting { .. }
        ));
        assert!(scheduler.status().next_run_at.is_some());

        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(2), loop_task)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
    }
}
