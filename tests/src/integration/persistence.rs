//! Durability across restarts and recovery from corrupt state.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use chrono::{TimeZone, Utc};

#[cfg(test)]
use teamforge_engine::ports::{DocumentStore, MockTimeSource};

#[cfg(test)]
use teamforge_engine::{
    EngineConfig, FormationApi, FormationService, JsonFileStore, StateDocument,
};

#[cfg(test)]
fn service_at(path: &std::path::Path) -> FormationService<JsonFileStore> {
    let store = JsonFileStore::open(path).unwrap();
    let clock = Arc::new(MockTimeSource::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
    ));
    FormationService::new(store, EngineConfig::default(), clock).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_restarted_process_sees_identical_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let svc = service_at(&path);
            for id in 1..=8 {
                svc.enqueue(id).unwrap();
            }
            svc.run_matching_round().unwrap();
        } // process "exits"

        let svc = service_at(&path);
        let team = svc.get_team("T-1").unwrap().unwrap();
        assert_eq!(team.members, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(svc.queue_preview(10).unwrap(), vec![8]);

        // The counter resumes where it left off.
        for id in 20..=24 {
            svc.enqueue(id).unwrap();
        }
        let report = svc.run_matching_round().unwrap();
        assert_eq!(report.created[0].id, "T-2");
    }

    #[test]
    fn corrupt_state_file_recovers_to_an_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let svc = service_at(&path);
            for id in 1..=5 {
                svc.enqueue(id).unwrap();
            }
        }

        std::fs::write(&path, b"\x00\x01 not a document").unwrap();

        // The engine keeps running on a fresh document instead of aborting.
        let svc = service_at(&path);
        assert_eq!(svc.queue_size().unwrap(), 0);
        svc.enqueue(42).unwrap();
        assert_eq!(svc.queue_preview(10).unwrap(), vec![42]);
    }

    #[test]
    fn saves_never_leave_a_partial_document_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let svc = service_at(&path);
        for id in 1..=12 {
            svc.enqueue(id).unwrap();
        }
        svc.run_matching_round().unwrap();

        // No temp artifact, and the on-disk document parses as a whole.
        assert!(!path.with_extension("tmp").exists());
        let mut store = JsonFileStore::open(&path).unwrap();
        let doc = store.load().unwrap();
        assert_eq!(doc.teams.len(), 2);
        assert_eq!(doc.counters.team_seq, 2);
    }

    #[test]
    fn the_document_layout_is_stable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let svc = service_at(&path);
        svc.enqueue(1).unwrap();
        svc.create_question(1, "who picks the team name?").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        for field in ["participants", "queue", "teams", "counters", "questions"] {
            assert!(raw.contains(field), "missing field {field}");
        }

        // And it round-trips through the typed document.
        let doc: StateDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc.queue, vec![1]);
    }
}
