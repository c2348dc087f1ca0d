//! In-memory state store for unit tests.

use crate::domain::{StateDocument, StoreError};
use crate::ports::outbound::DocumentStore;

/// Holds the document in memory. Supports injected save failures so tests
/// can prove that a failed round leaves the previous snapshot intact.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    doc: StateDocument,
    fail_next_save: bool,
    saves: u64,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `doc`.
    pub fn with_document(doc: StateDocument) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    /// Makes the next `save` fail with `StoreError::Unavailable`.
    pub fn fail_next_save(&mut self) {
        self.fail_next_save = true;
    }

    /// Number of successful saves, for asserting transaction boundaries.
    pub fn save_count(&self) -> u64 {
        self.saves
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&mut self) -> Result<StateDocument, StoreError> {
        Ok(self.doc.clone())
    }

    fn save(&mut self, doc: &StateDocument) -> Result<(), StoreError> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(StoreError::Unavailable {
                detail: "injected save failure".to_string(),
            });
        }
        self.doc = doc.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let mut store = InMemoryStore::new();
        let mut doc = StateDocument::default();
        doc.enqueue(5);
        store.save(&doc).unwrap();
        assert_eq!(store.load().unwrap(), doc);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn injected_failure_hits_exactly_once() {
        let mut store = InMemoryStore::new();
        let mut doc = StateDocument::default();
        doc.enqueue(5);

        store.fail_next_save();
        assert!(store.save(&doc).is_err());
        // Document is unchanged by the failed save.
        assert_eq!(store.load().unwrap(), StateDocument::default());

        store.save(&doc).unwrap();
        assert_eq!(store.load().unwrap(), doc);
    }
}
