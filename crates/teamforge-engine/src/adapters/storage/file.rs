//! JSON file-backed state store.
//!
//! Persists the whole [`StateDocument`] as pretty-printed JSON at a single
//! path. Saves go through a temp file plus an atomic rename, so a crash
//! mid-write never leaves a torn document behind. An undecodable file is
//! treated as data loss: the store logs it, re-initializes an empty default
//! document, and keeps running.

use crate::domain::{StateDocument, StoreError};
use crate::ports::outbound::DocumentStore;
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed store holding the state document as JSON.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens a store at `path`, initializing an empty document on first use.
    ///
    /// # Errors
    /// `StoreError::Unavailable` if the parent directory cannot be created
    /// or the initial document cannot be written.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self { path };

        match fs::metadata(&store.path) {
            Ok(meta) => {
                tracing::info!(
                    "[store] found existing state file: {} ({} bytes)",
                    store.path.display(),
                    meta.len()
                );
            }
            Err(_) => {
                tracing::info!(
                    "[store] no state file at {}, initializing empty document",
                    store.path.display()
                );
                store.save(&StateDocument::default())?;
            }
        }

        Ok(store)
    }

    /// The path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> Result<StateDocument, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
            detail: e.to_string(),
        })
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::unavailable)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let result = (|| {
            use std::io::Write;
            let mut file = fs::File::create(&tmp_path).map_err(StoreError::unavailable)?;
            file.write_all(bytes).map_err(StoreError::unavailable)?;
            file.sync_all().map_err(StoreError::unavailable)?;
            fs::rename(&tmp_path, &self.path).map_err(StoreError::unavailable)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&mut self) -> Result<StateDocument, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Someone deleted the file out from under us; start fresh.
                let doc = StateDocument::default();
                self.save(&doc)?;
                return Ok(doc);
            }
            Err(e) => return Err(StoreError::unavailable(e)),
        };

        match Self::decode(&bytes) {
            Ok(doc) => Ok(doc),
            Err(StoreError::Corrupt { detail }) => {
                tracing::error!(
                    "[store] state file {} is corrupt ({detail}); \
                     re-initializing empty document, previous data is lost",
                    self.path.display()
                );
                let doc = StateDocument::default();
                self.save(&doc)?;
                Ok(doc)
            }
            Err(other) => Err(other),
        }
    }

    fn save(&mut self, doc: &StateDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Serialize {
            detail: e.to_string(),
        })?;
        self.write_atomic(&bytes)
    }
}
