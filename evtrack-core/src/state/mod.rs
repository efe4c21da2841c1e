//! Persisted tracking state.
//!
//! The store maps each fingerprint seen in a previous run to the handle of
//! the calendar entry created for it, or to nothing when no entry exists
//! (sync disabled, or the create call failed).
//!
//! Loading never fails: a missing file is a first run, an unreadable one is
//! logged and treated as empty. Saving can fail, and callers that must not
//! abort use [`StateStore::checkpoint`], which logs instead of returning.

mod document;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::adapter::Handle;
use crate::error::EvTrackResult;
use crate::fingerprint::Fingerprint;

use document::{RecordMap, SavedDocument, StoredDocument};

pub struct StateStore {
    path: Option<PathBuf>,
    records: RecordMap,
    last_updated: Option<DateTime<Utc>>,
}

impl StateStore {
    /// Load the state document at `path`.
    pub fn load(path: impl Into<PathBuf>) -> StateStore {
        let path = path.into();
        let mut store = StateStore {
            path: Some(path.clone()),
            records: RecordMap::new(),
            last_updated: None,
        };

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Could not create state directory");
            }
            tracing::debug!(path = %path.display(), "No state file, starting empty");
            return store;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read state file, starting empty");
                return store;
            }
        };

        match serde_json::from_str::<StoredDocument>(&content) {
            Ok(doc) => {
                let decoded = doc.normalize();
                if decoded.legacy {
                    tracing::info!(
                        path = %path.display(),
                        records = decoded.records.len(),
                        "Upgrading legacy state file (handles default to none)"
                    );
                }
                store.records = decoded.records;
                store.last_updated = decoded.last_updated;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "State file is corrupt, starting empty");
            }
        }

        store
    }

    /// A store with no backing file. `save` only stamps the timestamp.
    pub fn in_memory() -> StateStore {
        StateStore {
            path: None,
            records: RecordMap::new(),
            last_updated: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Write the full map to disk, replacing the previous document atomically.
    pub fn save(&mut self) -> EvTrackResult<()> {
        let now = Utc::now();

        if let Some(path) = &self.path {
            let doc = SavedDocument {
                last_updated: now,
                event_map: &self.records,
            };
            let content = serde_json::to_string_pretty(&doc)?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }

            let mut temp = path.clone().into_os_string();
            temp.push(".tmp");
            let temp = PathBuf::from(temp);

            std::fs::write(&temp, content)?;
            std::fs::rename(&temp, path)?;
        }

        self.last_updated = Some(now);
        Ok(())
    }

    /// Save, logging failures instead of returning them.
    ///
    /// Returns whether the write landed. The in-memory map stays authoritative
    /// either way.
    pub fn checkpoint(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                let path = self
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                tracing::error!(path = %path, error = %e, "Failed to save state, next run will redo this work");
                false
            }
        }
    }

    pub fn put(&mut self, fingerprint: Fingerprint, handle: Option<Handle>) {
        self.records.insert(fingerprint, handle);
    }

    /// Drop a record, returning its handle if it had one.
    pub fn remove(&mut self, fingerprint: &Fingerprint) -> Option<Handle> {
        self.records.remove(fingerprint).flatten()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Handle> {
        self.records.get(fingerprint).and_then(Option::as_ref)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records.contains_key(fingerprint)
    }

    pub fn all_fingerprints(&self) -> BTreeSet<Fingerprint> {
        self.records.keys().cloned().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = (&Fingerprint, Option<&Handle>)> {
        self.records.iter().map(|(fp, h)| (fp, h.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
