use std::fmt;

use serde::Serialize;

use crate::fingerprint::Fingerprint;

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Fingerprints recorded for the first time this run
    pub created: usize,
    /// Tracking records dropped because their event disappeared
    pub deleted: usize,
    /// Events that were already tracked (including same-run duplicates)
    pub unchanged: usize,

    /// Creates that reached the remote but failed (recorded without a handle)
    pub create_failures: usize,
    /// Deletes actually sent to the remote
    pub delete_calls: usize,
    /// Deletes that failed (record dropped anyway)
    pub delete_failures: usize,
    /// State writes that did not land
    pub save_failures: usize,

    /// Newly tracked fingerprints, in input order
    pub new_fingerprints: Vec<Fingerprint>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.deleted == 0
    }

    pub fn had_failures(&self) -> bool {
        self.create_failures > 0 || self.delete_failures > 0 || self.save_failures > 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} deleted, {} unchanged",
            self.created, self.deleted, self.unchanged
        )
    }
}
