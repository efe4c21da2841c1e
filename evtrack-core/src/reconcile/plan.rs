//! Diff computation and application.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter::{Handle, SyncAdapter};
use crate::event::Event;
use crate::fingerprint::Fingerprint;
use crate::reconcile::{DiffKind, ReconcileReport};
use crate::state::StateStore;

/// When the state file is written during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// After every create and delete, so a crash loses at most one action.
    #[default]
    EveryMutation,
    /// Once, after all actions.
    EndOfRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// When false, records are still kept but no remote call is made.
    pub sync_enabled: bool,
    pub save_policy: SavePolicy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            sync_enabled: true,
            save_policy: SavePolicy::default(),
        }
    }
}

pub struct PlannedCreate<'a> {
    pub fingerprint: Fingerprint,
    pub event: &'a Event,
}

pub struct PlannedDelete {
    pub fingerprint: Fingerprint,
    pub handle: Option<Handle>,
}

/// The difference between this run's snapshot and the tracked state.
pub struct Plan<'a> {
    pub to_create: Vec<PlannedCreate<'a>>,
    pub to_delete: Vec<PlannedDelete>,
    pub unchanged: usize,
    current: BTreeSet<Fingerprint>,
}

impl<'a> Plan<'a> {
    /// Compare `events` against `store` without touching either.
    ///
    /// The snapshot is taken as the complete truth: every tracked fingerprint
    /// missing from `events` is planned for deletion. An upstream filter that
    /// narrows the snapshot by mistake therefore deletes real entries.
    pub fn compute(events: &'a [Event], store: &StateStore) -> Self {
        let mut current = BTreeSet::new();
        let mut to_create = Vec::new();
        let mut planned = HashSet::new();
        let mut unchanged = 0;

        for event in events {
            let fingerprint = event.fingerprint();
            current.insert(fingerprint.clone());

            // First occurrence wins for same-run duplicates
            if store.contains(&fingerprint) || planned.contains(&fingerprint) {
                unchanged += 1;
                continue;
            }

            planned.insert(fingerprint.clone());
            to_create.push(PlannedCreate { fingerprint, event });
        }

        let to_delete = store
            .all_fingerprints()
            .into_iter()
            .filter(|fp| !current.contains(fp))
            .map(|fingerprint| PlannedDelete {
                handle: store.get(&fingerprint).cloned(),
                fingerprint,
            })
            .collect();

        Plan {
            to_create,
            to_delete,
            unchanged,
            current,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }

    /// Execute the plan: create new entries, then delete vanished ones.
    ///
    /// Each remote call is awaited before its record is written. A failed
    /// create is recorded without a handle and is not retried next run. A
    /// failed delete still drops the record.
    pub async fn apply<A>(
        self,
        store: &mut StateStore,
        adapter: &A,
        options: &ReconcileOptions,
    ) -> ReconcileReport
    where
        A: SyncAdapter + ?Sized,
    {
        let mut report = ReconcileReport {
            unchanged: self.unchanged,
            ..ReconcileReport::default()
        };

        if self.current.is_empty() && !store.is_empty() {
            tracing::warn!(
                tracked = store.len(),
                "Snapshot is empty, every tracked entry will be deleted"
            );
        }

        let mut mutated = false;

        for PlannedCreate { fingerprint, event } in self.to_create {
            if store.contains(&fingerprint) {
                // Store changed since the plan was computed
                report.unchanged += 1;
                continue;
            }

            let handle = if options.sync_enabled {
                match adapter.create(event).await {
                    Ok(handle) => {
                        tracing::info!(fingerprint = %fingerprint, handle = %handle, title = %event.title, "Created calendar entry");
                        Some(handle)
                    }
                    Err(e) => {
                        tracing::warn!(fingerprint = %fingerprint, title = %event.title, error = %e, "Create failed, tracking without handle");
                        report.create_failures += 1;
                        None
                    }
                }
            } else {
                None
            };

            store.put(fingerprint.clone(), handle);
            report.created += 1;
            report.new_fingerprints.push(fingerprint);
            mutated = true;

            if options.save_policy == SavePolicy::EveryMutation && !store.checkpoint() {
                report.save_failures += 1;
            }
        }

        for PlannedDelete {
            fingerprint,
            handle,
        } in self.to_delete
        {
            if let Some(handle) = handle.filter(|_| options.sync_enabled) {
                report.delete_calls += 1;
                match adapter.delete(&handle).await {
                    Ok(()) => {
                        tracing::info!(fingerprint = %fingerprint, handle = %handle, "Deleted calendar entry");
                    }
                    Err(e) => {
                        tracing::warn!(fingerprint = %fingerprint, handle = %handle, error = %e, "Delete failed, forgetting entry anyway");
                        report.delete_failures += 1;
                    }
                }
            }

            store.remove(&fingerprint);
            report.deleted += 1;
            mutated = true;

            if options.save_policy == SavePolicy::EveryMutation && !store.checkpoint() {
                report.save_failures += 1;
            }
        }

        if mutated && options.save_policy == SavePolicy::EndOfRun && !store.checkpoint() {
            report.save_failures += 1;
        }

        report
    }
}

impl fmt::Display for Plan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for create in &self.to_create {
            writeln!(
                f,
                "{} {} {}",
                DiffKind::Create,
                create.fingerprint.short(),
                create.event
            )?;
        }
        for delete in &self.to_delete {
            match &delete.handle {
                Some(handle) => writeln!(
                    f,
                    "{} {} (entry {})",
                    DiffKind::Delete,
                    delete.fingerprint.short(),
                    handle
                )?,
                None => writeln!(
                    f,
                    "{} {} (no entry)",
                    DiffKind::Delete,
                    delete.fingerprint.short()
                )?,
            }
        }
        write!(
            f,
            "{} to create, {} to delete, {} unchanged",
            self.to_create.len(),
            self.to_delete.len(),
            self.unchanged
        )
    }
}
