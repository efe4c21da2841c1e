//! Reconciliation of an event snapshot against tracked state.
//!
//! Each run the caller hands over the complete list of events that should
//! exist right now. Anything new gets a calendar entry, anything tracked but
//! absent from the list has its entry deleted and its record dropped. There is
//! no notion of an update: a renamed or rescheduled event is a new identity,
//! so the old entry is deleted and a new one created.
//!
//! The list is trusted as a full snapshot. An empty or wrongly filtered list
//! deletes every tracked entry it leaves out.

mod diff_kind;
mod plan;
mod report;

pub use diff_kind::DiffKind;
pub use plan::{Plan, PlannedCreate, PlannedDelete, ReconcileOptions, SavePolicy};
pub use report::ReconcileReport;

use crate::adapter::SyncAdapter;
use crate::event::Event;
use crate::state::StateStore;

/// Compute and apply the plan for `events` in one go.
pub async fn reconcile<A>(
    events: &[Event],
    store: &mut StateStore,
    adapter: &A,
    options: &ReconcileOptions,
) -> ReconcileReport
where
    A: SyncAdapter + ?Sized,
{
    let plan = Plan::compute(events, store);
    tracing::debug!(
        to_create = plan.to_create.len(),
        to_delete = plan.to_delete.len(),
        unchanged = plan.unchanged,
        "Computed reconcile plan"
    );
    plan.apply(store, adapter, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{Call, ScriptedAdapter};
    use crate::adapter::{AdapterError, Handle};
    use crate::fingerprint::Fingerprint;
    use chrono::{TimeZone, Utc};

    fn event(title: &str, day: u32, venue: &str) -> Event {
        Event::new(
            title,
            Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            venue,
            "test",
        )
    }

    fn a() -> Event {
        event("Run Club", 10, "Parkside")
    }

    fn b() -> Event {
        event("Ice Skating", 12, "Lakeside")
    }

    fn c() -> Event {
        event("New Event", 20, "Zoo")
    }

    fn fp(e: &Event) -> Fingerprint {
        Fingerprint::of(e)
    }

    fn opts() -> ReconcileOptions {
        ReconcileOptions::default()
    }

    #[tokio::test]
    async fn test_two_run_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_memory.json");
        let mut store = StateStore::load(&path);

        // Run 1
        let adapter = ScriptedAdapter::new();
        let report = reconcile(&[a(), b()], &mut store, &adapter, &opts()).await;

        assert_eq!((report.created, report.deleted, report.unchanged), (2, 0, 0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&fp(&a())), Some(&Handle::new("h1")));
        assert_eq!(store.get(&fp(&b())), Some(&Handle::new("h2")));
        assert_eq!(report.new_fingerprints, vec![fp(&a()), fp(&b())]);

        // Run 2, from a fresh load of what run 1 saved
        let mut store = StateStore::load(&path);
        let adapter = ScriptedAdapter::starting_after(2);
        let report = reconcile(&[a(), c()], &mut store, &adapter, &opts()).await;

        assert_eq!((report.created, report.deleted, report.unchanged), (1, 1, 1));
        assert_eq!(adapter.creates(), vec!["New Event".to_string()]);
        assert_eq!(adapter.deletes(), vec![Handle::new("h2")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&fp(&a())), Some(&Handle::new("h1")));
        assert_eq!(store.get(&fp(&c())), Some(&Handle::new("h3")));
        assert!(!store.contains(&fp(&b())));

        let reloaded = StateStore::load(&path);
        assert_eq!(reloaded.all_fingerprints(), store.all_fingerprints());
    }

    #[tokio::test]
    async fn test_unchanged_snapshot_is_noop() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();
        let events = [a(), b(), c()];

        reconcile(&events, &mut store, &adapter, &opts()).await;
        let second = reconcile(&events, &mut store, &adapter, &opts()).await;

        assert!(second.is_noop());
        assert_eq!(second.unchanged, 3);
        assert_eq!(adapter.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_removed_event_is_deleted_exactly_once() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();

        reconcile(&[a(), b()], &mut store, &adapter, &opts()).await;
        reconcile(&[a()], &mut store, &adapter, &opts()).await;
        reconcile(&[a()], &mut store, &adapter, &opts()).await;

        assert!(!store.contains(&fp(&b())));
        assert_eq!(adapter.deletes(), vec![Handle::new("h2")]);
    }

    #[tokio::test]
    async fn test_delete_failure_still_forgets_record() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new().fail_delete_for("h2");

        reconcile(&[a(), b()], &mut store, &adapter, &opts()).await;
        let report = reconcile(&[a()], &mut store, &adapter, &opts()).await;

        assert_eq!(report.deleted, 1);
        assert_eq!(report.delete_calls, 1);
        assert_eq!(report.delete_failures, 1);
        assert!(!store.contains(&fp(&b())));
        assert!(report.had_failures());
    }

    #[tokio::test]
    async fn test_create_failure_records_null_handle() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new().fail_create_for("Ice Skating");

        let report = reconcile(&[a(), b(), c()], &mut store, &adapter, &opts()).await;

        assert_eq!(report.created, 3);
        assert_eq!(report.create_failures, 1);
        assert!(store.contains(&fp(&b())));
        assert_eq!(store.get(&fp(&b())), None);
        // The failure does not block the events after it
        assert_eq!(store.get(&fp(&c())), Some(&Handle::new("h2")));

        // Not retried next run, and no delete call when it vanishes
        let again = reconcile(&[a(), c()], &mut store, &adapter, &opts()).await;
        assert_eq!(again.created, 0);
        assert_eq!(again.deleted, 1);
        assert_eq!(again.delete_calls, 0);
        assert_eq!(adapter.creates().len(), 3);
    }

    #[tokio::test]
    async fn test_same_run_duplicates_create_once() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();
        let mut duplicate = a();
        duplicate.title = "RUN CLUB".to_string();
        duplicate.description = Some("Listed twice by another source".to_string());

        let report = reconcile(&[a(), duplicate], &mut store, &adapter, &opts()).await;

        assert_eq!(report.created, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(adapter.creates(), vec!["Run Club".to_string()]);
    }

    #[tokio::test]
    async fn test_rescheduled_event_is_replaced() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();

        reconcile(&[a()], &mut store, &adapter, &opts()).await;
        let moved = event("Run Club", 11, "Parkside");
        let report = reconcile(&[moved.clone()], &mut store, &adapter, &opts()).await;

        assert_eq!((report.created, report.deleted), (1, 1));
        assert_eq!(
            adapter.calls(),
            vec![
                Call::Create("Run Club".into()),
                Call::Create("Run Club".into()),
                Call::Delete(Handle::new("h1")),
            ]
        );
        assert_eq!(store.get(&fp(&moved)), Some(&Handle::new("h2")));
    }

    #[tokio::test]
    async fn test_empty_snapshot_deletes_everything() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();

        reconcile(&[a(), b(), c()], &mut store, &adapter, &opts()).await;
        let report = reconcile(&[], &mut store, &adapter, &opts()).await;

        assert_eq!(report.deleted, 3);
        assert!(store.is_empty());
        assert_eq!(adapter.deletes().len(), 3);
    }

    #[tokio::test]
    async fn test_sync_disabled_still_tracks() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();
        let disabled = ReconcileOptions {
            sync_enabled: false,
            ..opts()
        };

        let report = reconcile(&[a(), b()], &mut store, &adapter, &disabled).await;
        assert_eq!(report.created, 2);
        assert_eq!(store.len(), 2);
        assert!(store.records().all(|(_, handle)| handle.is_none()));

        let report = reconcile(&[a()], &mut store, &adapter, &disabled).await;
        assert_eq!(report.deleted, 1);
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_sync_skips_delete_of_existing_handle() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();

        reconcile(&[a(), b()], &mut store, &adapter, &opts()).await;
        let disabled = ReconcileOptions {
            sync_enabled: false,
            ..opts()
        };
        let report = reconcile(&[a()], &mut store, &adapter, &disabled).await;

        assert_eq!(report.deleted, 1);
        assert_eq!(report.delete_calls, 0);
        assert!(adapter.deletes().is_empty());
        assert!(!store.contains(&fp(&b())));
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let mut store = StateStore::in_memory();
        store.put(fp(&b()), Some(Handle::new("h9")));
        let events = [a(), a()];

        let plan = Plan::compute(&events, &store);

        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.unchanged, 1);
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].handle, Some(Handle::new("h9")));
        assert_eq!(store.len(), 1);

        let rendered = plan.to_string();
        assert!(rendered.contains("+ "));
        assert!(rendered.contains("(entry h9)"));
        assert!(rendered.ends_with("1 to create, 1 to delete, 1 unchanged"));
    }

    #[test]
    fn test_plan_renders_legacy_ids_that_are_not_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_memory.json");
        std::fs::write(&path, r#"{"processed_ids": ["aéééééééé"]}"#).unwrap();
        let store = StateStore::load(&path);

        let rendered = Plan::compute(&[], &store).to_string();

        assert!(rendered.contains("- aééééééé (no entry)"));
        assert!(rendered.ends_with("0 to create, 1 to delete, 0 unchanged"));
    }

    /// Adapter that reads the state file back from disk on every call.
    struct DiskWatcher {
        path: std::path::PathBuf,
        seen: std::sync::Mutex<Vec<usize>>,
        inner: ScriptedAdapter,
    }

    impl DiskWatcher {
        fn new(path: &std::path::Path) -> Self {
            DiskWatcher {
                path: path.to_path_buf(),
                seen: Default::default(),
                inner: ScriptedAdapter::new(),
            }
        }

        fn record(&self) {
            let on_disk = StateStore::load(&self.path).len();
            self.seen.lock().unwrap().push(on_disk);
        }
    }

    #[async_trait::async_trait]
    impl SyncAdapter for DiskWatcher {
        async fn create(&self, event: &Event) -> Result<Handle, AdapterError> {
            self.record();
            self.inner.create(event).await
        }

        async fn delete(&self, handle: &Handle) -> Result<(), AdapterError> {
            self.record();
            self.inner.delete(handle).await
        }
    }

    #[tokio::test]
    async fn test_every_mutation_is_on_disk_before_next_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_memory.json");
        let mut store = StateStore::load(&path);
        store.put(fp(&b()), Some(Handle::new("h9")));
        store.save().unwrap();

        let adapter = DiskWatcher::new(&path);
        let report = reconcile(&[a(), c()], &mut store, &adapter, &opts()).await;

        assert_eq!((report.created, report.deleted), (2, 1));
        // create a, create c, delete b
        assert_eq!(*adapter.seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(StateStore::load(&path).len(), 2);
    }

    #[tokio::test]
    async fn test_end_of_run_policy_defers_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_memory.json");
        let mut store = StateStore::load(&path);
        store.put(fp(&b()), Some(Handle::new("h9")));
        store.save().unwrap();

        let adapter = DiskWatcher::new(&path);
        let options = ReconcileOptions {
            save_policy: SavePolicy::EndOfRun,
            ..opts()
        };
        reconcile(&[a(), c()], &mut store, &adapter, &options).await;

        assert_eq!(*adapter.seen.lock().unwrap(), vec![1, 1, 1]);
        assert_eq!(StateStore::load(&path).len(), 2);
    }

    #[tokio::test]
    async fn test_stale_plan_does_not_create_twice() {
        let mut store = StateStore::in_memory();
        let adapter = ScriptedAdapter::new();
        let events = [a()];

        let plan = Plan::compute(&events, &store);
        store.put(fp(&a()), Some(Handle::new("h0")));
        let report = plan.apply(&mut store, &adapter, &opts()).await;

        assert_eq!(report.created, 0);
        assert_eq!(report.unchanged, 1);
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_end_of_run_policy_saves_final_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_memory.json");
        let mut store = StateStore::load(&path);
        let adapter = ScriptedAdapter::new();
        let options = ReconcileOptions {
            save_policy: SavePolicy::EndOfRun,
            ..opts()
        };

        reconcile(&[a(), b()], &mut store, &adapter, &options).await;
        reconcile(&[b(), c()], &mut store, &adapter, &options).await;

        let reloaded = StateStore::load(&path);
        assert_eq!(
            reloaded.all_fingerprints(),
            [fp(&b()), fp(&c())].into_iter().collect()
        );
        assert_eq!(reloaded.get(&fp(&c())), Some(&Handle::new("h3")));
    }
}
