use std::path::{Path, PathBuf};

use anyhow::Result;
use evtrack_core::adapter::Offline;
use evtrack_core::config::EvTrackConfig;
use evtrack_core::remote::ProviderAdapter;
use evtrack_core::{SyncAdapter, reconcile};

use super::{open_store, read_events};

pub async fn run(
    cfg: &EvTrackConfig,
    events_path: &Path,
    state: Option<PathBuf>,
    no_sync: bool,
) -> Result<()> {
    let events = read_events(cfg, events_path)?;
    let mut store = open_store(cfg, state);

    let mut options = cfg.reconcile_options();
    if no_sync {
        options.sync_enabled = false;
    }

    let adapter: Box<dyn SyncAdapter> = if options.sync_enabled {
        let Some(remote) = cfg.remote.clone() else {
            anyhow::bail!(
                "Calendar sync is enabled but no [remote] is configured.\n\n\
                Add one to config.toml:\n\n\
                [remote]\n\
                provider = \"google\"\n\n\
                or run with --no-sync to only track events."
            );
        };
        Box::new(ProviderAdapter::new(remote)?)
    } else {
        Box::new(Offline)
    };

    println!(
        "Reconciling {} events against {} tracked",
        events.len(),
        store.len()
    );

    let report = reconcile(&events, &mut store, adapter.as_ref(), &options).await;

    println!("{report}");

    if report.had_failures() {
        println!(
            "{} create failures, {} delete failures, {} state writes failed (see log)",
            report.create_failures, report.delete_failures, report.save_failures
        );
    }

    Ok(())
}
