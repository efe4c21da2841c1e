use std::path::{Path, PathBuf};

use anyhow::Result;
use evtrack_core::Plan;
use evtrack_core::config::EvTrackConfig;

use super::{open_store, read_events};

pub fn run(cfg: &EvTrackConfig, events_path: &Path, state: Option<PathBuf>) -> Result<()> {
    let events = read_events(cfg, events_path)?;
    let store = open_store(cfg, state);

    let plan = Plan::compute(&events, &store);

    if plan.is_empty() {
        println!("Everything up to date ({} tracked).", store.len());
        return Ok(());
    }

    println!("{plan}");

    if !plan.to_delete.is_empty() && events.is_empty() {
        println!("\nThe snapshot is empty: a sync would delete every tracked entry.");
    }

    Ok(())
}
