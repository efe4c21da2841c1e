pub mod fingerprint;
pub mod forget;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;
use evtrack_core::config::EvTrackConfig;
use evtrack_core::{Event, StateStore};

use crate::snapshot;

/// Load the state store, preferring a path given on the command line.
pub fn open_store(cfg: &EvTrackConfig, state_override: Option<PathBuf>) -> StateStore {
    let path = state_override.unwrap_or_else(|| cfg.state_path());
    StateStore::load(path)
}

/// Read a snapshot and apply the date window from config.
pub fn read_events(cfg: &EvTrackConfig, path: &Path) -> Result<Vec<Event>> {
    let events = snapshot::load(path)?;
    let total = events.len();

    if !cfg.upcoming_only {
        return Ok(events);
    }

    let zone: Tz = cfg
        .time_zone()
        .parse()
        .map_err(|e| anyhow!("Invalid time_zone '{}' in config: {e}", cfg.time_zone()))?;
    let events = snapshot::upcoming(events, &Utc::now().with_timezone(&zone));
    if events.len() < total {
        tracing::info!(
            dropped = total - events.len(),
            kept = events.len(),
            "Dropped events that already started"
        );
    }

    Ok(events)
}
