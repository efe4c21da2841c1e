//! Reading the event list collectors hand over.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use evtrack_core::Event;

/// Read a JSON array of events.
pub fn load(path: &Path) -> Result<Vec<Event>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file at {}", path.display()))?;

    let events: Vec<Event> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse events file at {}", path.display()))?;

    Ok(events)
}

/// Keep events starting on or after the calendar day of `now`.
///
/// Days are taken in the zone of `now`. Past events drop out of the snapshot,
/// so reconciliation deletes their calendar entries and forgets them.
pub fn upcoming<Z: TimeZone>(events: Vec<Event>, now: &DateTime<Z>) -> Vec<Event> {
    let zone = now.timezone();
    let today = now.date_naive();

    events
        .into_iter()
        .filter(|e| e.start.with_timezone(&zone).date_naive() >= today)
        .collect()
}
