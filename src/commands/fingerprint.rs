use std::path::Path;

use anyhow::Result;
use evtrack_core::config::EvTrackConfig;

use super::read_events;

pub fn run(cfg: &EvTrackConfig, events_path: &Path) -> Result<()> {
    for event in read_events(cfg, events_path)? {
        println!("{}  {}", event.fingerprint(), event);
    }

    Ok(())
}
