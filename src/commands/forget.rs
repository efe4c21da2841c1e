use std::path::PathBuf;

use anyhow::{Context, Result};
use evtrack_core::Fingerprint;
use evtrack_core::config::EvTrackConfig;

use super::open_store;

pub fn run(cfg: &EvTrackConfig, fingerprint: &str, state: Option<PathBuf>) -> Result<()> {
    let fingerprint = Fingerprint::parse(fingerprint)?;
    let mut store = open_store(cfg, state);

    if !store.contains(&fingerprint) {
        anyhow::bail!("{} is not tracked", fingerprint);
    }

    let handle = store.remove(&fingerprint);
    store.save().context("Failed to save state")?;

    match handle {
        Some(handle) => println!(
            "Forgot {} (calendar entry {} left in place)",
            fingerprint, handle
        ),
        None => println!("Forgot {}", fingerprint),
    }

    Ok(())
}
