//! evtrack configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{EvTrackError, EvTrackResult};
use crate::reconcile::{ReconcileOptions, SavePolicy};

static DEFAULT_STATE_PATH: &str = "~/.local/share/evtrack/event_memory.json";
static DEFAULT_TIME_ZONE: &str = "America/New_York";
/// One week ahead
const DEFAULT_REMINDER_MINUTES: i64 = 10080;

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

fn default_true() -> bool {
    true
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_reminder_minutes() -> i64 {
    DEFAULT_REMINDER_MINUTES
}

/// Global configuration at ~/.config/evtrack/config.toml
///
/// Every key can be overridden with an `EVTRACK_`-prefixed environment
/// variable, e.g. `EVTRACK_SYNC_ENABLED=false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvTrackConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Whether to call the remote calendar at all
    #[serde(default = "default_true")]
    pub sync_enabled: bool,

    #[serde(default)]
    pub save_policy: SavePolicy,

    /// Drop events that started before today before reconciling
    #[serde(default = "default_true")]
    pub upcoming_only: bool,

    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Remote provider settings (e.g. Google Calendar).
///
/// `provider` selects the `evtrack-provider-{name}` binary. Keys other than
/// the ones below are passed through to the provider untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub provider: String,

    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Popup reminder offset in minutes; 0 disables it
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: i64,

    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

impl EvTrackConfig {
    pub fn config_path() -> EvTrackResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EvTrackError::Config("Could not determine config directory".into()))?
            .join("evtrack");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, creating a commented default file on first use.
    pub fn load() -> EvTrackResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> EvTrackResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("EVTRACK").try_parsing(true))
            .build()
            .map_err(|e| EvTrackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EvTrackError::Config(e.to_string()))
    }

    /// State file location with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.state_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// IANA zone used for calendar entries and for deciding what "today" is.
    pub fn time_zone(&self) -> &str {
        self.remote
            .as_ref()
            .map(|r| r.time_zone.as_str())
            .unwrap_or(DEFAULT_TIME_ZONE)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            sync_enabled: self.sync_enabled,
            save_policy: self.save_policy,
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EvTrackResult<()> {
        let contents = format!(
            "\
# evtrack configuration

# Where tracked events are remembered between runs:
# state_path = \"{DEFAULT_STATE_PATH}\"

# Set to false to keep tracking events without touching the calendar:
# sync_enabled = true

# \"every_mutation\" or \"end_of_run\":
# save_policy = \"every_mutation\"

# Ignore events that started before today:
# upcoming_only = true

# [remote]
# provider = \"google\"
# time_zone = \"{DEFAULT_TIME_ZONE}\"
# reminder_minutes = {DEFAULT_REMINDER_MINUTES}
# google_calendar_id = \"primary\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EvTrackError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EvTrackError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
