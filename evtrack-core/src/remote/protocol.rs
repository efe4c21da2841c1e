//! Defines the JSON protocol used between evtrack and provider binaries
//! over stdin/stdout.
//!
//! Each invocation receives one request line:
//!
//! ```text
//! {"command": "create_event", "params": {"remote_config": {...}, "entry": {...}}}
//! ```
//!
//! and answers with one response:
//!
//! ```text
//! {"status": "success", "data": {"id": "..."}}
//! {"status": "error", "error": "..."}
//! ```
//!
//! `delete_event` must answer success when the entry is already gone
//! (HTTP 404/410 on most calendar APIs).

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::remote::CalendarEntry;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateEvent,
    DeleteEvent,
}

/// Request sent from evtrack to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to evtrack.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub entry: CalendarEntry,
}

/// What a provider returns for a created entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEntry {
    pub id: String,
}

impl ProviderCommand for CreateEvent {
    type Response = CreatedEntry;
    fn command() -> Command {
        Command::CreateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}
