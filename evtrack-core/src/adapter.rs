//! The seam between reconciliation and the calendar that receives entries.
//!
//! Implementations must accept repeated `create` calls without deduplicating
//! (the reconciler decides what is new) and must treat deleting an entry that
//! is already gone as success.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;

/// Opaque identifier the remote calendar assigned to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn new(id: impl Into<String>) -> Self {
        Handle(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a create or delete did not go through.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Remote request failed: {0}")]
    Transient(String),

    #[error("Remote request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    NotInstalled(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Create a calendar entry for `event` and return its handle.
    async fn create(&self, event: &Event) -> Result<Handle, AdapterError>;

    /// Delete the entry behind `handle`. Already-deleted entries are `Ok`.
    async fn delete(&self, handle: &Handle) -> Result<(), AdapterError>;
}

/// Adapter for runs with sync turned off. Every call is refused.
pub struct Offline;

#[async_trait]
impl SyncAdapter for Offline {
    async fn create(&self, _event: &Event) -> Result<Handle, AdapterError> {
        Err(AdapterError::NotInstalled("Calendar sync is disabled".into()))
    }

    async fn delete(&self, _handle: &Handle) -> Result<(), AdapterError> {
        Err(AdapterError::NotInstalled("Calendar sync is disabled".into()))
    }
}
