//! On-disk layout of the state document.
//!
//! Two layouts exist in the wild:
//!
//! ```text
//! { "last_updated": "...", "event_map": { "<fingerprint>": "<handle>" | null } }
//! { "processed_ids": ["<fingerprint>", ...] }
//! ```
//!
//! The second one predates handle tracking. Both decode into the same
//! in-memory map; the legacy file is only rewritten on the next save.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapter::Handle;
use crate::fingerprint::Fingerprint;

pub type RecordMap = BTreeMap<Fingerprint, Option<Handle>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredDocument {
    Legacy {
        processed_ids: Vec<Fingerprint>,
    },
    Current {
        /// Informational only, so any shape is accepted.
        #[serde(default)]
        last_updated: Option<serde_json::Value>,
        #[serde(default)]
        event_map: RecordMap,
    },
}

/// Canonical in-memory form of either layout.
pub(crate) struct Decoded {
    pub records: RecordMap,
    pub last_updated: Option<DateTime<Utc>>,
    pub legacy: bool,
}

impl StoredDocument {
    pub fn normalize(self) -> Decoded {
        match self {
            StoredDocument::Legacy { processed_ids } => Decoded {
                records: processed_ids.into_iter().map(|fp| (fp, None)).collect(),
                last_updated: None,
                legacy: true,
            },
            StoredDocument::Current {
                last_updated,
                event_map,
            } => Decoded {
                records: event_map,
                last_updated: last_updated
                    .as_ref()
                    .and_then(serde_json::Value::as_str)
                    .and_then(parse_timestamp),
                legacy: false,
            },
        }
    }
}

#[derive(Serialize)]
pub(crate) struct SavedDocument<'a> {
    pub last_updated: DateTime<Utc>,
    pub event_map: &'a RecordMap,
}

/// Accepts RFC 3339 as well as the offset-less ISO form older writers used.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
