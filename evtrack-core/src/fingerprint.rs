//! Stable event identity.
//!
//! A fingerprint is derived from the title, start time and venue of an event
//! only. Description, source, impact and raw data are presentational and do
//! not affect identity, so an event whose description is edited upstream keeps
//! its fingerprint while a rescheduled or renamed event gets a new one.

use std::fmt;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EvTrackError, EvTrackResult};
use crate::event::Event;

/// Number of digest bytes kept (128 bits).
const FINGERPRINT_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of an event.
    ///
    /// The identity string is `"{title} {start} {venue}"`, lower-cased and
    /// trimmed, with the start time rendered as RFC 3339 in UTC.
    pub fn of(event: &Event) -> Self {
        let start = event.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let identity = format!("{} {} {}", event.title, start, event.venue).to_lowercase();

        let mut hasher = Sha256::new();
        hasher.update(identity.trim().as_bytes());
        let hash = hasher.finalize();

        Fingerprint(hex::encode(&hash[..FINGERPRINT_BYTES]))
    }

    /// Parse a fingerprint from its hex form (e.g. from the command line).
    pub fn parse(s: &str) -> EvTrackResult<Self> {
        let s = s.trim();
        let well_formed = s.len() == FINGERPRINT_BYTES * 2
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        if well_formed {
            Ok(Fingerprint(s.to_string()))
        } else {
            Err(EvTrackError::InvalidFingerprint(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for terminal output: the first eight characters.
    ///
    /// Ids read back from older state files are not guaranteed to be hex.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
