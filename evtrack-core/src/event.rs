//! Event types produced by collectors.
//!
//! An `Event` is a snapshot of something happening at a venue. Collectors
//! build these from scraped pages and APIs; evtrack treats them as read-only
//! input for a single run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvTrackError;
use crate::fingerprint::Fingerprint;

/// An upcoming event gathered from an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "start_time")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_time", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub venue: String,
    /// Collector tag, e.g. "NYRR" or "ProspectPark"
    pub source: String,
    /// Untouched payload from the collector, kept for debugging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<ImpactScore>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        start: DateTime<Utc>,
        venue: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Event {
            title: title.into(),
            description: None,
            start,
            end: None,
            venue: venue.into(),
            source: source.into(),
            raw_data: None,
            impact_score: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_impact(mut self, impact: ImpactScore) -> Self {
        self.impact_score = Some(impact);
        self
    }

    pub fn with_raw_data(mut self, raw: serde_json::Value) -> Self {
        self.raw_data = Some(raw);
        self
    }

    /// Identity of this event across runs. See [`Fingerprint::of`].
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} ({})",
            self.title,
            self.venue,
            self.start.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Estimated impact of an event on the surrounding area, from 1 (minor) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ImpactScore(u8);

impl ImpactScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ImpactScore {
    type Error = EvTrackError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(ImpactScore(value))
        } else {
            Err(EvTrackError::InvalidImpactScore(value))
        }
    }
}

impl From<ImpactScore> for u8 {
    fn from(score: ImpactScore) -> u8 {
        score.0
    }
}

impl fmt::Display for ImpactScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
