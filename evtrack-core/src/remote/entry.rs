//! Provider-neutral calendar entry built from an event.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::event::Event;

/// Fallback reminder that is always added unless it is the configured one.
const FALLBACK_REMINDER_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA zone the provider should display the entry in
    pub time_zone: String,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    /// Minutes before the start
    pub minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Popup,
}

impl CalendarEntry {
    pub fn from_event(event: &Event, remote: &RemoteConfig) -> Self {
        let impact = event
            .impact_score
            .map(|score| score.to_string())
            .unwrap_or_else(|| "n/a".to_string());

        let description = format!(
            "{}\n\nSource: {}\nImpact: {}",
            event.description.as_deref().unwrap_or_default(),
            event.source,
            impact
        );

        CalendarEntry {
            summary: event.title.clone(),
            location: event.venue.clone(),
            description,
            start: event.start,
            end: event.end.unwrap_or(event.start + Duration::hours(1)),
            time_zone: remote.time_zone.clone(),
            reminders: reminders(remote.reminder_minutes),
        }
    }
}

fn reminders(minutes: i64) -> Vec<Reminder> {
    let mut reminders = Vec::new();

    if minutes > 0 {
        reminders.push(Reminder {
            method: ReminderMethod::Popup,
            minutes,
        });
    }
    if minutes != FALLBACK_REMINDER_MINUTES {
        reminders.push(Reminder {
            method: ReminderMethod::Popup,
            minutes: FALLBACK_REMINDER_MINUTES,
        });
    }

    reminders
}
