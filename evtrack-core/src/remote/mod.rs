//! Calendar providers as external binaries.
//!
//! evtrack does not talk to calendar APIs itself. A provider is any
//! executable named `evtrack-provider-{name}` on `PATH` that answers one JSON
//! request per invocation (see [`protocol`]). `ProviderAdapter` wraps such a
//! binary as a [`SyncAdapter`](crate::adapter::SyncAdapter).

mod entry;
pub mod protocol;
mod provider;

pub use entry::{CalendarEntry, Reminder, ReminderMethod};
pub use provider::ProviderAdapter;
