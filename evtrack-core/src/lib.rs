//! Core types for evtrack.
//!
//! This crate provides everything needed to reconcile a snapshot of upcoming
//! events against a remote calendar:
//! - `Event` and `Fingerprint` for event identity
//! - `state` for the persisted fingerprint → handle map
//! - `reconcile` for the create/delete diff and its application
//! - `adapter` and `remote` for the external calendar side

pub mod adapter;
pub mod config;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod reconcile;
pub mod remote;
pub mod state;

pub use adapter::{AdapterError, Handle, SyncAdapter};
pub use error::{EvTrackError, EvTrackResult};
pub use event::{Event, ImpactScore};
pub use fingerprint::Fingerprint;
pub use reconcile::{Plan, ReconcileOptions, ReconcileReport, SavePolicy, reconcile};
pub use state::StateStore;
