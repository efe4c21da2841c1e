//! Error types for evtrack.

use thiserror::Error;

/// Errors that can occur in evtrack operations.
#[derive(Error, Debug)]
pub enum EvTrackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Invalid impact score {0} (expected 1-5)")]
    InvalidImpactScore(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvTrackError {
    fn from(e: serde_json::Error) -> Self {
        EvTrackError::Serialization(e.to_string())
    }
}

/// Result type alias for evtrack operations.
pub type EvTrackResult<T> = Result<T, EvTrackError>;
