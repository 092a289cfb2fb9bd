//! Error types for LifeTrack core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages. Store failures never cross component
//! boundaries as panics: a failed write surfaces as a `Mutation`
//! error and local state is left untouched.

use thiserror::Error;

/// Result type alias for LifeTrack operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Core error type for LifeTrack operations.
#[derive(Debug, Error)]
pub enum TrackError {
    /// No authenticated identity; reads and writes are no-ops
    #[error("No authenticated identity")]
    AuthUnavailable,

    /// Collection store misconfigured or unreachable
    #[error("Collection store unavailable")]
    StoreUnavailable,

    /// A collection's live feed failed; its mirror freezes at the last value
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A create/update/delete call failed
    #[error("Mutation error: {0}")]
    Mutation(String),

    /// Caller-supplied input violates a required-field invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Validation(err.to_string())
    }
}
