//! Error types for notesync-core

use thiserror::Error;

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Remote service rejected the authentication token
    #[error("Authentication expired")]
    AuthenticationExpired,

    /// Remote service rate limit reached
    #[error("Rate limit reached{}", format_rate_limit_duration(.rate_limit_duration))]
    RateLimitReached {
        /// Seconds to wait before retrying, when the service reported it
        rate_limit_duration: Option<i32>,
    },

    /// Operation was cancelled through its cancellation token
    #[error("Operation canceled")]
    OperationCanceled,

    /// Local store failure
    #[error("Local storage error: {0}")]
    LocalStorage(String),

    /// Remote service failure other than auth expiry or rate limiting
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Could not find a free name for a conflicting local item
    #[error("No free conflicting name for \"{name}\" after {attempts} attempts")]
    ConflictingNameExhausted {
        /// Original item name
        name: String,
        /// Number of names probed
        attempts: u32,
    },

    /// Unexpected runtime failure
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn local_storage(message: impl Into<String>) -> Self {
        Self::LocalStorage(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

#[allow(clippy::ref_option)]
fn format_rate_limit_duration(duration: &Option<i32>) -> String {
    duration.map_or_else(String::new, |seconds| format!(" (retry in {seconds}s)"))
}
