//! Conditions that stop a synchronization pass early

use serde::{Deserialize, Serialize};

/// Why a download or send stopped before covering all the data.
///
/// Reported structurally inside statuses, never as an `Err`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopSynchronizationError {
    #[default]
    None,
    AuthenticationExpired,
    RateLimitReached {
        /// Seconds to wait before retrying, when the service reported it
        rate_limit_duration: Option<i32>,
    },
}

impl StopSynchronizationError {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub const fn is_authentication_expired(&self) -> bool {
        matches!(self, Self::AuthenticationExpired)
    }

    #[must_use]
    pub const fn is_rate_limit_reached(&self) -> bool {
        matches!(self, Self::RateLimitReached { .. })
    }
}
