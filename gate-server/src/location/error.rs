//! Geolocation errors.

/// Why a coordinate could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The user has not granted location access
    #[error("location permission denied")]
    PermissionDenied,

    /// The device could not produce a fix
    #[error("location unavailable")]
    Unavailable,

    /// No fix arrived within the time limit
    #[error("timed out waiting for a location fix")]
    Timeout,
}

impl LocationError {
    /// Whether asking again could succeed without user action.
    pub fn is_retryable(self) -> bool {
        !matches!(self, LocationError::PermissionDenied)
    }
}
