//! Timeout and last-known fallback around a location provider.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::domain::Coordinate;

use super::{LocationError, LocationProvider};

/// Default bound on a single location request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default age beyond which a last-known fix is not used as a fallback.
pub const DEFAULT_MAX_FIX_AGE: Duration = Duration::from_secs(5 * 60);

/// Acquires a coordinate from a provider.
///
/// A fresh single-shot fix is preferred. If that fails for any reason other
/// than permission denial, a last-known fix no older than `max_fix_age` is
/// used instead.
#[derive(Debug, Clone)]
pub struct Geolocator<P> {
    provider: P,
    max_fix_age: Duration,
}

impl<P: LocationProvider> Geolocator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_fix_age: DEFAULT_MAX_FIX_AGE,
        }
    }

    pub fn with_max_fix_age(mut self, max_fix_age: Duration) -> Self {
        self.max_fix_age = max_fix_age;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the current coordinate, waiting at most `timeout` for a fresh fix.
    pub async fn current_location(&self, timeout: Duration) -> Result<Coordinate, LocationError> {
        let attempt = tokio::time::timeout(timeout, self.provider.request_location())
            .await
            .unwrap_or(Err(LocationError::Timeout));

        match attempt {
            Ok(coordinate) => Ok(coordinate),
            Err(LocationError::PermissionDenied) => Err(LocationError::PermissionDenied),
            Err(error) => match self.recent_fix() {
                Some(coordinate) => {
                    debug!(%error, "using last known location");
                    Ok(coordinate)
                }
                None => Err(error),
            },
        }
    }

    fn recent_fix(&self) -> Option<Coordinate> {
        let fix = self.provider.last_known()?;
        let age = Utc::now().signed_duration_since(fix.taken_at).to_std().ok()?;
        (age <= self.max_fix_age).then_some(fix.coordinate)
    }
}
