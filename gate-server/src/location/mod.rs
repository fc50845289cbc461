//! Device geolocation.
//!
//! A [`LocationProvider`] produces single-shot coordinate fixes and may
//! remember its last one. [`Geolocator`] wraps a provider with a bounded
//! timeout and a fallback to a recent last-known fix.
//!
//! Permission denial is terminal: it is never retried and never papered
//! over with a cached fix.

mod device;
mod error;
mod fixed;
mod geolocator;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::Coordinate;

pub use device::{DeviceFeed, DevicePublisher};
pub use error::LocationError;
pub use fixed::FixedLocation;
pub use geolocator::{DEFAULT_MAX_FIX_AGE, DEFAULT_TIMEOUT, Geolocator};

/// A coordinate and when it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    pub taken_at: DateTime<Utc>,
}

/// Source of device coordinates.
pub trait LocationProvider: Send + Sync {
    /// Request one fresh fix.
    ///
    /// May wait indefinitely; callers bound it with a timeout.
    fn request_location(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;

    /// The most recent fix the provider has seen, however old.
    fn last_known(&self) -> Option<Fix> {
        None
    }
}
