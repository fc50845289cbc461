//! Static location provider.

use crate::domain::Coordinate;

use super::{LocationError, LocationProvider};

/// Provider that always answers the same way.
///
/// Used for client-supplied fixes over HTTP, where the device already did
/// the locating, and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation {
    answer: Result<Coordinate, LocationError>,
}

impl FixedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            answer: Ok(coordinate),
        }
    }

    /// A provider that always fails with `error`.
    pub fn failing(error: LocationError) -> Self {
        Self { answer: Err(error) }
    }

    /// A provider for a device with no position source.
    pub fn unavailable() -> Self {
        Self::failing(LocationError::Unavailable)
    }

    /// Use `coordinate` when present, otherwise report unavailable.
    pub fn from_option(coordinate: Option<Coordinate>) -> Self {
        coordinate.map_or_else(Self::unavailable, Self::new)
    }
}

impl LocationProvider for FixedLocation {
    async fn request_location(&self) -> Result<Coordinate, LocationError> {
        self.answer
    }
}
