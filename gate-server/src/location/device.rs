//! Continuous device location feed.
//!
//! The device layer owns a [`DevicePublisher`] and pushes fixes and
//! permission changes into it; discovery holds the matching [`DeviceFeed`].

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::Coordinate;

use super::{Fix, LocationError, LocationProvider};

#[derive(Debug, Clone, Copy)]
struct DeviceState {
    permitted: bool,
    latest: Option<Fix>,
    /// Bumped on every published fix, including repeats of the same coordinate.
    fixes_seen: u64,
}

/// Receiving side of a device location stream.
#[derive(Debug, Clone)]
pub struct DeviceFeed {
    rx: watch::Receiver<DeviceState>,
}

/// Publishing side of a device location stream.
#[derive(Debug)]
pub struct DevicePublisher {
    tx: watch::Sender<DeviceState>,
}

impl DeviceFeed {
    /// Create a connected feed and publisher. Permission starts granted.
    pub fn channel() -> (DeviceFeed, DevicePublisher) {
        let (tx, rx) = watch::channel(DeviceState {
            permitted: true,
            latest: None,
            fixes_seen: 0,
        });
        (DeviceFeed { rx }, DevicePublisher { tx })
    }
}

impl DevicePublisher {
    /// Publish a fix observed now.
    pub fn publish(&self, coordinate: Coordinate) {
        self.publish_at(coordinate, Utc::now());
    }

    /// Publish a fix observed at `taken_at`.
    pub fn publish_at(&self, coordinate: Coordinate, taken_at: DateTime<Utc>) {
        self.tx.send_modify(|state| {
            state.latest = Some(Fix {
                coordinate,
                taken_at,
            });
            state.fixes_seen += 1;
        });
    }

    pub fn set_permission(&self, permitted: bool) {
        self.tx.send_modify(|state| state.permitted = permitted);
    }
}

impl LocationProvider for DeviceFeed {
    /// Wait for the next fix published after this call.
    async fn request_location(&self) -> Result<Coordinate, LocationError> {
        let mut rx = self.rx.clone();

        let (permitted, seen) = {
            let state = rx.borrow_and_update();
            (state.permitted, state.fixes_seen)
        };
        if !permitted {
            return Err(LocationError::PermissionDenied);
        }

        loop {
            rx.changed()
                .await
                .map_err(|_| LocationError::Unavailable)?;

            let state = *rx.borrow_and_update();
            if !state.permitted {
                return Err(LocationError::PermissionDenied);
            }
            if state.fixes_seen != seen {
                if let Some(fix) = state.latest {
                    return Ok(fix.coordinate);
                }
            }
        }
    }

    fn last_known(&self) -> Option<Fix> {
        let state = self.rx.borrow();
        if state.permitted { state.latest } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn coord(lat: f64) -> Coordinate {
        Coordinate::new(lat, 0.0).unwrap()
    }

    #[tokio::test]
    async fn waits_for_next_fix() {
        let (feed, publisher) = DeviceFeed::channel();
        publisher.publish(coord(1.0));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.publish(coord(2.0));
            publisher
        });

        assert_eq!(feed.request_location().await, Ok(coord(2.0)));
        assert_eq!(feed.last_known().unwrap().coordinate, coord(2.0));
    }

    #[tokio::test]
    async fn denied_permission_fails_immediately() {
        let (feed, publisher) = DeviceFeed::channel();
        publisher.publish(coord(1.0));
        publisher.set_permission(false);

        assert_eq!(
            feed.request_location().await,
            Err(LocationError::PermissionDenied)
        );
        assert!(feed.last_known().is_none());
    }

    #[tokio::test]
    async fn denial_while_waiting_is_reported() {
        let (feed, publisher) = DeviceFeed::channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.set_permission(false);
            publisher
        });

        assert_eq!(
            feed.request_location().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn dropped_publisher_is_unavailable() {
        let (feed, publisher) = DeviceFeed::channel();
        drop(publisher);

        assert_eq!(
            feed.request_location().await,
            Err(LocationError::Unavailable)
        );
    }
}
