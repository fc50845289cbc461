//! Scan orchestration.
//!
//! A scan locates the traveler and queries their airport concurrently,
//! then ranks the hits. Every scan takes a generation token; if a newer
//! scan starts (or the scanner is invalidated) before this one finishes,
//! its result is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join;
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, Profile};
use crate::location::{Geolocator, LocationError, LocationProvider};
use crate::store::{CandidateSource, QueryError};

use super::{DiscoveryConfig, RankedList, rank};

/// Errors that fail a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The traveler's own profile lacks a field discovery needs
    #[error("profile is missing {0}")]
    IncompleteProfile(&'static str),

    /// Location could not be used at all
    #[error(transparent)]
    Location(#[from] LocationError),

    /// The candidate query failed
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A completed scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub generation: u64,
    pub candidates: RankedList,
    /// The coordinate distances were measured from, if any.
    pub location: Option<Coordinate>,
    /// Why no location was used, when the scan degraded to unknown distances.
    pub location_issue: Option<LocationError>,
}

/// What happened to a scan.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Complete(ScanResult),
    /// A newer scan started first; this one's result was dropped.
    Superseded { generation: u64 },
}

/// Runs scans for one traveler and tracks which is current.
///
/// Clones share the generation counter.
#[derive(Debug, Clone)]
pub struct Scanner {
    generation: Arc<AtomicU64>,
    config: DiscoveryConfig,
}

impl Scanner {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Drop any in-flight scan without starting a new one.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Scan for travelers compatible with `profile`.
    ///
    /// The profile must have an airport and a departure time. Permission
    /// denial fails the scan; any other location failure degrades to
    /// unknown distances and is reported on the result.
    pub async fn scan<S, P>(
        &self,
        profile: &Profile,
        source: &S,
        locator: &Geolocator<P>,
    ) -> Result<ScanOutcome, ScanError>
    where
        S: CandidateSource,
        P: LocationProvider,
    {
        let generation = self.begin();

        let airport = profile
            .airport
            .ok_or(ScanError::IncompleteProfile("airport"))?;
        let my_time = profile
            .departure_time
            .ok_or(ScanError::IncompleteProfile("departure time"))?;

        info!(user = %profile.user_id, %airport, generation, "scan started");

        let (located, queried) = join(
            locator.current_location(self.config.location_timeout()),
            source.query_candidates(&airport, self.config.result_cap),
        )
        .await;

        if !self.is_current(generation) {
            debug!(user = %profile.user_id, generation, "scan superseded");
            return Ok(ScanOutcome::Superseded { generation });
        }

        let (location, location_issue) = match located {
            Ok(coordinate) => (Some(coordinate), None),
            Err(LocationError::PermissionDenied) => {
                return Err(ScanError::Location(LocationError::PermissionDenied));
            }
            Err(issue) => {
                warn!(user = %profile.user_id, %issue, "ranking without location");
                (None, Some(issue))
            }
        };

        let hits = queried?;
        let hit_count = hits.len();
        let candidates = rank(
            hits,
            &profile.user_id,
            my_time,
            location.as_ref(),
            self.config.window(),
        );

        info!(
            user = %profile.user_id,
            generation,
            hits = hit_count,
            ranked = candidates.len(),
            "scan complete"
        );

        Ok(ScanOutcome::Complete(ScanResult {
            generation,
            candidates,
            location,
            location_issue,
        }))
    }
}
