//! Discovery configuration.

use std::time::Duration;

use chrono::TimeDelta;

use crate::location::{DEFAULT_MAX_FIX_AGE, DEFAULT_TIMEOUT};
use crate::store::DEFAULT_RESULT_CAP;

/// Tuning parameters for a discovery scan.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Largest departure-time difference still considered a match (seconds).
    /// The boundary is inclusive.
    pub window_secs: i64,

    /// Maximum number of records requested from the store per scan.
    pub result_cap: usize,

    /// How long to wait for a fresh location fix (seconds).
    pub location_timeout_secs: u64,

    /// Oldest last-known fix accepted when a fresh one fails (seconds).
    pub max_fix_age_secs: u64,
}

impl DiscoveryConfig {
    pub fn new(
        window_secs: i64,
        result_cap: usize,
        location_timeout_secs: u64,
        max_fix_age_secs: u64,
    ) -> Self {
        Self {
            window_secs,
            result_cap,
            location_timeout_secs,
            max_fix_age_secs,
        }
    }

    /// Returns the departure window as a TimeDelta.
    ///
    /// Saturates at [`TimeDelta::MAX`] for windows too large to represent.
    pub fn window(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.window_secs).unwrap_or(TimeDelta::MAX)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn max_fix_age(&self) -> Duration {
        Duration::from_secs(self.max_fix_age_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            window_secs: 4 * 60 * 60,
            result_cap: DEFAULT_RESULT_CAP,
            location_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_fix_age_secs: DEFAULT_MAX_FIX_AGE.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DiscoveryConfig::default();

        assert_eq!(config.window_secs, 14_400);
        assert_eq!(config.result_cap, 50);
        assert_eq!(config.location_timeout_secs, 10);
        assert_eq!(config.max_fix_age_secs, 300);
    }

    #[test]
    fn duration_methods() {
        let config = DiscoveryConfig::default();

        assert_eq!(config.window(), TimeDelta::hours(4));
        assert_eq!(config.location_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_fix_age(), Duration::from_secs(300));
    }

    #[test]
    fn custom_config() {
        let config = DiscoveryConfig::new(3600, 20, 5, 60);

        assert_eq!(config.window(), TimeDelta::hours(1));
        assert_eq!(config.result_cap, 20);
        assert_eq!(config.location_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_fix_age(), Duration::from_secs(60));
    }

    #[test]
    fn oversized_window_saturates() {
        let config = DiscoveryConfig::new(i64::MAX, 50, 10, 300);
        assert_eq!(config.window(), TimeDelta::MAX);
    }
}
