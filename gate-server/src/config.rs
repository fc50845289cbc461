//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;

use crate::cache::{CacheConfig, SessionConfig};
use crate::discovery::DiscoveryConfig;
use crate::store::{MemoryStore, StoreBackend, StoreClient, StoreConfig, StoreError};

/// A configuration variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// Remote store base URL; the client default when unset.
    pub store_url: Option<String>,

    /// Remote store API key.
    pub api_key: Option<String>,

    /// Serve from an in-memory store seeded from this fixture instead of
    /// the remote store.
    pub mock_data: Option<PathBuf>,

    pub discovery: DiscoveryConfig,

    pub cache: CacheConfig,

    pub sessions: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store_url: None,
            api_key: None,
            mock_data: None,
            discovery: DiscoveryConfig::default(),
            cache: CacheConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from `GATEMATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("GATEMATE_BIND") {
            config.bind = parse("GATEMATE_BIND", bind)?;
        }
        config.store_url = get("GATEMATE_STORE_URL");
        config.api_key = get("GATEMATE_API_KEY");
        config.mock_data = get("GATEMATE_MOCK_DATA").map(PathBuf::from);

        if let Some(cap) = get("GATEMATE_RESULT_CAP") {
            let cap: usize = parse("GATEMATE_RESULT_CAP", cap)?;
            if cap == 0 {
                return Err(ConfigError {
                    var: "GATEMATE_RESULT_CAP",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                });
            }
            config.discovery.result_cap = cap;
        }
        if let Some(window) = get("GATEMATE_WINDOW_SECS") {
            let window: i64 = parse("GATEMATE_WINDOW_SECS", window)?;
            if window < 0 {
                return Err(ConfigError {
                    var: "GATEMATE_WINDOW_SECS",
                    value: window.to_string(),
                    reason: "must not be negative".into(),
                });
            }
            if TimeDelta::try_seconds(window).is_none() {
                return Err(ConfigError {
                    var: "GATEMATE_WINDOW_SECS",
                    value: window.to_string(),
                    reason: "too large".into(),
                });
            }
            config.discovery.window_secs = window;
        }
        if let Some(timeout) = get("GATEMATE_LOCATION_TIMEOUT_SECS") {
            config.discovery.location_timeout_secs =
                parse("GATEMATE_LOCATION_TIMEOUT_SECS", timeout)?;
        }
        if let Some(idle) = get("GATEMATE_SESSION_IDLE_SECS") {
            let idle: u64 = parse("GATEMATE_SESSION_IDLE_SECS", idle)?;
            config.sessions.idle = Duration::from_secs(idle);
        }

        Ok(config)
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_mock_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.mock_data = Some(path.into());
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Build the configured store: the fixture-backed memory store when
    /// `mock_data` is set, otherwise the remote client.
    pub fn build_store(&self) -> Result<StoreBackend, StoreError> {
        if let Some(path) = &self.mock_data {
            return MemoryStore::from_json_file(path).map(StoreBackend::Memory);
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StoreError::Config("GATEMATE_API_KEY not set".into()))?;

        let mut store_config = StoreConfig::new(api_key);
        if let Some(url) = &self.store_url {
            store_config = store_config.with_base_url(url.as_str());
        }

        StoreClient::new(store_config).map(StoreBackend::Remote)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        reason: e.to_string(),
        value,
    })
}
