//! Caching layer for candidate queries.
//!
//! Scans at a busy airport repeat the same query many times a minute. A
//! short TTL keeps results fresh enough for people who are moving around
//! the terminal while bounding load on the remote store.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::domain::{AirportCode, Candidate};
use crate::store::{CandidateSource, QueryError};

/// Cache key for candidate queries: (airport, result cap).
type QueryKey = (AirportCode, usize);

/// Cached query result.
type QueryEntry = Arc<Vec<Candidate>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15),
            max_capacity: 256,
        }
    }
}

/// Limits on per-traveler scan state held by the web layer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// A traveler's scanner and browse session are dropped after this long
    /// without a scan or browse request.
    pub idle: Duration,

    /// Maximum number of travelers tracked at once.
    pub max_capacity: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(30 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Candidate source with caching.
///
/// Wraps any [`CandidateSource`] and caches successful query results.
/// Errors are never cached.
pub struct CachedCandidates<S> {
    source: S,
    queries: MokaCache<QueryKey, QueryEntry>,
}

impl<S: CandidateSource> CachedCandidates<S> {
    /// Create a new cached source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let queries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .support_invalidation_closures()
            .build();

        Self { source, queries }
    }

    /// Access the underlying source for operations that bypass cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.queries.entry_count()
    }

    /// Drop cached results for one airport, e.g. after a profile there changed.
    pub fn invalidate_airport(&self, airport: AirportCode) {
        if let Err(e) = self
            .queries
            .invalidate_entries_if(move |key: &QueryKey, _| key.0 == airport)
        {
            warn!(%airport, error = %e, "could not invalidate cached queries, clearing all");
            self.queries.invalidate_all();
        }
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.queries.invalidate_all();
    }
}

impl<S: CandidateSource> CandidateSource for CachedCandidates<S> {
    async fn query_candidates(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        let key = (*airport, cap);

        // Try cache first
        if let Some(cached) = self.queries.get(&key).await {
            debug!(%airport, cap, "candidate cache hit");
            return Ok(cached.as_ref().clone());
        }

        let candidates = self.source.query_candidates(airport, cap).await?;
        let entry = Arc::new(candidates);
        self.queries.insert(key, entry.clone()).await;

        Ok(entry.as_ref().clone())
    }
}
