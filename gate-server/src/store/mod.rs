//! Remote profile store.
//!
//! Profiles live in a public document database as `Target` records keyed by
//! user id. This module provides:
//!
//! - [`StoreClient`]: HTTP client for the remote database
//! - [`MemoryStore`]: in-process stand-in, optionally seeded from a fixture
//! - [`ProfileStore`] / [`CandidateSource`]: the seams discovery code uses
//!
//! Writes are last-write-wins upserts. Queries are filtered server-side by
//! exact airport code and capped; malformed records are dropped silently.

mod client;
mod convert;
mod error;
mod memory;
mod types;

use std::future::Future;

use crate::domain::{AirportCode, Candidate, Profile, UserId};

pub use client::{StoreClient, StoreConfig};
pub use convert::{ConversionError, profile_from_record, record_from_profile};
pub use error::{QueryError, StoreError};
pub use memory::MemoryStore;
pub use types::{AssetValue, Field, LocationValue, TARGET_RECORD_TYPE, TargetFields, TargetRecord};

/// Default maximum number of records a candidate query returns.
pub const DEFAULT_RESULT_CAP: usize = 50;

/// Result of a profile save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The image could not be uploaded and the profile was saved without it.
    pub asset_skipped: bool,
}

/// Persistence of a traveler's own profile.
pub trait ProfileStore: Send + Sync {
    /// Upsert `profile`, keyed by its user id.
    fn save_profile(
        &self,
        profile: &Profile,
    ) -> impl Future<Output = Result<SaveOutcome, StoreError>> + Send;

    /// Look up a profile; `Ok(None)` when the user has none.
    fn find_profile(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<Profile>, StoreError>> + Send;

    /// Look up a profile that must exist.
    fn require_profile(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Profile, StoreError>> + Send {
        async move { self.find_profile(user_id).await?.ok_or(StoreError::NotFound) }
    }
}

/// Source of discovery candidates for an airport.
pub trait CandidateSource: Send + Sync {
    /// Profiles whose airport equals `airport`, at most `cap`, in store order.
    fn query_candidates(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> impl Future<Output = Result<Vec<Candidate>, QueryError>> + Send;
}

impl ProfileStore for StoreClient {
    async fn save_profile(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        self.save(profile).await
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        self.fetch(user_id).await
    }
}

impl CandidateSource for StoreClient {
    async fn query_candidates(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        self.query(airport, cap).await
    }
}

impl ProfileStore for MemoryStore {
    async fn save_profile(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        self.save(profile).await
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        self.fetch(user_id).await
    }
}

impl CandidateSource for MemoryStore {
    async fn query_candidates(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        self.query(airport, cap).await
    }
}

/// Either store implementation, chosen at startup.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Remote(StoreClient),
    Memory(MemoryStore),
}

impl ProfileStore for StoreBackend {
    async fn save_profile(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        match self {
            StoreBackend::Remote(client) => client.save(profile).await,
            StoreBackend::Memory(store) => store.save(profile).await,
        }
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        match self {
            StoreBackend::Remote(client) => client.fetch(user_id).await,
            StoreBackend::Memory(store) => store.fetch(user_id).await,
        }
    }
}

impl CandidateSource for StoreBackend {
    async fn query_candidates(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        match self {
            StoreBackend::Remote(client) => client.query(airport, cap).await,
            StoreBackend::Memory(store) => store.query(airport, cap).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn require_profile_maps_absence_to_not_found() {
        let backend = StoreBackend::Memory(MemoryStore::new());
        let err = backend
            .require_profile(&UserId::parse("nobody").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn backend_delegates_to_memory_store() {
        let memory = MemoryStore::new();
        let backend = StoreBackend::Memory(memory.clone());
        let profile = Profile::new(UserId::parse("u1").unwrap(), "Ana", "AZ1")
            .with_airport(AirportCode::parse("FCO").unwrap());

        backend.save_profile(&profile).await.unwrap();
        assert_eq!(memory.record_count().await, 1);

        let found = backend
            .query_candidates(&AirportCode::parse("FCO").unwrap(), DEFAULT_RESULT_CAP)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(backend.require_profile(&profile.user_id).await.unwrap(), profile);
    }
}
