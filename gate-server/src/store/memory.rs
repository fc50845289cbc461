//! In-memory profile store for development and testing.
//!
//! Holds `Target` records exactly as the remote store would, so the same
//! conversion rules apply to both. Can be seeded from a JSON fixture file.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{AirportCode, Candidate, Profile, ProfileImage, UserId};

use super::SaveOutcome;
use super::convert::{asset_value, candidates_from_records, profile_from_record, record_from_profile};
use super::error::{QueryError, StoreError};
use super::types::{AssetValue, TargetRecord};

/// Store that keeps records in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Records in insertion order; an upsert keeps the original position.
    records: Arc<RwLock<Vec<TargetRecord>>>,
    fail_asset_uploads: bool,
    next_asset: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with records.
    pub fn from_records(records: Vec<TargetRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Load records from a JSON file holding an array of `Target` records.
    ///
    /// Entries that do not parse as records are skipped with a warning.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("failed to read {:?}: {}", path, e)))?;

        let values: Vec<serde_json::Value> =
            serde_json::from_str(&json).map_err(|e| StoreError::Malformed {
                message: format!("failed to parse {:?}: {}", path, e),
            })?;

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<TargetRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index, error = %e, "skipping unreadable fixture record"),
            }
        }

        debug!(path = ?path, records = records.len(), "loaded fixture records");
        Ok(Self::from_records(records))
    }

    /// Make every image upload fail, as an unreachable asset service would.
    pub fn with_failing_asset_uploads(mut self) -> Self {
        self.fail_asset_uploads = true;
        self
    }

    /// Number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Upsert a profile record.
    pub async fn save(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        let mut outcome = SaveOutcome::default();

        let asset = match &profile.profile_image {
            Some(ProfileImage::Inline(_)) if self.fail_asset_uploads => {
                warn!(user = %profile.user_id, "profile image upload failed, saving without it");
                outcome.asset_skipped = true;
                None
            }
            Some(ProfileImage::Inline(_)) => {
                let n = self.next_asset.fetch_add(1, Ordering::Relaxed) + 1;
                Some(AssetValue {
                    receipt: Some(format!("mem-asset-{n}")),
                    download_url: None,
                })
            }
            Some(ProfileImage::Stored(asset)) => Some(asset_value(asset)),
            None => None,
        };

        let record = record_from_profile(profile, asset);
        let mut records = self.records.write().await;
        match records
            .iter()
            .position(|r| r.record_name == record.record_name)
        {
            Some(index) => records[index] = record,
            None => records.push(record),
        }

        Ok(outcome)
    }

    /// Look up the profile for a user; `Ok(None)` when absent.
    pub async fn fetch(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        let records = self.records.read().await;

        let Some(record) = records.iter().find(|r| r.record_name == user_id.as_str()) else {
            return Ok(None);
        };

        profile_from_record(record)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                message: e.to_string(),
            })
    }

    /// Records whose `airport` field equals `airport` exactly, at most `cap`.
    ///
    /// The cap applies to raw hits, before malformed records are dropped,
    /// matching the remote store's `resultsLimit`.
    pub async fn query(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        let records = self.records.read().await;

        let hits: Vec<TargetRecord> = records
            .iter()
            .filter(|r| {
                r.fields
                    .airport
                    .as_ref()
                    .is_some_and(|f| f.value == airport.as_str())
            })
            .take(cap)
            .cloned()
            .collect();

        Ok(candidates_from_records(hits))
    }
}
