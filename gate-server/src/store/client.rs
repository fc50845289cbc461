//! Document store HTTP client.
//!
//! Provides async methods for saving and looking up profile records and for
//! airport-scoped candidate queries. Handles authentication, concurrency
//! limiting, and conversion to domain types.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, warn};

use crate::domain::{AirportCode, Candidate, Profile, ProfileImage, UserId};

use super::SaveOutcome;
use super::convert::{
    ConversionError, asset_value, candidates_from_values, profile_from_record,
    record_from_profile, record_from_value,
};
use super::error::{QueryError, StoreError};
use super::types::{
    AssetUploadResponse, AssetValue, LookupRequest, ModifyOperation, ModifyRequest,
    NOT_FOUND_CODE, QueryRequest, RecordName, RecordsResponse,
};

/// Default base URL for the public traveler database.
const DEFAULT_BASE_URL: &str =
    "https://api.apple-cloudkit.com/database/1/iCloud.Targets/production/public";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Longest response body excerpt kept in error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL of the database (defaults to the production public database)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Document store API client.
///
/// Uses a semaphore to limit concurrent requests so that bursts of scans
/// cannot exhaust the store's request quota.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl StoreClient {
    /// Create a new store client with the given configuration.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::Config("invalid API key format".to_string()))?;
        headers.insert(HeaderName::from_static("x-apikey"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.ok()
    }

    /// POST a JSON body and return the status and response text.
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let _permit = self.permit().await;

        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    /// Upload image bytes as an asset and return the field value referencing it.
    pub async fn upload_asset(&self, bytes: &[u8]) -> Result<AssetValue, StoreError> {
        let _permit = self.permit().await;

        let url = format!("{}/assets/upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_store_status(status, &body)?;

        let uploaded: AssetUploadResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Malformed {
                message: e.to_string(),
            })?;

        Ok(AssetValue {
            receipt: Some(uploaded.receipt),
            download_url: uploaded.download_url,
        })
    }

    /// Upsert a profile record.
    ///
    /// An inline image is uploaded first. If that upload fails the profile is
    /// still saved, without the image, and the outcome says so.
    pub async fn save(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        let mut outcome = SaveOutcome::default();

        let asset = match &profile.profile_image {
            Some(ProfileImage::Inline(bytes)) => match self.upload_asset(bytes).await {
                Ok(asset) => Some(asset),
                Err(e) => {
                    warn!(user = %profile.user_id, error = %e, "profile image upload failed, saving without it");
                    outcome.asset_skipped = true;
                    None
                }
            },
            Some(ProfileImage::Stored(asset)) => Some(asset_value(asset)),
            None => None,
        };

        let request = ModifyRequest {
            operations: vec![ModifyOperation {
                operation_type: "forceReplace",
                record: record_from_profile(profile, asset),
            }],
        };

        let (status, body) = self.post_json("records/modify", &request).await?;
        check_store_status(status, &body)?;

        let response: RecordsResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Malformed {
                message: e.to_string(),
            })?;

        for value in response.records {
            if let Err(e) = record_from_value(value) {
                return Err(StoreError::ServerRejected {
                    status: status.as_u16(),
                    reason: e.to_string(),
                });
            }
        }

        debug!(user = %profile.user_id, asset_skipped = outcome.asset_skipped, "profile saved");
        Ok(outcome)
    }

    /// Look up the profile record for a user.
    ///
    /// Returns `Ok(None)` when the store has no such record.
    pub async fn fetch(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        let request = LookupRequest {
            records: vec![RecordName {
                record_name: user_id.as_str().to_string(),
            }],
        };

        let (status, body) = self.post_json("records/lookup", &request).await?;
        check_store_status(status, &body)?;

        let response: RecordsResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Malformed {
                message: e.to_string(),
            })?;

        let Some(value) = response.records.into_iter().next() else {
            return Ok(None);
        };

        match record_from_value(value) {
            Ok(record) => profile_from_record(&record)
                .map(Some)
                .map_err(|e| StoreError::Malformed {
                    message: e.to_string(),
                }),
            Err(ConversionError::RecordError { code, .. }) if code == NOT_FOUND_CODE => Ok(None),
            Err(e) => Err(StoreError::ServerRejected {
                status: status.as_u16(),
                reason: e.to_string(),
            }),
        }
    }

    /// Query travelers at an airport, at most `cap` records.
    ///
    /// The filter runs server-side; records missing mandatory fields are
    /// dropped from the result.
    pub async fn query(
        &self,
        airport: &AirportCode,
        cap: usize,
    ) -> Result<Vec<Candidate>, QueryError> {
        let request = QueryRequest::airport_equals(airport.as_str(), cap);

        let (status, body) = self.post_json("records/query", &request).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(QueryError::Unauthorized);
        }
        if !status.is_success() {
            return Err(QueryError::ServerRejected {
                status: status.as_u16(),
                reason: excerpt(&body),
            });
        }

        let response: RecordsResponse =
            serde_json::from_str(&body).map_err(|e| QueryError::MalformedSchema {
                message: format!("{e} (body: {})", excerpt(&body)),
            })?;

        let hits = response.records.len();
        let candidates = candidates_from_values(response.records);
        debug!(
            airport = %airport,
            hits,
            kept = candidates.len(),
            "candidate query complete"
        );

        Ok(candidates)
    }
}

fn check_store_status(status: StatusCode, body: &str) -> Result<(), StoreError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized);
    }
    if !status.is_success() {
        return Err(StoreError::ServerRejected {
            status: status.as_u16(),
            reason: excerpt(body),
        });
    }
    Ok(())
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
