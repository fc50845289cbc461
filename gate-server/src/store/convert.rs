//! Conversion between store DTOs and domain types.

use chrono::DateTime;
use tracing::debug;

use crate::domain::{
    AirportCode, AssetRef, Candidate, Coordinate, Languages, Profile, ProfileImage, UserId,
};

use super::types::{
    AssetValue, Field, LocationValue, RecordFailure, TARGET_RECORD_TYPE, TargetFields,
    TargetRecord,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The store reported a per-record error
    #[error("record error {code}: {reason}")]
    RecordError { code: String, reason: String },

    /// Record did not match the `Target` shape
    #[error("unreadable record: {0}")]
    Unreadable(String),
}

/// Convert a stored record to a profile.
///
/// `name`, `flightInfo` and a user id are mandatory. Optional fields that
/// fail validation (an unknown airport code, an out-of-range location, an
/// impossible timestamp) are treated as absent.
pub fn profile_from_record(record: &TargetRecord) -> Result<Profile, ConversionError> {
    let fields = &record.fields;

    let user_id = [&fields.apple_user_id, &fields.user_id]
        .into_iter()
        .flatten()
        .map(|f| f.value.as_str())
        .find(|id| !id.trim().is_empty())
        .or(Some(record.record_name.as_str()))
        .and_then(|id| UserId::parse(id).ok())
        .ok_or(ConversionError::MissingField("appleUserID"))?;

    let name = non_empty(&fields.name).ok_or(ConversionError::MissingField("name"))?;
    let flight = non_empty(&fields.flight_info).ok_or(ConversionError::MissingField("flightInfo"))?;

    let mut profile = Profile::new(user_id, name, flight);
    profile.age = text(&fields.age);
    profile.gender = text(&fields.gender);
    profile.languages = Languages::parse(&text(&fields.languages));
    profile.airport = fields
        .airport
        .as_ref()
        .and_then(|f| AirportCode::parse_normalized(&f.value).ok());
    profile.destination = text(&fields.destination);
    profile.departure_time = fields
        .departure_time
        .as_ref()
        .and_then(|f| DateTime::from_timestamp_millis(f.value));
    profile.location = fields
        .location
        .as_ref()
        .and_then(|f| Coordinate::new(f.value.latitude, f.value.longitude).ok());
    profile.profile_image = fields.profile_image.as_ref().map(|f| {
        ProfileImage::Stored(AssetRef {
            receipt: f.value.receipt.clone(),
            download_url: f.value.download_url.clone(),
        })
    });

    Ok(profile)
}

/// Build the record written for `profile`.
///
/// `asset` is the image field to store: a fresh upload receipt or the
/// profile's existing asset. Inline image bytes are never written here.
pub fn record_from_profile(profile: &Profile, asset: Option<AssetValue>) -> TargetRecord {
    let id = profile.user_id.as_str().to_string();

    TargetRecord {
        record_name: id.clone(),
        record_type: TARGET_RECORD_TYPE.to_string(),
        fields: TargetFields {
            apple_user_id: Some(Field::new(id)),
            user_id: None,
            name: Some(Field::new(profile.display_name.clone())),
            age: Some(Field::new(profile.age.clone())),
            gender: Some(Field::new(profile.gender.clone())),
            languages: Some(Field::new(profile.languages.to_string())),
            airport: profile.airport.map(|a| Field::new(a.as_str().to_string())),
            flight_info: Some(Field::new(profile.flight_number.clone())),
            destination: Some(Field::new(profile.destination.clone())),
            departure_time: profile
                .departure_time
                .map(|t| Field::new(t.timestamp_millis())),
            location: profile.location.map(|c| {
                Field::new(LocationValue {
                    latitude: c.latitude(),
                    longitude: c.longitude(),
                })
            }),
            profile_image: asset.map(Field::new),
        },
    }
}

/// The asset field for an image that is already stored.
pub fn asset_value(asset: &AssetRef) -> AssetValue {
    AssetValue {
        receipt: asset.receipt.clone(),
        download_url: asset.download_url.clone(),
    }
}

/// Convert a raw JSON record, reporting per-record server errors.
pub fn record_from_value(value: serde_json::Value) -> Result<TargetRecord, ConversionError> {
    if value.get("serverErrorCode").is_some() {
        let failure: RecordFailure = serde_json::from_value(value)
            .map_err(|e| ConversionError::Unreadable(e.to_string()))?;
        return Err(ConversionError::RecordError {
            code: failure.server_error_code,
            reason: failure
                .reason
                .or(failure.record_name)
                .unwrap_or_default(),
        });
    }

    serde_json::from_value(value).map_err(|e| ConversionError::Unreadable(e.to_string()))
}

/// Convert query hits to candidates, preserving order.
///
/// Records that fail conversion are skipped rather than failing the batch:
/// partially-written remote records must not hide everyone else.
pub fn candidates_from_records<I>(records: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = TargetRecord>,
{
    records
        .into_iter()
        .filter_map(|record| match profile_from_record(&record) {
            Ok(profile) => Some(Candidate::new(profile)),
            Err(e) => {
                debug!(record = %record.record_name, error = %e, "dropping candidate record");
                None
            }
        })
        .collect()
}

/// Convert raw JSON query hits to candidates, preserving order.
pub fn candidates_from_values(values: Vec<serde_json::Value>) -> Vec<Candidate> {
    let records = values
        .into_iter()
        .filter_map(|value| match record_from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "dropping unreadable record");
                None
            }
        });
    candidates_from_records(records)
}

fn non_empty(field: &Option<Field<String>>) -> Option<String> {
    field
        .as_ref()
        .map(|f| f.value.clone())
        .filter(|s| !s.trim().is_empty())
}

fn text(field: &Option<Field<String>>) -> String {
    field.as_ref().map(|f| f.value.clone()).unwrap_or_default()
}
