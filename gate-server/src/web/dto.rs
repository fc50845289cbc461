//! Data transfer objects for web requests and responses.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AirportCode, Candidate, Coordinate, Languages, Profile, ProfileImage, UserId};

/// Body of `PUT /profiles/{user_id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(alias = "name")]
    pub display_name: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub languages: Vec<String>,

    /// IATA code; case and surrounding whitespace are ignored
    pub airport: Option<String>,

    #[serde(alias = "flightInfo")]
    pub flight_number: String,

    #[serde(default)]
    pub destination: String,

    /// RFC 3339 timestamp
    pub departure_time: Option<DateTime<Utc>>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Profile picture, base64-encoded
    pub image: Option<String>,
}

impl ProfileRequest {
    /// Validate the request into a profile for `user_id`.
    pub fn into_profile(self, user_id: UserId) -> Result<Profile, String> {
        let airport = self
            .airport
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(AirportCode::parse_normalized)
            .transpose()
            .map_err(|e| e.to_string())?;

        let location = coordinate_from(self.latitude, self.longitude)?;

        let image = self
            .image
            .as_deref()
            .map(|encoded| BASE64.decode(encoded.trim()))
            .transpose()
            .map_err(|e| format!("invalid image encoding: {e}"))?
            .filter(|bytes| !bytes.is_empty())
            .map(ProfileImage::Inline);

        let mut profile = Profile::new(user_id, self.display_name, self.flight_number);
        profile.age = self.age;
        profile.gender = self.gender;
        profile.languages = self.languages.into_iter().collect::<Languages>();
        profile.airport = airport;
        profile.destination = self.destination;
        profile.departure_time = self.departure_time;
        profile.location = location;
        profile.profile_image = image;

        Ok(profile)
    }
}

/// Build a coordinate from optional request fields; both or neither.
pub fn coordinate_from(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, String> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
            .map(Some)
            .map_err(|e| e.to_string()),
        (None, None) => Ok(None),
        _ => Err("latitude and longitude must be given together".to_string()),
    }
}

/// A profile as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: String,
    pub display_name: String,
    pub age: String,
    pub gender: String,
    pub languages: Vec<String>,
    pub airport: Option<String>,
    pub flight_number: String,
    pub destination: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_image: bool,
    pub image_url: Option<String>,
}

impl ProfileView {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            display_name: profile.display_name.clone(),
            age: profile.age.clone(),
            gender: profile.gender.clone(),
            languages: profile.languages.as_slice().to_vec(),
            airport: profile.airport.map(|a| a.to_string()),
            flight_number: profile.flight_number.clone(),
            destination: profile.destination.clone(),
            departure_time: profile.departure_time,
            latitude: profile.location.map(|c| c.latitude()),
            longitude: profile.location.map(|c| c.longitude()),
            has_image: profile.profile_image.is_some(),
            image_url: profile
                .stored_image()
                .and_then(|asset| asset.download_url.clone()),
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    #[serde(flatten)]
    pub profile: ProfileView,

    /// Meters from the traveler; `null` when either location is unknown
    pub distance_meters: Option<f64>,
}

impl CandidateView {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            profile: ProfileView::from_profile(candidate.profile()),
            distance_meters: candidate.known_distance(),
        }
    }
}

/// Response of `PUT /profiles/{user_id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub saved: bool,
    pub asset_skipped: bool,
}

/// Body of `POST /scan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub user_id: String,

    /// Fresh device fix; the stored profile location is used when absent
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Response of `POST /scan`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub generation: u64,
    pub candidates: Vec<CandidateView>,
    /// Why distances are unknown, if the scan ran without a location
    pub location_issue: Option<String>,
}

/// Response of the browse endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub index: usize,
    pub total: usize,
    pub candidate: CandidateView,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
