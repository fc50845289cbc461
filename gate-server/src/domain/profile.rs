//! Traveler profiles and discovery candidates.

use chrono::{DateTime, Utc};

use super::{AirportCode, Coordinate, Languages, UserId};

/// Reference to an image asset held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Upload receipt the record points at.
    pub receipt: Option<String>,
    /// Where clients can download the asset from, if the store exposes it.
    pub download_url: Option<String>,
}

/// A profile picture, either freshly supplied or already stored.
#[derive(Clone, PartialEq, Eq)]
pub enum ProfileImage {
    /// Raw image bytes still to be uploaded.
    Inline(Vec<u8>),
    /// An asset the store already holds.
    Stored(AssetRef),
}

impl std::fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileImage::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
            ProfileImage::Stored(asset) => f.debug_tuple("Stored").field(asset).finish(),
        }
    }
}

/// A traveler's profile, one per account.
///
/// Field validation (age, non-empty name) is the onboarding flow's job;
/// the only invariants enforced here are those of the field types.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: String,
    /// Age as entered during onboarding.
    pub age: String,
    pub gender: String,
    pub languages: Languages,
    pub airport: Option<AirportCode>,
    pub flight_number: String,
    pub destination: String,
    /// Scheduled departure. Required on the querying side of a scan;
    /// on a candidate, absence means "always inside the time window".
    pub departure_time: Option<DateTime<Utc>>,
    pub location: Option<Coordinate>,
    pub profile_image: Option<ProfileImage>,
}

impl Profile {
    /// Create a profile with the mandatory fields; everything else empty.
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        flight_number: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            age: String::new(),
            gender: String::new(),
            languages: Languages::default(),
            airport: None,
            flight_number: flight_number.into(),
            destination: String::new(),
            departure_time: None,
            location: None,
            profile_image: None,
        }
    }

    pub fn with_airport(mut self, airport: AirportCode) -> Self {
        self.airport = Some(airport);
        self
    }

    pub fn with_departure_time(mut self, time: DateTime<Utc>) -> Self {
        self.departure_time = Some(time);
        self
    }

    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_languages(mut self, languages: Languages) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_image(mut self, image: ProfileImage) -> Self {
        self.profile_image = Some(image);
        self
    }

    /// The stored asset, if the image has been uploaded.
    pub fn stored_image(&self) -> Option<&AssetRef> {
        match &self.profile_image {
            Some(ProfileImage::Stored(asset)) => Some(asset),
            _ => None,
        }
    }
}

/// A prospective match pulled from the remote pool.
///
/// Same shape as a [`Profile`] plus the distance from the querying
/// traveler, which is computed locally and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    profile: Profile,
    distance_meters: f64,
}

impl Candidate {
    /// Wrap a profile; distance starts unknown (+infinity).
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            distance_meters: f64::INFINITY,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }

    pub fn user_id(&self) -> &UserId {
        &self.profile.user_id
    }

    /// Distance in meters, `f64::INFINITY` when unknown.
    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    /// Distance in meters, `None` when unknown.
    pub fn known_distance(&self) -> Option<f64> {
        self.distance_meters
            .is_finite()
            .then_some(self.distance_meters)
    }

    /// Recompute the distance from `origin`; unknown if either side has no location.
    pub(crate) fn annotate_distance(&mut self, origin: Option<&Coordinate>) {
        self.distance_meters = match (origin, self.profile.location.as_ref()) {
            (Some(origin), Some(location)) => origin.distance_meters(location),
            _ => f64::INFINITY,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(UserId::parse("u1").unwrap(), "Giulia", "AZ610")
    }

    #[test]
    fn new_profile_has_empty_optional_fields() {
        let p = profile();
        assert_eq!(p.display_name, "Giulia");
        assert_eq!(p.flight_number, "AZ610");
        assert!(p.airport.is_none());
        assert!(p.departure_time.is_none());
        assert!(p.location.is_none());
        assert!(p.profile_image.is_none());
    }

    #[test]
    fn candidate_distance_defaults_to_unknown() {
        let c = Candidate::new(profile());
        assert_eq!(c.distance_meters(), f64::INFINITY);
        assert_eq!(c.known_distance(), None);
    }

    #[test]
    fn annotate_requires_both_locations() {
        let origin = Coordinate::new(0.0, 0.0).unwrap();

        let mut without = Candidate::new(profile());
        without.annotate_distance(Some(&origin));
        assert_eq!(without.known_distance(), None);

        let mut with = Candidate::new(profile().with_location(Coordinate::new(0.0, 0.0).unwrap()));
        with.annotate_distance(None);
        assert_eq!(with.known_distance(), None);

        with.annotate_distance(Some(&origin));
        assert_eq!(with.known_distance(), Some(0.0));
    }

    #[test]
    fn stored_image_only_for_uploaded_assets() {
        let inline = profile().with_image(ProfileImage::Inline(vec![1, 2, 3]));
        assert!(inline.stored_image().is_none());
        assert_eq!(
            format!("{:?}", inline.profile_image.unwrap()),
            "Inline(3 bytes)"
        );

        let asset = AssetRef {
            receipt: Some("r1".into()),
            download_url: None,
        };
        let stored = profile().with_image(ProfileImage::Stored(asset.clone()));
        assert_eq!(stored.stored_image(), Some(&asset));
    }
}
