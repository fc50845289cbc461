//! Domain types for traveler discovery.
//!
//! This module contains the core domain model types: identities, airport
//! codes, coordinates and the profiles built from them. All types enforce
//! their invariants at construction time, so code that receives these
//! types can trust their validity.

mod airport;
mod coordinate;
mod languages;
mod profile;
mod user_id;

pub use airport::{AirportCode, InvalidAirportCode};
pub use coordinate::{Coordinate, EARTH_RADIUS_METERS, InvalidCoordinate};
pub use languages::Languages;
pub use profile::{AssetRef, Candidate, Profile, ProfileImage};
pub use user_id::{InvalidUserId, UserId};
