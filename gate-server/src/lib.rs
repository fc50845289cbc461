//! Nearby traveler discovery server.
//!
//! Answers: "who else is waiting at my airport, flying around the same
//! time as me, and how far away are they?" Profiles live in a remote
//! document store; discovery queries it by airport, filters by departure
//! window, and ranks by distance for cyclic browsing.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod location;
pub mod store;
pub mod web;
