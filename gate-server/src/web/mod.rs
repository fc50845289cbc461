//! Web layer for traveler discovery.
//!
//! Provides HTTP endpoints for saving profiles, running scans and browsing
//! the ranked results.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Session};
