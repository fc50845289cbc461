//! Traveler discovery.
//!
//! Given a traveler's own profile, finds other travelers at the same
//! airport whose departures fall within a time window, orders them by
//! distance, and lets the traveler browse the result cyclically.

mod config;
mod cursor;
mod rank;
mod scan;

pub use config::DiscoveryConfig;
pub use cursor::{BrowseCursor, Direction};
pub use rank::{RankedList, rank, within_window};
pub use scan::{ScanError, ScanOutcome, ScanResult, Scanner};
