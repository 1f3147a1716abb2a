//! Published standings snapshot.
//!
//! A single document with id `"live"` in `tournament_results` holds the last
//! published standings. Reads prefer it and fall back to recomputation.

pub mod models;
pub mod publisher;

pub use models::{LIVE_SNAPSHOT_ID, StandingsSnapshot};
pub use publisher::{StandingsManager, StandingsSource, StandingsView};
