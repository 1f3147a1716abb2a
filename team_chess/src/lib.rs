//! # Team Chess
//!
//! Standings engine for team chess events played as a round robin.
//!
//! Operators record one result per board; everything else is derived from
//! those board results:
//!
//! - **Pairing points and player records** are caches rebuilt on every write
//! - **Player and team standings** are ranked by points, then desk-weighted
//!   and color-weighted tie-breaks
//! - **The schedule** is the circle method over the team list, and stored
//!   pairings are reconciled against it
//! - **The published snapshot** is the last computed standings, stored under
//!   a fixed id
//!
//! ## Core Modules
//!
//! - [`db`]: document store trait, in-memory/file and PostgreSQL stores
//! - [`tournament`]: teams, players, rounds, pairings, board results
//! - [`results`]: board result upsert, completeness gate, round commit
//! - [`schedule`]: round-robin generation and reconciliation
//! - [`scoring`]: standings and tie-breaks
//! - [`snapshot`]: standings snapshot publisher
//!
//! ## Example
//!
//! ```
//! use team_chess::schedule::expected_pairings;
//! use team_chess::tournament::Team;
//!
//! let teams: Vec<Team> = ["A", "B", "C", "D"]
//!     .iter()
//!     .map(|c| Team::new(*c, *c, *c))
//!     .collect();
//! let round_one = expected_pairings(&teams, 1);
//! assert_eq!(round_one[0].to_string(), "A vs D");
//! ```

/// Record storage.
pub mod db;

/// Board result upsert, completeness gate and round commit.
pub mod results;

/// Round-robin schedule and reconciliation.
pub mod schedule;

/// Standings and tie-breaks.
pub mod scoring;

/// Published standings snapshot.
pub mod snapshot;

/// Tournament data model and roster management.
pub mod tournament;

pub use db::{DocumentStore, MemoryStore, PgDocumentStore, Query, Records};
pub use results::{BoardEntry, ResultManager, RoundDraft, SaveSummary};
pub use schedule::ScheduleManager;
pub use scoring::{ScoringConfig, Standings, TeamScoring, compute_standings};
pub use snapshot::{StandingsManager, StandingsSnapshot};
pub use tournament::{RosterManager, Score, TournamentError, TournamentResult};
