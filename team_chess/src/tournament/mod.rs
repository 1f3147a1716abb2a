//! Team tournament data: teams, rosters, rounds, pairings and board results.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use team_chess::db::{MemoryStore, Records};
//! use team_chess::tournament::{Player, RosterManager, Team};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::open("db.json").await?;
//!     let roster = RosterManager::new(Records::new(Arc::new(store)));
//!
//!     roster.add_team(Team::new("rooks", "Rooks", "ROO")).await?;
//!     roster.add_player(Player::new("anna", "Anna K.", "rooks", 1)).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod score;

pub use errors::{TournamentError, TournamentResult};
pub use manager::RosterManager;
pub use models::{
    BoardResult, BoardResultId, Color, GameResult, Pairing, PairingId, Player, PlayerId, Round,
    RoundId, Team, TeamId, pairing_id_for, round_id_for,
};
pub use score::Score;
