//! Scoring and tie-break engine.
//!
//! Standings are a pure function of teams, rosters, pairings and board
//! results:
//!
//! - Players are ranked by points, desk-weighted points (`tb_desk`),
//!   color-weighted points (`tb_black`), wins, then name.
//! - Teams are ranked the same way, with `points` taken from either board
//!   points or match points depending on [`TeamScoring`].
//!
//! ## Example
//!
//! ```
//! use team_chess::scoring::{ScoringConfig, compute_standings};
//! use team_chess::tournament::{Player, Team};
//!
//! let teams = vec![Team::new("t1", "Rooks", "ROO")];
//! let players = vec![Player::new("p1", "Anna", "t1", 1)];
//! let standings = compute_standings(&teams, &players, &[], &[], &ScoringConfig::default());
//! assert_eq!(standings.player_standings.len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod tiebreak;

pub use config::{BLACK_BONUS, DESK_WEIGHT_SCALE, ScoringConfig, TeamScoring};
pub use engine::{
    PlayerTotals, compare_players, compare_teams, compute_standings, desk_tables, player_totals,
};
pub use models::{BoardPrize, DeskTable, PlayerStanding, Standings, TeamStanding, Wdl};
