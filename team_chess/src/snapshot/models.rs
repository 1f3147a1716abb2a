//! Persisted standings snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Record;
use crate::scoring::{BoardPrize, PlayerStanding, Standings, TeamStanding};
use crate::tournament::{PlayerId, Score, TeamId};

/// Id of the single mutable snapshot document
pub const LIVE_SNAPSHOT_ID: &str = "live";

/// Published standings, stored in `tournament_results`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsSnapshot {
    pub id: String,
    pub winner_team_id: Option<TeamId>,
    pub winner_team_name: Option<String>,
    pub winner_team_points: Option<Score>,
    pub top_player_id: Option<PlayerId>,
    pub top_player_name: Option<String>,
    pub top_player_points: Option<Score>,
    pub board_prizes: Vec<BoardPrize>,
    pub team_standings: Vec<TeamStanding>,
    pub player_standings: Vec<PlayerStanding>,
    pub finalized_at: DateTime<Utc>,
}

impl StandingsSnapshot {
    /// Build the live snapshot from computed standings
    pub fn from_standings(standings: &Standings, finalized_at: DateTime<Utc>) -> Self {
        let winner = standings.winner();
        let top = standings.top_player();
        Self {
            id: LIVE_SNAPSHOT_ID.to_string(),
            winner_team_id: winner.map(|t| t.team_id.clone()),
            winner_team_name: winner.map(|t| t.name.clone()),
            winner_team_points: winner.map(|t| t.points),
            top_player_id: top.map(|p| p.player_id.clone()),
            top_player_name: top.map(|p| p.full_name.clone()),
            top_player_points: top.map(|p| p.points),
            board_prizes: standings.board_prizes.clone(),
            team_standings: standings.team_standings.clone(),
            player_standings: standings.player_standings.clone(),
            finalized_at,
        }
    }

    /// Age of the snapshot relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.finalized_at
    }
}

impl Record for StandingsSnapshot {
    const COLLECTION: &'static str = "tournament_results";

    fn id(&self) -> &str {
        &self.id
    }
}
