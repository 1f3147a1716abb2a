//! Standings rows produced by the scoring engine.

use crate::tournament::{PlayerId, Score, TeamId};
use serde::{Deserialize, Serialize};

/// Win/draw/loss counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wdl {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl Wdl {
    /// Total games (or matches) counted
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// One row of the player standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub full_name: String,
    pub team_id: TeamId,
    pub desk_number: u32,
    pub points: Score,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    #[serde(rename = "gamesPlayed")]
    pub games_played: u32,
    /// Desk-weighted points, 3 decimals
    pub tb_desk: f64,
    /// Color-weighted points, 3 decimals
    pub tb_black: f64,
}

/// One row of the team standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub name: String,
    pub short_code: String,
    /// Headline points under the configured team-scoring model
    pub points: Score,
    pub points_from_boards: Score,
    pub points_from_pairings: Score,
    /// Board-level or match-level record, following the scoring model
    pub wdl: Wdl,
    pub tb_desk: f64,
    pub tb_black: f64,
}

/// Best player on a desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPrize {
    pub desk_number: u32,
    pub player_id: PlayerId,
    pub full_name: String,
    pub team_id: TeamId,
    pub points: Score,
}

/// Players of one desk in standings order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskTable {
    pub desk_number: u32,
    pub players: Vec<PlayerStanding>,
}

/// Full output of a standings computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub player_standings: Vec<PlayerStanding>,
    pub team_standings: Vec<TeamStanding>,
    pub board_prizes: Vec<BoardPrize>,
    pub desk_tables: Vec<DeskTable>,
}

impl Standings {
    /// Leading team, if any team exists
    pub fn winner(&self) -> Option<&TeamStanding> {
        self.team_standings.first()
    }

    /// Leading player, if any player exists
    pub fn top_player(&self) -> Option<&PlayerStanding> {
        self.player_standings.first()
    }
}
