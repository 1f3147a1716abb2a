//! Tournament data models: teams, players, rounds, pairings and board results.

use super::score::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Team ID type
pub type TeamId = String;
/// Player ID type
pub type PlayerId = String;
/// Round ID type
pub type RoundId = String;
/// Pairing ID type
pub type PairingId = String;
/// Board result ID type
pub type BoardResultId = String;

/// Deterministic round id: `"{tournament_id}-r{round_number}"`
pub fn round_id_for(tournament_id: &str, round_number: u32) -> RoundId {
    format!("{tournament_id}-r{round_number}")
}

/// Deterministic pairing id: `"{round_id}-{team_a}-{team_b}"`, `NONE` for a BYE
pub fn pairing_id_for(round_id: &str, team_a_id: &str, team_b_id: Option<&str>) -> PairingId {
    format!("{round_id}-{team_a_id}-{}", team_b_id.unwrap_or("NONE"))
}

/// Outcome of a single board, written from player A's side
///
/// Serialized as `"1-0"`, `"0.5-0.5"` or `"0-1"`; parsing also accepts
/// `½-½` and `1/2-1/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum GameResult {
    /// Player A won
    #[serde(rename = "1-0")]
    PlayerAWins,
    /// Draw
    #[serde(rename = "0.5-0.5")]
    Draw,
    /// Player B won
    #[serde(rename = "0-1")]
    PlayerBWins,
}

impl GameResult {
    /// Points earned by (player A, player B)
    pub fn points(self) -> (Score, Score) {
        match self {
            GameResult::PlayerAWins => (Score::ONE, Score::ZERO),
            GameResult::Draw => (Score::HALF, Score::HALF),
            GameResult::PlayerBWins => (Score::ZERO, Score::ONE),
        }
    }

    /// Same game seen from the other side of the board
    pub fn mirrored(self) -> Self {
        match self {
            GameResult::PlayerAWins => GameResult::PlayerBWins,
            GameResult::Draw => GameResult::Draw,
            GameResult::PlayerBWins => GameResult::PlayerAWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::PlayerAWins => write!(f, "1-0"),
            GameResult::Draw => write!(f, "0.5-0.5"),
            GameResult::PlayerBWins => write!(f, "0-1"),
        }
    }
}

impl FromStr for GameResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .replace('½', "0.5")
            .replace("1/2", "0.5")
            .replace(['–', '—'], "-")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match normalized.as_str() {
            "1-0" => Ok(GameResult::PlayerAWins),
            "0.5-0.5" => Ok(GameResult::Draw),
            "0-1" => Ok(GameResult::PlayerBWins),
            _ => Err(format!("Unknown game result '{s}' (expected 1-0, 0.5-0.5 or 0-1)")),
        }
    }
}

impl TryFrom<String> for GameResult {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Piece color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other color
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            other => Err(format!("Unknown color '{other}' (expected white or black)")),
        }
    }
}

fn default_white() -> Color {
    Color::White
}

fn default_black() -> Color {
    Color::Black
}

/// Team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team ID
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Short code used on pairing sheets
    #[serde(default)]
    pub short_code: String,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Explicit seed index for the schedule (lower seeds first)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl Team {
    /// Create a team without notes or seed
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_code: short_code.into(),
            notes: None,
            seed: None,
        }
    }

    /// Set the explicit seed index
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Player on a team roster
///
/// `wins`, `draws`, `losses` and `points` are a cache of the player's board
/// results. They are rewritten from the board results on every write that
/// touches the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID
    pub id: PlayerId,
    /// Full name
    pub full_name: String,
    /// Owning team
    pub team_id: TeamId,
    /// Board assignment within the team (1 = top board)
    pub desk_number: u32,
    /// Rating, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub points: Score,
}

impl Player {
    /// Create a player with an empty record
    pub fn new(
        id: impl Into<PlayerId>,
        full_name: impl Into<String>,
        team_id: impl Into<TeamId>,
        desk_number: u32,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            team_id: team_id.into(),
            desk_number,
            rating: None,
            wins: 0,
            draws: 0,
            losses: 0,
            points: Score::ZERO,
        }
    }

    /// Games played according to the cached record
    pub fn games_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Tournament round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round ID
    pub id: RoundId,
    /// 1-based round number
    pub round_number: u32,
    /// Whether every board of the round has been committed
    #[serde(default)]
    pub is_completed: bool,
}

/// Team-vs-team matchup in a round, or a BYE for a single team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Pairing ID
    pub id: PairingId,
    /// Owning round
    pub round_id: RoundId,
    /// First team (the team sitting out for a BYE)
    pub team_a_id: TeamId,
    /// Second team, `None` for a BYE
    #[serde(default)]
    pub team_b_id: Option<TeamId>,
    #[serde(default)]
    pub is_bye: bool,
    /// Sum of team A's board points (cache)
    #[serde(default)]
    pub team_a_points: Score,
    /// Sum of team B's board points (cache)
    #[serde(default)]
    pub team_b_points: Score,
}

impl Pairing {
    /// Opponent team if this is a real match
    pub fn opponent(&self) -> Option<&str> {
        if self.is_bye {
            None
        } else {
            self.team_b_id.as_deref()
        }
    }

    /// Both teams if this is a real match between two distinct teams
    pub fn teams(&self) -> Option<(&str, &str)> {
        self.opponent()
            .filter(|b| *b != self.team_a_id)
            .map(|b| (self.team_a_id.as_str(), b))
    }

    /// Whether the record satisfies the BYE/match invariant
    pub fn is_well_formed(&self) -> bool {
        match (&self.team_b_id, self.is_bye) {
            (None, true) => true,
            (Some(b), false) => *b != self.team_a_id,
            _ => false,
        }
    }
}

/// Result of one desk within a pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResult {
    /// Board result ID
    pub id: BoardResultId,
    /// Owning pairing
    pub pairing_id: PairingId,
    /// Desk (board) number
    pub desk_number: u32,
    /// Player from team A
    pub player_a_id: PlayerId,
    /// Player from team B
    pub player_b_id: PlayerId,
    /// Outcome, `None` while the game is still pending
    #[serde(default)]
    pub result: Option<GameResult>,
    #[serde(default = "default_white")]
    pub player_a_color: Color,
    #[serde(default = "default_black")]
    pub player_b_color: Color,
}

impl BoardResult {
    /// Points earned by (player A, player B); zero for pending games
    pub fn points(&self) -> (Score, Score) {
        self.result.map(GameResult::points).unwrap_or_default()
    }

    /// Swap the A and B sides, keeping the game itself unchanged
    pub fn mirror(&mut self) {
        std::mem::swap(&mut self.player_a_id, &mut self.player_b_id);
        std::mem::swap(&mut self.player_a_color, &mut self.player_b_color);
        self.result = self.result.map(GameResult::mirrored);
    }
}
