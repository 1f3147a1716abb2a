//! Scoring configuration.

use crate::tournament::{TournamentError, TournamentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default extra weight of desk 1 relative to the last desk
pub const DESK_WEIGHT_SCALE: f64 = 0.5;

/// Default bonus multiplier for points scored with black
pub const BLACK_BONUS: f64 = 0.10;

/// How a team's headline `points` are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamScoring {
    /// Sum of the team's board points
    #[default]
    BoardPoints,
    /// 1 / 0.5 / 0 per decided pairing
    MatchPoints,
}

impl fmt::Display for TeamScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamScoring::BoardPoints => write!(f, "boards"),
            TeamScoring::MatchPoints => write!(f, "matches"),
        }
    }
}

impl FromStr for TeamScoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boards" | "board" | "board_points" => Ok(TeamScoring::BoardPoints),
            "matches" | "match" | "match_points" => Ok(TeamScoring::MatchPoints),
            other => Err(format!(
                "Unknown team scoring '{other}' (expected boards or matches)"
            )),
        }
    }
}

/// Tie-break and team-scoring settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Extra weight of desk 1 over the last desk, in [0, 1]
    pub desk_weight_scale: f64,
    /// Multiplier bonus for points scored with black, in [0, 0.25]
    pub black_bonus: f64,
    /// Model behind team `points` and `wdl`
    pub team_scoring: TeamScoring,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            desk_weight_scale: DESK_WEIGHT_SCALE,
            black_bonus: BLACK_BONUS,
            team_scoring: TeamScoring::default(),
        }
    }
}

impl ScoringConfig {
    /// Check that both tie-break parameters are in range
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the offending parameter.
    pub fn validate(&self) -> TournamentResult<()> {
        if !(0.0..=1.0).contains(&self.desk_weight_scale) {
            return Err(TournamentError::Validation(format!(
                "desk_weight_scale must be within [0, 1], got {}",
                self.desk_weight_scale
            )));
        }
        if !(0.0..=0.25).contains(&self.black_bonus) {
            return Err(TournamentError::Validation(format!(
                "black_bonus must be within [0, 0.25], got {}",
                self.black_bonus
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.team_scoring, TeamScoring::BoardPoints);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = ScoringConfig {
            desk_weight_scale: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            black_bonus: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            black_bonus: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_team_scoring_parse() {
        assert_eq!("matches".parse::<TeamScoring>().unwrap(), TeamScoring::MatchPoints);
        assert_eq!(" Boards ".parse::<TeamScoring>().unwrap(), TeamScoring::BoardPoints);
        assert!("elo".parse::<TeamScoring>().is_err());
    }
}
