//! Circle-method round-robin generation.
//!
//! The first team in seeding order stays fixed and the rest rotate one step
//! per round. With an odd team count a BYE slot is appended, and whichever
//! team meets it sits the round out.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::tournament::{Pairing, Team, TeamId};

/// A pairing the schedule says should exist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpectedPairing {
    /// First team, or the team sitting out for a BYE
    pub team_a_id: TeamId,
    /// Second team, `None` for a BYE
    pub team_b_id: Option<TeamId>,
}

impl ExpectedPairing {
    /// Whether this is a BYE
    pub fn is_bye(&self) -> bool {
        self.team_b_id.is_none()
    }

    /// Orientation-independent identity of the pairing
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.team_a_id, self.team_b_id.as_deref())
    }
}

impl fmt::Display for ExpectedPairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.team_b_id {
            Some(b) => write!(f, "{} vs {}", self.team_a_id, b),
            None => write!(f, "{} BYE", self.team_a_id),
        }
    }
}

/// Canonical pairing identity: the sorted team pair, or a team and BYE
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PairKey {
    Match(TeamId, TeamId),
    Bye(TeamId),
}

impl PairKey {
    /// Key for a pairing of `team_a` against `team_b` (or a BYE)
    pub fn new(team_a: &str, team_b: Option<&str>) -> Self {
        match team_b {
            Some(b) if team_a <= b => PairKey::Match(team_a.to_string(), b.to_string()),
            Some(b) => PairKey::Match(b.to_string(), team_a.to_string()),
            None => PairKey::Bye(team_a.to_string()),
        }
    }

    /// Key of a stored pairing
    ///
    /// A row flagged as BYE counts as a BYE for team A even if it carries a
    /// team B.
    pub fn of_pairing(pairing: &Pairing) -> Self {
        if pairing.is_bye {
            PairKey::Bye(pairing.team_a_id.clone())
        } else {
            PairKey::new(&pairing.team_a_id, pairing.team_b_id.as_deref())
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairKey::Match(a, b) => write!(f, "{a}-{b}"),
            PairKey::Bye(a) => write!(f, "{a}-BYE"),
        }
    }
}

/// Number of rounds for `team_count` teams: 0 for one team or none,
/// n−1 for even n, n for odd n
pub fn rounds_for_teams(team_count: usize) -> u32 {
    match team_count {
        0 | 1 => 0,
        n if n % 2 == 0 => (n - 1) as u32,
        n => n as u32,
    }
}

/// Teams in seeding order: explicit seeds first (ascending), then short
/// code, name and id
pub fn seeding_order(teams: &[Team]) -> Vec<&Team> {
    let mut ordered: Vec<&Team> = teams.iter().collect();
    ordered.sort_by(|a, b| {
        let seed = match (a.seed, b.seed) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        seed.then_with(|| a.short_code.cmp(&b.short_code))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

/// Expected pairings of round `round_number` (1-based)
///
/// Returns an empty list for round 0, for rounds past the end of the
/// schedule, and when there are fewer than two teams.
pub fn expected_pairings(teams: &[Team], round_number: u32) -> Vec<ExpectedPairing> {
    let rounds = rounds_for_teams(teams.len());
    if round_number == 0 || round_number > rounds {
        return Vec::new();
    }

    let mut order: Vec<Option<&str>> = seeding_order(teams)
        .into_iter()
        .map(|t| Some(t.id.as_str()))
        .collect();
    if order.len() % 2 == 1 {
        order.push(None);
    }

    for _ in 1..round_number {
        rotate(&mut order);
    }
    pair_up(&order, round_number)
}

/// Every round of the schedule, in order
pub fn round_robin_schedule(teams: &[Team]) -> Vec<Vec<ExpectedPairing>> {
    (1..=rounds_for_teams(teams.len()))
        .map(|r| expected_pairings(teams, r))
        .collect()
}

/// Keep slot 0 fixed and move the last slot to position 1
fn rotate(order: &mut [Option<&str>]) {
    if order.len() > 2 {
        order[1..].rotate_right(1);
    }
}

fn pair_up(order: &[Option<&str>], round_number: u32) -> Vec<ExpectedPairing> {
    let m = order.len();
    (0..m / 2)
        .filter_map(|i| {
            let (a, b) = if round_number % 2 == 0 {
                (order[m - 1 - i], order[i])
            } else {
                (order[i], order[m - 1 - i])
            };
            match (a, b) {
                (Some(a), Some(b)) => Some(ExpectedPairing {
                    team_a_id: a.to_string(),
                    team_b_id: Some(b.to_string()),
                }),
                (Some(team), None) | (None, Some(team)) => Some(ExpectedPairing {
                    team_a_id: team.to_string(),
                    team_b_id: None,
                }),
                (None, None) => None,
            }
        })
        .collect()
}
