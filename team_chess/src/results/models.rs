//! Board entries, round drafts and save summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::tournament::{Color, GameResult, PairingId, PlayerId};

/// One board result as entered by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub pairing_id: PairingId,
    pub desk_number: u32,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    /// `None` clears the result back to pending
    pub result: Option<GameResult>,
    /// Overrides player A's color; player B gets the opposite
    #[serde(default)]
    pub player_a_color: Option<Color>,
}

impl BoardEntry {
    /// Key of the board this entry writes
    pub fn key(&self) -> BoardKey {
        BoardKey::new(&self.pairing_id, self.desk_number)
    }
}

/// Identity of a board within the tournament: pairing and desk
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardKey {
    pub pairing_id: PairingId,
    pub desk_number: u32,
}

impl BoardKey {
    pub fn new(pairing_id: impl Into<PairingId>, desk_number: u32) -> Self {
        Self {
            pairing_id: pairing_id.into(),
            desk_number,
        }
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.pairing_id, self.desk_number)
    }
}

/// A result waiting in a round draft
///
/// In JSON a draft board is either a bare result string (`"1-0"`) or an
/// object with `result` and an optional `player_a_color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DraftBoardRepr")]
pub struct DraftBoard {
    pub result: GameResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_a_color: Option<Color>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DraftBoardRepr {
    Bare(GameResult),
    Full {
        result: GameResult,
        #[serde(default)]
        player_a_color: Option<Color>,
    },
}

impl From<DraftBoardRepr> for DraftBoard {
    fn from(repr: DraftBoardRepr) -> Self {
        match repr {
            DraftBoardRepr::Bare(result) => DraftBoard {
                result,
                player_a_color: None,
            },
            DraftBoardRepr::Full {
                result,
                player_a_color,
            } => DraftBoard {
                result,
                player_a_color,
            },
        }
    }
}

/// Unsaved results for a round, keyed by pairing and desk
///
/// ```json
/// { "pairings": { "cup-r1-A-D": { "1": "1-0", "2": { "result": "0-1", "player_a_color": "black" } } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDraft {
    #[serde(default)]
    pub pairings: BTreeMap<PairingId, BTreeMap<u32, DraftBoard>>,
}

impl RoundDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a draft result, replacing any earlier one for the same board
    pub fn set(&mut self, pairing_id: impl Into<PairingId>, desk_number: u32, result: GameResult) {
        self.set_board(
            pairing_id,
            desk_number,
            DraftBoard {
                result,
                player_a_color: None,
            },
        );
    }

    /// Set a draft board including a color override
    pub fn set_board(
        &mut self,
        pairing_id: impl Into<PairingId>,
        desk_number: u32,
        board: DraftBoard,
    ) {
        self.pairings
            .entry(pairing_id.into())
            .or_default()
            .insert(desk_number, board);
    }

    /// Draft board for a pairing and desk
    pub fn get(&self, pairing_id: &str, desk_number: u32) -> Option<&DraftBoard> {
        self.pairings.get(pairing_id)?.get(&desk_number)
    }

    /// Every drafted board key in order
    pub fn keys(&self) -> impl Iterator<Item = BoardKey> + '_ {
        self.pairings.iter().flat_map(|(pairing_id, desks)| {
            desks
                .keys()
                .map(move |desk| BoardKey::new(pairing_id.clone(), *desk))
        })
    }

    /// Number of drafted boards
    pub fn len(&self) -> usize {
        self.pairings.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a round commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    /// Drafted boards written and verified
    pub boards_saved: usize,
    /// Boards the round requires, stored earlier or drafted now
    pub boards_total: usize,
    pub rounds_complete: usize,
    pub rounds_total: usize,
}

impl fmt::Display for SaveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "boards saved {}/{}, rounds complete {}/{}",
            self.boards_saved, self.boards_total, self.rounds_complete, self.rounds_total
        )
    }
}
