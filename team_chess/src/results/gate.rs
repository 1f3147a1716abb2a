//! Round completeness gate.
//!
//! A pairing is complete when every desk present on both rosters has a
//! result, either stored or drafted. BYE pairings are always complete.

use serde::Serialize;
use std::collections::BTreeSet;

use super::models::{BoardKey, RoundDraft};
use crate::tournament::{BoardResult, Pairing, PairingId, Player, RoundId};

/// Completeness of one pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingCompleteness {
    pub pairing_id: PairingId,
    pub complete: bool,
    /// Desks both teams field
    pub required_desks: Vec<u32>,
    /// Required desks with neither a stored nor a drafted result
    pub missing_desks: Vec<u32>,
}

/// Completeness of every pairing in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundCompleteness {
    pub round_id: RoundId,
    pub pairings: Vec<PairingCompleteness>,
}

impl RoundCompleteness {
    /// Whether every pairing is complete
    pub fn is_complete(&self) -> bool {
        self.pairings.iter().all(|p| p.complete)
    }

    /// Boards that still need a result
    pub fn missing_keys(&self) -> Vec<BoardKey> {
        self.pairings
            .iter()
            .flat_map(|p| {
                p.missing_desks
                    .iter()
                    .map(|desk| BoardKey::new(p.pairing_id.clone(), *desk))
            })
            .collect()
    }

    /// Number of required boards across the round
    pub fn required_boards(&self) -> usize {
        self.pairings.iter().map(|p| p.required_desks.len()).sum()
    }
}

/// Desks present on both rosters, ascending
pub fn required_desks(roster_a: &[Player], roster_b: &[Player]) -> Vec<u32> {
    let a: BTreeSet<u32> = roster_a.iter().map(|p| p.desk_number).collect();
    let b: BTreeSet<u32> = roster_b.iter().map(|p| p.desk_number).collect();
    a.intersection(&b).copied().collect()
}

/// Check whether a pairing has a result on every required desk
///
/// `results` may contain boards of other pairings; only this pairing's
/// boards are considered.
pub fn is_pairing_complete(
    pairing: &Pairing,
    roster_a: &[Player],
    roster_b: &[Player],
    results: &[BoardResult],
    draft: Option<&RoundDraft>,
) -> PairingCompleteness {
    if pairing.teams().is_none() {
        return PairingCompleteness {
            pairing_id: pairing.id.clone(),
            complete: true,
            required_desks: Vec::new(),
            missing_desks: Vec::new(),
        };
    }

    let required = required_desks(roster_a, roster_b);
    let stored: BTreeSet<u32> = results
        .iter()
        .filter(|b| b.pairing_id == pairing.id && b.result.is_some())
        .map(|b| b.desk_number)
        .collect();

    let missing: Vec<u32> = required
        .iter()
        .copied()
        .filter(|desk| {
            !stored.contains(desk)
                && draft.is_none_or(|d| d.get(&pairing.id, *desk).is_none())
        })
        .collect();

    PairingCompleteness {
        pairing_id: pairing.id.clone(),
        complete: missing.is_empty(),
        required_desks: required,
        missing_desks: missing,
    }
}
