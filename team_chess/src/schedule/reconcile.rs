//! Comparison of stored pairings against the expected schedule.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::round_robin::{ExpectedPairing, PairKey};
use crate::tournament::{Pairing, PairingId, Score, pairing_id_for};

/// Differences between a round's stored pairings and its expected pairings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDiff {
    /// Expected pairings with no stored row
    pub missing: Vec<ExpectedPairing>,
    /// Stored rows whose teams are not scheduled together this round
    pub extra: Vec<PairingId>,
    /// Additional stored rows for an expected pairing
    pub duplicates: Vec<PairingId>,
    /// Kept rows whose sides or BYE flag differ from the schedule
    pub misoriented: Vec<PairingId>,
}

impl ScheduleDiff {
    /// Whether the stored round matches the schedule exactly
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.extra.is_empty()
            && self.duplicates.is_empty()
            && self.misoriented.is_empty()
    }
}

impl fmt::Display for ScheduleDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "in sync");
        }
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            let missing: Vec<_> = self.missing.iter().map(ToString::to_string).collect();
            parts.push(format!("missing [{}]", missing.join(", ")));
        }
        if !self.extra.is_empty() {
            parts.push(format!("extra [{}]", self.extra.join(", ")));
        }
        if !self.duplicates.is_empty() {
            parts.push(format!("duplicates [{}]", self.duplicates.join(", ")));
        }
        if !self.misoriented.is_empty() {
            parts.push(format!("misoriented [{}]", self.misoriented.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// A kept pairing whose fields must be rewritten to match the schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reorientation {
    pub pairing_id: PairingId,
    pub expected: ExpectedPairing,
    /// Team A and team B trade places, so board sides must be mirrored
    pub swap_sides: bool,
}

/// Writes that bring a round in line with the schedule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Pairings to delete along with their board results
    pub delete: Vec<PairingId>,
    /// Pairings to create
    pub create: Vec<Pairing>,
    /// Pairings to patch in place
    pub reorient: Vec<Reorientation>,
}

impl ReconcilePlan {
    /// Whether the plan has nothing to do
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty() && self.reorient.is_empty()
    }
}

struct Matched<'a> {
    expected: &'a ExpectedPairing,
    kept: Option<&'a Pairing>,
    dropped: Vec<&'a Pairing>,
}

/// Match stored rows to expected pairings by canonical key
///
/// When several rows share a key, the row carrying the deterministic id is
/// kept, otherwise the smallest id.
fn match_rows<'a>(
    expected: &'a [ExpectedPairing],
    stored: &'a [Pairing],
) -> (Vec<Matched<'a>>, Vec<&'a Pairing>) {
    let mut by_key: BTreeMap<PairKey, Vec<&Pairing>> = BTreeMap::new();
    for pairing in stored {
        by_key
            .entry(PairKey::of_pairing(pairing))
            .or_default()
            .push(pairing);
    }

    let mut seen = HashSet::new();
    let mut matched = Vec::with_capacity(expected.len());
    for exp in expected {
        let key = exp.key();
        if !seen.insert(key.clone()) {
            continue;
        }
        let mut rows = by_key.remove(&key).unwrap_or_default();
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        let kept_index = rows
            .iter()
            .position(|p| p.id == pairing_id_for(&p.round_id, &exp.team_a_id, exp.team_b_id.as_deref()))
            .or(if rows.is_empty() { None } else { Some(0) });

        let kept = kept_index.map(|i| rows.remove(i));
        matched.push(Matched {
            expected: exp,
            kept,
            dropped: rows,
        });
    }

    let mut extra: Vec<&Pairing> = by_key.into_values().flatten().collect();
    extra.sort_by(|a, b| a.id.cmp(&b.id));
    (matched, extra)
}

fn needs_reorientation(stored: &Pairing, expected: &ExpectedPairing) -> bool {
    stored.team_a_id != expected.team_a_id
        || stored.team_b_id != expected.team_b_id
        || stored.is_bye != expected.is_bye()
}

/// Compare expected pairings with the stored rows of one round
pub fn diff_against_stored(expected: &[ExpectedPairing], stored: &[Pairing]) -> ScheduleDiff {
    let (matched, extra) = match_rows(expected, stored);

    let mut diff = ScheduleDiff {
        extra: extra.into_iter().map(|p| p.id.clone()).collect(),
        ..Default::default()
    };
    for m in matched {
        match m.kept {
            Some(kept) => {
                if needs_reorientation(kept, m.expected) {
                    diff.misoriented.push(kept.id.clone());
                }
            }
            None => diff.missing.push(m.expected.clone()),
        }
        diff.duplicates
            .extend(m.dropped.into_iter().map(|p| p.id.clone()));
    }
    diff
}

/// Work out the writes that make `stored` match `expected` for `round_id`
pub fn plan_reconciliation(
    round_id: &str,
    expected: &[ExpectedPairing],
    stored: &[Pairing],
) -> ReconcilePlan {
    let (matched, extra) = match_rows(expected, stored);

    let mut plan = ReconcilePlan {
        delete: extra.into_iter().map(|p| p.id.clone()).collect(),
        ..Default::default()
    };

    for m in matched {
        plan.delete
            .extend(m.dropped.into_iter().map(|p| p.id.clone()));

        match m.kept {
            Some(kept) if needs_reorientation(kept, m.expected) => {
                let swap_sides = !kept.is_bye
                    && !m.expected.is_bye()
                    && kept.team_a_id.as_str() != m.expected.team_a_id;
                plan.reorient.push(Reorientation {
                    pairing_id: kept.id.clone(),
                    expected: m.expected.clone(),
                    swap_sides,
                });
            }
            Some(_) => {}
            None => {
                let exp = m.expected;
                plan.create.push(Pairing {
                    id: pairing_id_for(round_id, &exp.team_a_id, exp.team_b_id.as_deref()),
                    round_id: round_id.to_string(),
                    team_a_id: exp.team_a_id.clone(),
                    team_b_id: exp.team_b_id.clone(),
                    is_bye: exp.is_bye(),
                    team_a_points: Score::ZERO,
                    team_b_points: Score::ZERO,
                });
            }
        }
    }
    plan
}
