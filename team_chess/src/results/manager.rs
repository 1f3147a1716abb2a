//! Result manager: board result upsert and round commit.

use serde_json::json;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::gate::{RoundCompleteness, is_pairing_complete};
use super::models::{BoardEntry, RoundDraft, SaveSummary};
use super::sync::{boards_of_pairing, sync_pairing_points, sync_player_stats};
use crate::db::{Query, Records};
use crate::tournament::{
    BoardResult, Color, Pairing, Player, Round, TournamentError, TournamentResult,
};

/// Result manager
#[derive(Clone)]
pub struct ResultManager {
    records: Records,
}

impl ResultManager {
    /// Create a new result manager
    pub fn new(records: Records) -> Self {
        Self { records }
    }

    async fn pairing(&self, pairing_id: &str) -> TournamentResult<Pairing> {
        self.records
            .get::<Pairing>(pairing_id)
            .await?
            .ok_or_else(|| TournamentError::not_found("Pairing", pairing_id))
    }

    async fn roster(&self, team_id: &str) -> TournamentResult<Vec<Player>> {
        let query = Query::all()
            .filter("team_id", team_id)
            .sort_by("desk_number");
        Ok(self.records.list(&query).await?)
    }

    async fn pairings_of_round(&self, round_id: &str) -> TournamentResult<Vec<Pairing>> {
        Ok(self
            .records
            .list(&Query::all().filter("round_id", round_id))
            .await?)
    }

    /// Stored boards of a pairing ordered by desk
    pub async fn pairing_boards(&self, pairing_id: &str) -> TournamentResult<Vec<BoardResult>> {
        boards_of_pairing(&self.records, pairing_id).await
    }

    /// Create or update the result on one board
    ///
    /// The board is identified by (pairing, desk). An existing board keeps its
    /// id and colors unless `player_a_color` overrides them; a new board gets a
    /// fresh id with player A on white. Afterwards the pairing's team points
    /// and the cached stats of every player involved (before and after the
    /// write) are rebuilt.
    ///
    /// # Errors
    ///
    /// * `NotFound` - the pairing does not exist
    /// * `Validation` - malformed or BYE pairing, desk not on both rosters,
    ///   or a player who is not on the expected team
    pub async fn upsert_board_result(&self, entry: BoardEntry) -> TournamentResult<BoardResult> {
        let pairing = self.pairing(&entry.pairing_id).await?;
        if !pairing.is_well_formed() {
            return Err(TournamentError::Validation(format!(
                "Pairing {} must be a BYE or two distinct teams",
                pairing.id
            )));
        }
        let Some((team_a, team_b)) = pairing.teams() else {
            return Err(TournamentError::Validation(format!(
                "Pairing {} is a BYE and has no boards",
                pairing.id
            )));
        };

        let roster_a = self.roster(team_a).await?;
        let roster_b = self.roster(team_b).await?;
        validate_entry(&entry, team_a, team_b, &roster_a, &roster_b)?;

        let query = Query::all()
            .filter("pairing_id", entry.pairing_id.as_str())
            .filter("desk_number", entry.desk_number);
        let mut existing: Vec<BoardResult> = self.records.list(&query).await?;
        existing.sort_by(|a, b| a.id.cmp(&b.id));

        let mut affected: BTreeSet<String> = BTreeSet::new();
        affected.insert(entry.player_a_id.clone());
        affected.insert(entry.player_b_id.clone());

        let mut rows = existing.into_iter();
        let saved = match rows.next() {
            Some(current) => {
                for legacy in rows {
                    log::warn!(
                        "Removing duplicate board {} for {}",
                        legacy.id,
                        entry.key()
                    );
                    self.records.delete::<BoardResult>(&legacy.id).await?;
                    affected.insert(legacy.player_a_id);
                    affected.insert(legacy.player_b_id);
                }
                affected.insert(current.player_a_id.clone());
                affected.insert(current.player_b_id.clone());

                let (a_color, b_color) = match entry.player_a_color {
                    Some(color) => (color, color.opposite()),
                    None => (current.player_a_color, current.player_b_color),
                };
                self.records
                    .patch::<BoardResult>(
                        &current.id,
                        json!({
                            "player_a_id": entry.player_a_id,
                            "player_b_id": entry.player_b_id,
                            "result": entry.result,
                            "player_a_color": a_color,
                            "player_b_color": b_color,
                        }),
                    )
                    .await?
            }
            None => {
                let a_color = entry.player_a_color.unwrap_or(Color::White);
                let board = BoardResult {
                    id: Uuid::new_v4().to_string(),
                    pairing_id: entry.pairing_id.clone(),
                    desk_number: entry.desk_number,
                    player_a_id: entry.player_a_id.clone(),
                    player_b_id: entry.player_b_id.clone(),
                    result: entry.result,
                    player_a_color: a_color,
                    player_b_color: a_color.opposite(),
                };
                self.records.insert(&board).await?
            }
        };

        sync_pairing_points(&self.records, &pairing.id).await?;
        sync_player_stats(&self.records, &affected).await?;

        log::info!(
            "Recorded {} = {}",
            entry.key(),
            saved
                .result
                .map(|r| r.to_string())
                .unwrap_or_else(|| "pending".to_string())
        );
        Ok(saved)
    }

    /// Completeness of a round, counting `draft` results as present
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the round does not exist.
    pub async fn round_completeness(
        &self,
        round_id: &str,
        draft: Option<&RoundDraft>,
    ) -> TournamentResult<RoundCompleteness> {
        if self.records.get::<Round>(round_id).await?.is_none() {
            return Err(TournamentError::not_found("Round", round_id));
        }

        let mut pairings = Vec::new();
        for pairing in self.pairings_of_round(round_id).await? {
            let status = match pairing.teams() {
                Some((a, b)) => {
                    let roster_a = self.roster(a).await?;
                    let roster_b = self.roster(b).await?;
                    let boards = self.pairing_boards(&pairing.id).await?;
                    is_pairing_complete(&pairing, &roster_a, &roster_b, &boards, draft)
                }
                None => is_pairing_complete(&pairing, &[], &[], &[], draft),
            };
            pairings.push(status);
        }

        Ok(RoundCompleteness {
            round_id: round_id.to_string(),
            pairings,
        })
    }

    /// Whether every non-BYE pairing of a round has all its stored results
    pub async fn is_round_complete(&self, round_id: &str) -> TournamentResult<bool> {
        Ok(self.round_completeness(round_id, None).await?.is_complete())
    }

    /// Save a whole round of drafted results
    ///
    /// The round must be complete once the draft is counted. Boards are then
    /// written one at a time and read back. Boards that did not persist are
    /// written once more; if any is still missing the commit fails with
    /// `Consistency` and the boards that did persist stay saved. Finally the
    /// round's `is_completed` flag is set from the stored state.
    ///
    /// # Errors
    ///
    /// * `NotFound` - the round does not exist
    /// * `Validation` - the draft names a pairing or desk outside the round
    /// * `RoundIncomplete` - required boards have neither a stored nor a
    ///   drafted result
    /// * `Consistency` - boards still missing after the retry
    pub async fn commit_round(
        &self,
        round_id: &str,
        draft: &RoundDraft,
    ) -> TournamentResult<SaveSummary> {
        let completeness = self.round_completeness(round_id, Some(draft)).await?;

        for key in draft.keys() {
            let known = completeness
                .pairings
                .iter()
                .find(|p| p.pairing_id == key.pairing_id)
                .is_some_and(|p| p.required_desks.contains(&key.desk_number));
            if !known {
                return Err(TournamentError::Validation(format!(
                    "Draft board {key} is not part of round {round_id}"
                )));
            }
        }

        if !completeness.is_complete() {
            return Err(TournamentError::RoundIncomplete {
                missing: completeness
                    .missing_keys()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        }

        let entries = self.draft_entries(round_id, draft).await?;
        log::info!(
            "Committing {} board(s) for round {round_id}",
            entries.len()
        );

        for entry in &entries {
            self.try_upsert(entry).await?;
        }

        let mut unsaved = self.unverified(&entries).await?;
        if !unsaved.is_empty() {
            log::warn!(
                "{} board(s) did not persist, retrying once",
                unsaved.len()
            );
            for entry in &unsaved {
                self.try_upsert(entry).await?;
            }
            unsaved = self.unverified(&unsaved).await?;
        }

        if !unsaved.is_empty() {
            let missing: Vec<String> = unsaved.iter().map(|e| e.key().to_string()).collect();
            log::error!("Round {round_id} saved partially, missing {}", missing.join(", "));
            return Err(TournamentError::Consistency { missing });
        }

        let complete = self.is_round_complete(round_id).await?;
        self.records
            .patch::<Round>(round_id, json!({ "is_completed": complete }))
            .await?;

        let rounds: Vec<Round> = self.records.all().await?;
        let summary = SaveSummary {
            boards_saved: entries.len(),
            boards_total: completeness.required_boards(),
            rounds_complete: rounds.iter().filter(|r| r.is_completed).count(),
            rounds_total: rounds.len(),
        };
        log::info!("Round {round_id}: {summary}");
        Ok(summary)
    }

    /// Turn drafted results into board entries, resolving players by desk
    async fn draft_entries(
        &self,
        round_id: &str,
        draft: &RoundDraft,
    ) -> TournamentResult<Vec<BoardEntry>> {
        let mut entries = Vec::with_capacity(draft.len());
        for pairing in self.pairings_of_round(round_id).await? {
            let Some(desks) = draft.pairings.get(&pairing.id) else {
                continue;
            };
            let Some((team_a, team_b)) = pairing.teams() else {
                continue;
            };
            let roster_a = self.roster(team_a).await?;
            let roster_b = self.roster(team_b).await?;

            for (desk, board) in desks {
                let player_a = roster_a.iter().find(|p| p.desk_number == *desk);
                let player_b = roster_b.iter().find(|p| p.desk_number == *desk);
                let (Some(player_a), Some(player_b)) = (player_a, player_b) else {
                    return Err(TournamentError::Validation(format!(
                        "Desk {desk} of pairing {} has no player on one side",
                        pairing.id
                    )));
                };
                entries.push(BoardEntry {
                    pairing_id: pairing.id.clone(),
                    desk_number: *desk,
                    player_a_id: player_a.id.clone(),
                    player_b_id: player_b.id.clone(),
                    result: Some(board.result),
                    player_a_color: board.player_a_color,
                });
            }
        }
        Ok(entries)
    }

    /// Upsert, leaving storage failures to the verification pass
    async fn try_upsert(&self, entry: &BoardEntry) -> TournamentResult<()> {
        match self.upsert_board_result(entry.clone()).await {
            Ok(_) => Ok(()),
            Err(TournamentError::Store(e)) => {
                log::warn!("Saving {} failed: {e}", entry.key());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Entries whose board is not stored exactly as written
    async fn unverified(&self, entries: &[BoardEntry]) -> TournamentResult<Vec<BoardEntry>> {
        let mut missing = Vec::new();
        for entry in entries {
            let query = Query::all()
                .filter("pairing_id", entry.pairing_id.as_str())
                .filter("desk_number", entry.desk_number);
            let stored: Vec<BoardResult> = self.records.list(&query).await?;
            let persisted = stored.iter().any(|b| {
                b.result == entry.result
                    && b.player_a_id == entry.player_a_id
                    && b.player_b_id == entry.player_b_id
            });
            if !persisted {
                missing.push(entry.clone());
            }
        }
        Ok(missing)
    }
}

fn validate_entry(
    entry: &BoardEntry,
    team_a: &str,
    team_b: &str,
    roster_a: &[Player],
    roster_b: &[Player],
) -> TournamentResult<()> {
    let on_a = roster_a.iter().any(|p| p.desk_number == entry.desk_number);
    let on_b = roster_b.iter().any(|p| p.desk_number == entry.desk_number);
    if !on_a || !on_b {
        return Err(TournamentError::Validation(format!(
            "Desk {} is not fielded by both {team_a} and {team_b}",
            entry.desk_number
        )));
    }
    if !roster_a.iter().any(|p| p.id == entry.player_a_id) {
        return Err(TournamentError::Validation(format!(
            "Player {} is not on team {team_a}",
            entry.player_a_id
        )));
    }
    if !roster_b.iter().any(|p| p.id == entry.player_b_id) {
        return Err(TournamentError::Validation(format!(
            "Player {} is not on team {team_b}",
            entry.player_b_id
        )));
    }
    Ok(())
}
