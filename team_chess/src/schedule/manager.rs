//! Schedule manager: keeps stored rounds and pairings in line with the
//! round-robin schedule.

use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::reconcile::{ReconcilePlan, ScheduleDiff, diff_against_stored, plan_reconciliation};
use super::round_robin::{ExpectedPairing, expected_pairings, rounds_for_teams};
use crate::db::{Query, Records, StoreError};
use crate::results::sync::{
    boards_of_pairing, delete_pairing_cascade, sync_pairing_points, sync_player_stats,
};
use crate::tournament::{
    BoardResult, Pairing, Player, Round, RoundId, Team, TournamentError, TournamentResult, round_id_for,
};

/// Writes performed by one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub round_id: RoundId,
    pub created: usize,
    pub deleted: usize,
    pub reoriented: usize,
    pub boards_deleted: usize,
    pub boards_mirrored: usize,
}

impl ReconcileReport {
    /// Whether nothing was written
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.deleted == 0 && self.reoriented == 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: created {}, deleted {}, reoriented {} (boards deleted {}, mirrored {})",
            self.round_id,
            self.created,
            self.deleted,
            self.reoriented,
            self.boards_deleted,
            self.boards_mirrored
        )
    }
}

/// Schedule manager
#[derive(Clone)]
pub struct ScheduleManager {
    records: Records,
    tournament_id: String,
}

impl ScheduleManager {
    /// Create a schedule manager for one tournament
    pub fn new(records: Records, tournament_id: impl Into<String>) -> Self {
        Self {
            records,
            tournament_id: tournament_id.into(),
        }
    }

    /// Tournament id used for deterministic round ids
    pub fn tournament_id(&self) -> &str {
        &self.tournament_id
    }

    /// Rounds ordered by round number
    pub async fn rounds(&self) -> TournamentResult<Vec<Round>> {
        Ok(self
            .records
            .list(&Query::all().sort_by("round_number"))
            .await?)
    }

    /// Stored pairings of a round
    pub async fn pairings(&self, round_id: &str) -> TournamentResult<Vec<Pairing>> {
        Ok(self
            .records
            .list(&Query::all().filter("round_id", round_id))
            .await?)
    }

    /// Expected pairings of a round from the current team list
    pub async fn expected_round(&self, round_number: u32) -> TournamentResult<Vec<ExpectedPairing>> {
        let teams: Vec<Team> = self.records.all().await?;
        let total = rounds_for_teams(teams.len());
        if round_number == 0 || round_number > total {
            return Err(TournamentError::Validation(format!(
                "Round {round_number} is outside the schedule (1..={total})"
            )));
        }
        Ok(expected_pairings(&teams, round_number))
    }

    /// Find the stored round row for a round number
    ///
    /// Prefers the row with the deterministic id when duplicates exist.
    pub async fn find_round(&self, round_number: u32) -> TournamentResult<Option<Round>> {
        let mut rows: Vec<Round> = self
            .records
            .list(&Query::all().filter("round_number", round_number))
            .await?;
        let preferred = round_id_for(&self.tournament_id, round_number);
        rows.sort_by(|a, b| (a.id != preferred, &a.id).cmp(&(b.id != preferred, &b.id)));
        Ok(rows.into_iter().next())
    }

    /// Compare a round's stored pairings with the schedule without writing
    pub async fn verify_round(&self, round_number: u32) -> TournamentResult<ScheduleDiff> {
        let expected = self.expected_round(round_number).await?;
        let stored = match self.find_round(round_number).await? {
            Some(round) => self.pairings(&round.id).await?,
            None => Vec::new(),
        };
        Ok(diff_against_stored(&expected, &stored))
    }

    /// Make sure round `round_number` exists and matches the schedule
    ///
    /// Creates the round row when needed, reconciles its pairings and checks
    /// the result again.
    ///
    /// # Errors
    ///
    /// * `Validation` - the round number is outside the schedule
    /// * `ScheduleConflict` - pairings still diverge after reconciliation
    pub async fn ensure_round(&self, round_number: u32) -> TournamentResult<ReconcileReport> {
        let expected = self.expected_round(round_number).await?;

        let round = match self.find_round(round_number).await? {
            Some(round) => round,
            None => {
                let round = Round {
                    id: round_id_for(&self.tournament_id, round_number),
                    round_number,
                    is_completed: false,
                };
                log::info!("Creating round {} ({})", round_number, round.id);
                self.records.insert(&round).await?
            }
        };

        let stored = self.pairings(&round.id).await?;
        let report = self.reconcile(&round.id, &expected, &stored).await?;

        let after = self.pairings(&round.id).await?;
        let diff = diff_against_stored(&expected, &after);
        if !diff.is_clean() {
            return Err(TournamentError::ScheduleConflict {
                round_number,
                diff: diff.to_string(),
            });
        }
        Ok(report)
    }

    /// Ensure every round of the schedule
    pub async fn ensure_schedule(&self) -> TournamentResult<Vec<ReconcileReport>> {
        let teams: Vec<Team> = self.records.all().await?;
        let total = rounds_for_teams(teams.len());
        log::info!("Ensuring {total} round(s) for {} team(s)", teams.len());

        let mut reports = Vec::with_capacity(total as usize);
        for round_number in 1..=total {
            reports.push(self.ensure_round(round_number).await?);
        }
        Ok(reports)
    }

    /// Apply the writes that make `stored` match `expected`
    ///
    /// Deletes extra and duplicate rows with their board results, creates
    /// missing pairings with deterministic ids and rewrites misoriented
    /// pairings. When a rewrite swaps team A and team B, board results
    /// recorded against the old sides are mirrored so every player stays on
    /// their own team's side.
    /// Running it twice writes nothing the second time.
    pub async fn reconcile(
        &self,
        round_id: &str,
        expected: &[ExpectedPairing],
        stored: &[Pairing],
    ) -> TournamentResult<ReconcileReport> {
        let plan = plan_reconciliation(round_id, expected, stored);
        let mut report = ReconcileReport {
            round_id: round_id.to_string(),
            ..Default::default()
        };
        if plan.is_empty() {
            return Ok(report);
        }

        let mut stale_players = BTreeSet::new();
        self.apply_deletes(&plan, &mut report, &mut stale_players)
            .await?;

        for pairing in &plan.create {
            match self.records.insert(pairing).await {
                Ok(_) => {}
                Err(StoreError::Duplicate { .. }) => {
                    self.records.replace(pairing).await?;
                }
                Err(e) => return Err(e.into()),
            }
            report.created += 1;
        }

        for change in &plan.reorient {
            let boards = boards_of_pairing(&self.records, &change.pairing_id).await?;

            if change.expected.is_bye() {
                for board in &boards {
                    self.records.delete::<BoardResult>(&board.id).await?;
                    stale_players.insert(board.player_a_id.clone());
                    stale_players.insert(board.player_b_id.clone());
                }
                report.boards_deleted += boards.len();
            } else if change.swap_sides {
                for mut board in boards {
                    if !self.board_follows_stored_sides(&board, &change.expected).await? {
                        continue;
                    }
                    board.mirror();
                    self.records.replace(&board).await?;
                    report.boards_mirrored += 1;
                }
            }

            self.records
                .patch::<Pairing>(
                    &change.pairing_id,
                    json!({
                        "team_a_id": change.expected.team_a_id,
                        "team_b_id": change.expected.team_b_id,
                        "is_bye": change.expected.is_bye(),
                    }),
                )
                .await?;
            sync_pairing_points(&self.records, &change.pairing_id).await?;
            report.reoriented += 1;
        }

        sync_player_stats(&self.records, &stale_players).await?;
        log::info!("Reconciled {report}");
        Ok(report)
    }

    /// Whether a board's player A sits on the side that becomes team B
    ///
    /// Boards whose player A cannot be resolved are assumed to follow the
    /// stored pairing.
    async fn board_follows_stored_sides(
        &self,
        board: &BoardResult,
        expected: &ExpectedPairing,
    ) -> TournamentResult<bool> {
        match self.records.get::<Player>(&board.player_a_id).await? {
            Some(player) => Ok(player.team_id != expected.team_a_id),
            None => Ok(true),
        }
    }

    async fn apply_deletes(
        &self,
        plan: &ReconcilePlan,
        report: &mut ReconcileReport,
        stale_players: &mut BTreeSet<String>,
    ) -> TournamentResult<()> {
        for pairing_id in &plan.delete {
            let (boards, players) = delete_pairing_cascade(&self.records, pairing_id).await?;
            report.deleted += 1;
            report.boards_deleted += boards;
            stale_players.extend(players);
        }
        Ok(())
    }

    /// Remove duplicate round rows
    ///
    /// For each round number the row with the deterministic id is kept,
    /// otherwise the smallest id. Dropped rows are deleted together with
    /// their pairings and board results. Returns the deleted round ids.
    pub async fn cleanup_duplicate_rounds(&self) -> TournamentResult<Vec<RoundId>> {
        let rounds = self.rounds().await?;
        let mut by_number: BTreeMap<u32, Vec<Round>> = BTreeMap::new();
        for round in rounds {
            by_number.entry(round.round_number).or_default().push(round);
        }

        let mut deleted = Vec::new();
        let mut stale_players = BTreeSet::new();
        for (round_number, mut rows) in by_number {
            if rows.len() <= 1 {
                continue;
            }
            let preferred = round_id_for(&self.tournament_id, round_number);
            rows.sort_by(|a, b| (a.id != preferred, &a.id).cmp(&(b.id != preferred, &b.id)));

            for dropped in rows.into_iter().skip(1) {
                for pairing in self.pairings(&dropped.id).await? {
                    let (_, players) = delete_pairing_cascade(&self.records, &pairing.id).await?;
                    stale_players.extend(players);
                }
                self.records.delete::<Round>(&dropped.id).await?;
                log::info!("Deleted duplicate round {} (#{round_number})", dropped.id);
                deleted.push(dropped.id);
            }
        }

        sync_player_stats(&self.records, &stale_players).await?;
        Ok(deleted)
    }
}
