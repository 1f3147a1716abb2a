//! Cache maintenance shared by every write path that touches board results.
//!
//! Pairing points and player records are caches of the board results; these
//! helpers rebuild them from the stored boards.

use serde_json::json;
use std::collections::BTreeSet;

use crate::db::{Query, Records};
use crate::scoring::player_totals;
use crate::tournament::{BoardResult, Pairing, Player, PlayerId, Score, TournamentResult};

/// Board results of a pairing ordered by desk
pub(crate) async fn boards_of_pairing(
    records: &Records,
    pairing_id: &str,
) -> TournamentResult<Vec<BoardResult>> {
    let query = Query::all()
        .filter("pairing_id", pairing_id)
        .sort_by("desk_number");
    Ok(records.list(&query).await?)
}

/// Recompute a pairing's cached team points from its board results
pub(crate) async fn sync_pairing_points(
    records: &Records,
    pairing_id: &str,
) -> TournamentResult<Pairing> {
    let boards = boards_of_pairing(records, pairing_id).await?;
    let (a, b) = boards
        .iter()
        .map(BoardResult::points)
        .fold((Score::ZERO, Score::ZERO), |(ta, tb), (a, b)| (ta + a, tb + b));

    let pairing = records
        .patch::<Pairing>(
            pairing_id,
            json!({ "team_a_points": a, "team_b_points": b }),
        )
        .await?;
    log::debug!("Pairing {pairing_id} now {a} : {b}");
    Ok(pairing)
}

/// Rewrite the cached record of each player from their board results
///
/// Players that no longer exist are skipped.
pub(crate) async fn sync_player_stats<I, S>(records: &Records, player_ids: I) -> TournamentResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = player_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    for player_id in unique {
        if records.get::<Player>(&player_id).await?.is_none() {
            log::warn!("Skipping stat sync for unknown player {player_id}");
            continue;
        }

        let mut boards: Vec<BoardResult> = records
            .list(&Query::all().filter("player_a_id", player_id.as_str()))
            .await?;
        boards.extend(
            records
                .list::<BoardResult>(&Query::all().filter("player_b_id", player_id.as_str()))
                .await?,
        );

        let totals = player_totals(&boards)
            .remove(&player_id)
            .unwrap_or_default();
        records
            .patch::<Player>(
                &player_id,
                json!({
                    "wins": totals.wins,
                    "draws": totals.draws,
                    "losses": totals.losses,
                    "points": totals.points,
                }),
            )
            .await?;
    }
    Ok(())
}

/// Delete a pairing and its board results
///
/// Returns the players whose cached stats are now stale.
pub(crate) async fn delete_pairing_cascade(
    records: &Records,
    pairing_id: &str,
) -> TournamentResult<(usize, BTreeSet<PlayerId>)> {
    let boards = boards_of_pairing(records, pairing_id).await?;
    let mut affected = BTreeSet::new();
    for board in &boards {
        records.delete::<BoardResult>(&board.id).await?;
        affected.insert(board.player_a_id.clone());
        affected.insert(board.player_b_id.clone());
    }
    records.delete::<Pairing>(pairing_id).await?;
    log::info!(
        "Deleted pairing {pairing_id} with {} board result(s)",
        boards.len()
    );
    Ok((boards.len(), affected))
}
