//! Standings manager: live computation and the published snapshot.

use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

use super::models::{LIVE_SNAPSHOT_ID, StandingsSnapshot};
use crate::db::{Record, Records, StoreError};
use crate::scoring::{ScoringConfig, Standings, compute_standings};
use crate::tournament::{BoardResult, Pairing, Player, Team, TournamentResult};

/// Where a standings read came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingsSource {
    /// The stored snapshot
    Snapshot,
    /// Recomputed from board results for this read
    Live,
}

/// Standings returned by [`StandingsManager::get_standings`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsView {
    pub source: StandingsSource,
    pub snapshot: StandingsSnapshot,
}

/// Standings manager
#[derive(Clone)]
pub struct StandingsManager {
    records: Records,
    config: ScoringConfig,
}

impl StandingsManager {
    /// Create a standings manager with the given scoring settings
    pub fn new(records: Records, config: ScoringConfig) -> Self {
        Self { records, config }
    }

    /// Scoring settings in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute standings from the stored board results
    pub async fn compute_live(&self) -> TournamentResult<Standings> {
        let teams: Vec<Team> = self.records.all().await?;
        let players: Vec<Player> = self.records.all().await?;
        let pairings: Vec<Pairing> = self.records.all().await?;
        let boards: Vec<BoardResult> = self.records.all().await?;

        log::debug!(
            "Computing standings: {} teams, {} players, {} pairings, {} boards",
            teams.len(),
            players.len(),
            pairings.len(),
            boards.len()
        );
        Ok(compute_standings(
            &teams,
            &players,
            &pairings,
            &boards,
            &self.config,
        ))
    }

    /// Store `standings` as the live snapshot
    ///
    /// Overwrites the existing snapshot or inserts it when absent. A
    /// concurrent insert of the same id turns into an overwrite, so the last
    /// writer wins.
    pub async fn publish_snapshot(
        &self,
        standings: &Standings,
    ) -> TournamentResult<StandingsSnapshot> {
        let snapshot = StandingsSnapshot::from_standings(standings, Utc::now());

        let exists = self
            .records
            .store()
            .get(StandingsSnapshot::COLLECTION, LIVE_SNAPSHOT_ID)
            .await?
            .is_some();

        let saved = if exists {
            self.records.replace(&snapshot).await?
        } else {
            match self.records.insert(&snapshot).await {
                Ok(saved) => saved,
                Err(StoreError::Duplicate { .. }) => {
                    log::debug!("Snapshot appeared concurrently, overwriting");
                    self.records.replace(&snapshot).await?
                }
                Err(e) => return Err(e.into()),
            }
        };

        log::info!(
            "Published standings snapshot (leader: {})",
            saved.winner_team_name.as_deref().unwrap_or("none")
        );
        Ok(saved)
    }

    /// Read standings, preferring the snapshot
    ///
    /// The snapshot is used when it exists and is not older than `max_age`
    /// (`None` accepts any age). Otherwise standings are recomputed; the
    /// result is returned but not stored.
    pub async fn get_standings(&self, max_age: Option<Duration>) -> TournamentResult<StandingsView> {
        match self.records.get::<StandingsSnapshot>(LIVE_SNAPSHOT_ID).await {
            Ok(Some(snapshot)) if is_fresh(&snapshot, max_age) => {
                return Ok(StandingsView {
                    source: StandingsSource::Snapshot,
                    snapshot,
                });
            }
            Ok(Some(_)) => log::debug!("Snapshot is stale, recomputing"),
            Ok(None) => log::debug!("No snapshot, recomputing"),
            Err(StoreError::Serialization(e)) => {
                log::warn!("Ignoring unreadable snapshot: {e}");
            }
            Err(e) => return Err(e.into()),
        }

        let standings = self.compute_live().await?;
        Ok(StandingsView {
            source: StandingsSource::Live,
            snapshot: StandingsSnapshot::from_standings(&standings, Utc::now()),
        })
    }

    /// Recompute standings and publish them
    pub async fn recompute_and_publish(&self) -> TournamentResult<StandingsSnapshot> {
        let standings = self.compute_live().await?;
        self.publish_snapshot(&standings).await
    }
}

fn is_fresh(snapshot: &StandingsSnapshot, max_age: Option<Duration>) -> bool {
    let Some(max_age) = max_age else {
        return true;
    };
    match chrono::Duration::from_std(max_age) {
        Ok(limit) => snapshot.age(Utc::now()) <= limit,
        Err(_) => true,
    }
}
