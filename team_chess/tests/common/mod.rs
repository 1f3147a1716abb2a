//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use team_chess::db::{DocumentStore, MemoryStore, Query, Records, StoreResult};
use team_chess::results::ResultManager;
use team_chess::schedule::ScheduleManager;
use team_chess::scoring::ScoringConfig;
use team_chess::snapshot::StandingsManager;
use team_chess::tournament::{Player, RosterManager, Team};

pub const TOURNAMENT: &str = "cup";

/// Every manager over one shared store
#[derive(Clone)]
pub struct Desk {
    pub records: Records,
    pub roster: RosterManager,
    pub schedule: ScheduleManager,
    pub results: ResultManager,
    pub standings: StandingsManager,
}

impl Desk {
    pub fn over(store: Arc<dyn DocumentStore>) -> Self {
        let records = Records::new(store);
        Self {
            roster: RosterManager::new(records.clone()),
            schedule: ScheduleManager::new(records.clone(), TOURNAMENT),
            results: ResultManager::new(records.clone()),
            standings: StandingsManager::new(records.clone(), ScoringConfig::default()),
            records,
        }
    }
}

/// Player id for a team code and desk, e.g. `A1`
pub fn player_id(team: &str, desk: u32) -> String {
    format!("{team}{desk}")
}

/// Add teams with `desks` players each, then build the schedule
pub async fn seeded_desk(store: Arc<dyn DocumentStore>, codes: &[&str], desks: u32) -> Desk {
    let desk = Desk::over(store);
    for code in codes {
        desk.roster
            .add_team(Team::new(*code, format!("Team {code}"), *code))
            .await
            .unwrap();
        for n in 1..=desks {
            desk.roster
                .add_player(Player::new(
                    player_id(code, n),
                    format!("{code} Player {n}"),
                    *code,
                    n,
                ))
                .await
                .unwrap();
        }
    }
    desk.schedule.ensure_schedule().await.unwrap();
    desk
}

/// In-memory tournament with the schedule already built
pub async fn memory_desk(codes: &[&str], desks: u32) -> Desk {
    seeded_desk(Arc::new(MemoryStore::new()), codes, desks).await
}

/// Store that acknowledges board result inserts without keeping them
///
/// The first `drop_inserts` inserts into `board_results` are lost; use
/// `usize::MAX` to lose every one.
pub struct LossyStore {
    inner: MemoryStore,
    remaining_drops: AtomicUsize,
}

impl LossyStore {
    pub fn new(drop_inserts: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            remaining_drops: AtomicUsize::new(drop_inserts),
        }
    }

    pub fn arm(&self, drop_inserts: usize) {
        self.remaining_drops.store(drop_inserts, Ordering::SeqCst);
    }

    fn should_drop(&self, collection: &str) -> bool {
        collection == "board_results"
            && self
                .remaining_drops
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
    }
}

#[async_trait]
impl DocumentStore for LossyStore {
    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        self.inner.list(collection, query).await
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value> {
        if self.should_drop(collection) {
            return Ok(doc);
        }
        self.inner.insert(collection, doc).await
    }

    async fn patch(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value> {
        self.inner.patch(collection, id, fields).await
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> StoreResult<Value> {
        self.inner.replace(collection, id, doc).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.inner.delete(collection, id).await
    }
}
