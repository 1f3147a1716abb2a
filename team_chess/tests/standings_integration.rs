//! Integration tests for standings computed from committed rounds and the
//! published snapshot

mod common;

use common::{Desk, memory_desk, seeded_desk};
use std::sync::Arc;
use team_chess::db::MemoryStore;
use team_chess::results::RoundDraft;
use team_chess::scoring::{ScoringConfig, TeamScoring};
use team_chess::snapshot::{StandingsManager, StandingsSource, StandingsSnapshot};
use team_chess::tournament::{GameResult, Score};

const AD: &str = "cup-r1-A-D";
const BC: &str = "cup-r1-B-C";

/// Round 1: A beats D 1.5-0.5, C beats B 2-0 with black on both desks
async fn play_round_one(desk: &Desk) {
    let mut draft = RoundDraft::new();
    draft.set(AD, 1, GameResult::PlayerAWins);
    draft.set(AD, 2, GameResult::Draw);
    draft.set(BC, 1, GameResult::PlayerBWins);
    draft.set(BC, 2, GameResult::PlayerBWins);
    desk.results.commit_round("cup-r1", &draft).await.unwrap();
}

#[tokio::test]
async fn test_standings_after_first_round() {
    let desk = memory_desk(&["A", "B", "C", "D"], 2).await;
    play_round_one(&desk).await;

    let standings = desk.standings.compute_live().await.unwrap();

    let order: Vec<_> = standings
        .team_standings
        .iter()
        .map(|t| t.team_id.as_str())
        .collect();
    assert_eq!(order, vec!["C", "A", "D", "B"]);

    let c = &standings.team_standings[0];
    assert_eq!(c.points, Score::from_halves(4));
    assert_eq!(c.tb_desk, 2.5);
    assert_eq!(c.tb_black, 2.2);
    assert_eq!((c.wdl.wins, c.wdl.draws, c.wdl.losses), (2, 0, 0));

    let a = &standings.team_standings[1];
    assert_eq!(a.points, Score::from_halves(3));
    assert_eq!(a.tb_desk, 2.0);
    assert_eq!(a.tb_black, 1.5);

    // C1 and A1 both won on desk 1; C1 did it with black
    let top: Vec<_> = standings
        .player_standings
        .iter()
        .take(3)
        .map(|p| p.player_id.as_str())
        .collect();
    assert_eq!(top, vec!["C1", "A1", "C2"]);

    let prizes: Vec<_> = standings
        .board_prizes
        .iter()
        .map(|p| (p.desk_number, p.player_id.as_str()))
        .collect();
    assert_eq!(prizes, vec![(1, "C1"), (2, "C2")]);
}

#[tokio::test]
async fn test_match_points_model() {
    let desk = memory_desk(&["A", "B", "C", "D"], 2).await;
    play_round_one(&desk).await;

    let config = ScoringConfig {
        team_scoring: TeamScoring::MatchPoints,
        ..ScoringConfig::default()
    };
    let standings = StandingsManager::new(desk.records.clone(), config)
        .compute_live()
        .await
        .unwrap();

    let c = &standings.team_standings[0];
    let a = &standings.team_standings[1];
    assert_eq!((c.team_id.as_str(), a.team_id.as_str()), ("C", "A"));
    assert_eq!(c.points, Score::ONE);
    assert_eq!(a.points, Score::ONE);
    assert_eq!(c.points_from_boards, Score::from_halves(4));
    assert_eq!(a.points_from_pairings, Score::ONE);
    assert_eq!((a.wdl.wins, a.wdl.losses), (1, 0));
}

#[tokio::test]
async fn test_publish_then_read_snapshot() {
    let desk = memory_desk(&["A", "B", "C", "D"], 2).await;
    play_round_one(&desk).await;

    let published = desk.standings.recompute_and_publish().await.unwrap();
    assert_eq!(published.id, "live");
    assert_eq!(published.winner_team_id.as_deref(), Some("C"));
    assert_eq!(published.winner_team_name.as_deref(), Some("Team C"));
    assert_eq!(published.winner_team_points, Some(Score::from_halves(4)));
    assert_eq!(published.top_player_name.as_deref(), Some("C Player 1"));

    let view = desk.standings.get_standings(None).await.unwrap();
    assert_eq!(view.source, StandingsSource::Snapshot);
    assert_eq!(view.snapshot, published);
}

#[tokio::test]
async fn test_snapshot_is_not_refreshed_by_writes() {
    let desk = memory_desk(&["A", "B", "C", "D"], 2).await;
    play_round_one(&desk).await;
    let first = desk.standings.recompute_and_publish().await.unwrap();

    // Round 2: C vs A, A wins both boards
    let mut draft = RoundDraft::new();
    draft.set("cup-r2-C-A", 1, GameResult::PlayerBWins);
    draft.set("cup-r2-C-A", 2, GameResult::PlayerBWins);
    draft.set("cup-r2-B-D", 1, GameResult::Draw);
    draft.set("cup-r2-B-D", 2, GameResult::Draw);
    let summary = desk.results.commit_round("cup-r2", &draft).await.unwrap();
    assert_eq!(summary.rounds_complete, 2);

    let view = desk.standings.get_standings(None).await.unwrap();
    assert_eq!(view.snapshot.winner_team_id, first.winner_team_id);

    let second = desk.standings.recompute_and_publish().await.unwrap();
    assert_eq!(second.winner_team_id.as_deref(), Some("A"));
    assert_eq!(second.winner_team_points, Some(Score::from_halves(7)));

    let snapshots: Vec<StandingsSnapshot> = desk.records.all().await.unwrap();
    assert_eq!(snapshots.len(), 1);
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    {
        let store = Arc::new(MemoryStore::open(&path).await.unwrap());
        let desk = seeded_desk(store, &["A", "B", "C", "D"], 2).await;
        play_round_one(&desk).await;
        desk.standings.recompute_and_publish().await.unwrap();
    }

    let reopened = Desk::over(Arc::new(MemoryStore::open(&path).await.unwrap()));
    let view = reopened.standings.get_standings(None).await.unwrap();
    assert_eq!(view.source, StandingsSource::Snapshot);
    assert_eq!(view.snapshot.winner_team_id.as_deref(), Some("C"));
    assert!(reopened.results.is_round_complete("cup-r1").await.unwrap());
}
