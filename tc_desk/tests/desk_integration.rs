//! Integration tests for desk commands against a JSON data file.

use std::path::Path;
use team_chess::scoring::ScoringConfig;
use team_chess::snapshot::StandingsSource;
use team_chess::tournament::{GameResult, Player, RosterManager, Team};
use tc_desk::{Backend, Command, DeskConfig, DeskError, Outcome, Session, report};

fn config(path: &Path) -> DeskConfig {
    DeskConfig {
        backend: Backend::File(path.to_path_buf()),
        tournament_id: "cup".to_string(),
        scoring: ScoringConfig::default(),
        snapshot_max_age: None,
    }
}

/// Open a session over a fresh data file with teams A-D, two desks each
async fn seeded_session(dir: &Path) -> Session {
    let session = Session::open(&config(&dir.join("db.json"))).await.unwrap();
    let roster = RosterManager::new(session.records.clone());
    for code in ["A", "B", "C", "D"] {
        roster
            .add_team(Team::new(code, format!("Team {code}"), code))
            .await
            .unwrap();
        for desk in 1..=2 {
            roster
                .add_player(Player::new(
                    format!("{code}{desk}"),
                    format!("{code} Player {desk}"),
                    code,
                    desk,
                ))
                .await
                .unwrap();
        }
    }
    session
}

fn record(pairing: &str, desk: u32, a: &str, b: &str, result: GameResult) -> Command {
    Command::Record {
        pairing_id: pairing.to_string(),
        desk_number: desk,
        player_a_id: a.to_string(),
        player_b_id: b.to_string(),
        result: Some(result),
        player_a_color: None,
    }
}

#[tokio::test]
async fn test_schedule_then_verify() {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path()).await;

    match session.run(Command::Schedule).await.unwrap() {
        Outcome::Scheduled(reports) => {
            assert_eq!(reports.len(), 3);
            assert!(reports.iter().all(|r| r.created == 2));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let outcome = session.run(Command::VerifyRound(1)).await.unwrap();
    assert_eq!(report::render(&outcome, false).unwrap(), "Round 1: in sync\n");

    let err = session.run(Command::VerifyRound(9)).await.unwrap_err();
    assert!(err.client_message().contains("outside the schedule"));

    let outcome = session.run(Command::CleanupRounds).await.unwrap();
    assert_eq!(outcome, Outcome::CleanedUp(Vec::new()));
}

#[tokio::test]
async fn test_record_and_read_live_standings() {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path()).await;
    session.run(Command::Schedule).await.unwrap();

    let outcome = session
        .run(record("cup-r1-A-D", 1, "A1", "D1", GameResult::PlayerAWins))
        .await
        .unwrap();
    let text = report::render(&outcome, false).unwrap();
    assert_eq!(text, "cup-r1-A-D desk 1: A1 (white) 1-0 D1 (black)\n");

    let outcome = session
        .run(Command::Standings {
            live: false,
            max_age: None,
        })
        .await
        .unwrap();
    match outcome {
        Outcome::Standings(view) => {
            assert_eq!(view.source, StandingsSource::Live);
            assert_eq!(view.snapshot.winner_team_id.as_deref(), Some("A"));
            assert_eq!(view.snapshot.top_player_id.as_deref(), Some("A1"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_commit_round_from_draft_file() {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path()).await;
    session.run(Command::Schedule).await.unwrap();

    let draft_path = dir.path().join("r1.json");
    std::fs::write(
        &draft_path,
        r#"{"pairings": {
            "cup-r1-A-D": {"1": "1-0", "2": "½-½"},
            "cup-r1-B-C": {"1": {"result": "0-1", "player_a_color": "black"}, "2": "0-1"}
        }}"#,
    )
    .unwrap();

    let outcome = session
        .run(Command::CommitRound {
            round_number: 1,
            draft: draft_path,
        })
        .await
        .unwrap();
    assert_eq!(
        report::render(&outcome, false).unwrap(),
        "Round saved: boards saved 4/4, rounds complete 1/3\n"
    );

    session.run(Command::Publish).await.unwrap();

    // A new session over the same file reads the published snapshot
    let reopened = Session::open(&config(&dir.path().join("db.json")))
        .await
        .unwrap();
    let outcome = reopened
        .run(Command::Standings {
            live: false,
            max_age: None,
        })
        .await
        .unwrap();
    match &outcome {
        Outcome::Standings(view) => {
            assert_eq!(view.source, StandingsSource::Snapshot);
            assert_eq!(view.snapshot.winner_team_id.as_deref(), Some("C"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let text = report::render(&outcome, false).unwrap();
    assert!(text.starts_with("Standings (snapshot of "));
    assert!(text.contains("Team C (C)"));
    // A1 and C1 both won with white on desk 1; the name decides
    assert!(text.contains("Desk 1: A Player 1 (A) 1.0"));
    assert!(text.contains("Desk 2: C Player 2 (C) 1.0"));

    let outcome = reopened
        .run(Command::Standings {
            live: true,
            max_age: None,
        })
        .await
        .unwrap();
    match outcome {
        Outcome::Standings(view) => assert_eq!(view.source, StandingsSource::Live),
        other => panic!("unexpected outcome: {other:?}"),
    }

    match reopened.run(Command::Desks).await.unwrap() {
        Outcome::Desks(tables) => {
            assert_eq!(tables.len(), 2);
            assert_eq!(tables[0].players[0].player_id, "A1");
            assert_eq!(tables[0].players[1].player_id, "C1");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_commit_round_reports_unmet_keys() {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path()).await;
    session.run(Command::Schedule).await.unwrap();

    let draft_path = dir.path().join("partial.json");
    std::fs::write(&draft_path, r#"{"pairings": {"cup-r1-A-D": {"1": "1-0"}}}"#).unwrap();

    let err = session
        .run(Command::CommitRound {
            round_number: 1,
            draft: draft_path,
        })
        .await
        .unwrap_err();
    let message = err.client_message();
    assert!(message.contains("cup-r1-A-D#2"), "{message}");
    assert!(message.contains("cup-r1-B-C#1"), "{message}");
}

#[tokio::test]
async fn test_commit_round_input_errors() {
    let dir = tempfile::tempdir().unwrap();
    let session = seeded_session(dir.path()).await;

    let missing = session
        .run(Command::CommitRound {
            round_number: 1,
            draft: dir.path().join("nope.json"),
        })
        .await
        .unwrap_err();
    assert!(matches!(missing, DeskError::DraftRead { .. }));

    let bad_path = dir.path().join("bad.json");
    std::fs::write(&bad_path, "{ not json").unwrap();
    let malformed = session
        .run(Command::CommitRound {
            round_number: 1,
            draft: bad_path.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(malformed, DeskError::DraftFormat { .. }));

    // No schedule yet, so round 1 does not exist
    std::fs::write(&bad_path, "{}").unwrap();
    let err = session
        .run(Command::CommitRound {
            round_number: 1,
            draft: bad_path,
        })
        .await
        .unwrap_err();
    assert_eq!(err.client_message(), "Round not found: 1");
}

#[tokio::test]
async fn test_unreadable_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "[]").unwrap();

    let err = Session::open(&config(&path)).await.err().unwrap();
    assert!(matches!(err, DeskError::Storage(_)));
}
