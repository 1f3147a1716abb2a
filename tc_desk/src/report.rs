//! Rendering of command outcomes for the terminal.

use std::fmt::Write;
use team_chess::scoring::DeskTable;
use team_chess::snapshot::{StandingsSnapshot, StandingsSource, StandingsView};

use crate::commands::Outcome;

/// Render an outcome as pretty JSON or plain text
///
/// # Errors
///
/// Returns the serialization error in JSON mode.
pub fn render(outcome: &Outcome, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(outcome);
    }
    Ok(render_text(outcome))
}

fn render_text(outcome: &Outcome) -> String {
    let mut out = String::new();
    match outcome {
        Outcome::Scheduled(reports) => {
            if reports.is_empty() {
                out.push_str("No rounds to schedule (need at least two teams)\n");
            }
            for report in reports {
                let _ = writeln!(out, "{report}");
            }
        }
        Outcome::Verified { round_number, diff } => {
            let _ = writeln!(out, "Round {round_number}: {diff}");
        }
        Outcome::CleanedUp(deleted) => {
            if deleted.is_empty() {
                out.push_str("No duplicate rounds\n");
            } else {
                let _ = writeln!(out, "Deleted duplicate rounds: {}", deleted.join(", "));
            }
        }
        Outcome::Recorded(board) => {
            let result = board
                .result
                .map(|r| r.to_string())
                .unwrap_or_else(|| "pending".to_string());
            let _ = writeln!(
                out,
                "{} desk {}: {} ({}) {} {} ({})",
                board.pairing_id,
                board.desk_number,
                board.player_a_id,
                board.player_a_color,
                result,
                board.player_b_id,
                board.player_b_color
            );
        }
        Outcome::Committed(summary) => {
            let _ = writeln!(out, "Round saved: {summary}");
        }
        Outcome::Standings(view) => render_standings(&mut out, view),
        Outcome::Published(snapshot) => {
            let _ = writeln!(
                out,
                "Published snapshot '{}' at {}",
                snapshot.id,
                snapshot.finalized_at.to_rfc3339()
            );
            render_snapshot(&mut out, snapshot);
        }
        Outcome::Desks(tables) => render_desks(&mut out, tables),
    }
    out
}

fn render_standings(out: &mut String, view: &StandingsView) {
    let source = match view.source {
        StandingsSource::Snapshot => format!(
            "snapshot of {}",
            view.snapshot.finalized_at.to_rfc3339()
        ),
        StandingsSource::Live => "live".to_string(),
    };
    let _ = writeln!(out, "Standings ({source})");
    render_snapshot(out, &view.snapshot);
}

fn render_snapshot(out: &mut String, snapshot: &StandingsSnapshot) {
    out.push_str("\nTeams\n");
    let _ = writeln!(
        out,
        "{:>3}  {:<24} {:>5} {:>3} {:>3} {:>3} {:>8} {:>8}",
        "#", "Team", "Pts", "W", "D", "L", "TB-desk", "TB-black"
    );
    for (rank, team) in snapshot.team_standings.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<24} {:>5} {:>3} {:>3} {:>3} {:>8.3} {:>8.3}",
            rank + 1,
            format!("{} ({})", team.name, team.short_code),
            team.points.to_string(),
            team.wdl.wins,
            team.wdl.draws,
            team.wdl.losses,
            team.tb_desk,
            team.tb_black
        );
    }

    out.push_str("\nPlayers\n");
    let _ = writeln!(
        out,
        "{:>3}  {:<24} {:>4} {:>5} {:>3} {:>8} {:>8}",
        "#", "Player", "Desk", "Pts", "GP", "TB-desk", "TB-black"
    );
    for (rank, player) in snapshot.player_standings.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<24} {:>4} {:>5} {:>3} {:>8.3} {:>8.3}",
            rank + 1,
            player.full_name,
            player.desk_number,
            player.points.to_string(),
            player.games_played,
            player.tb_desk,
            player.tb_black
        );
    }

    if !snapshot.board_prizes.is_empty() {
        out.push_str("\nBoard prizes\n");
        for prize in &snapshot.board_prizes {
            let _ = writeln!(
                out,
                "  Desk {}: {} ({}) {}",
                prize.desk_number, prize.full_name, prize.team_id, prize.points
            );
        }
    }
}

fn render_desks(out: &mut String, tables: &[DeskTable]) {
    for table in tables {
        let _ = writeln!(out, "Desk {}", table.desk_number);
        for (rank, player) in table.players.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}  {:<24} {:<8} {:>5} ({}W {}D {}L)",
                rank + 1,
                player.full_name,
                player.team_id,
                player.points.to_string(),
                player.wins,
                player.draws,
                player.losses
            );
        }
    }
}
