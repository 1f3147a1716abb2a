//! Standings computation.
//!
//! Standings are always derived from board results. The cached stats on
//! players and pairings are never read here.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::config::{ScoringConfig, TeamScoring};
use super::models::{BoardPrize, DeskTable, PlayerStanding, Standings, TeamStanding, Wdl};
use super::tiebreak::{color_multiplier, desk_weight, max_desk, round3, to_milli};
use crate::tournament::{BoardResult, Pairing, Player, PlayerId, Score, Team};

/// Game record of one player summed over board results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: Score,
}

impl PlayerTotals {
    fn add_game(&mut self, own: Score, opponent: Score) {
        match own.cmp(&opponent) {
            Ordering::Greater => self.wins += 1,
            Ordering::Equal => self.draws += 1,
            Ordering::Less => self.losses += 1,
        }
        self.points += own;
    }

    /// Games counted
    pub fn games_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Sum every decided board into per-player records
///
/// Pending boards (`result == None`) are skipped.
pub fn player_totals(board_results: &[BoardResult]) -> HashMap<PlayerId, PlayerTotals> {
    let mut totals: HashMap<PlayerId, PlayerTotals> = HashMap::new();
    for board in board_results {
        let Some(result) = board.result else {
            continue;
        };
        let (a, b) = result.points();
        totals
            .entry(board.player_a_id.clone())
            .or_default()
            .add_game(a, b);
        totals
            .entry(board.player_b_id.clone())
            .or_default()
            .add_game(b, a);
    }
    totals
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    record: PlayerTotals,
    tb_desk: f64,
    tb_black: f64,
}

impl Tally {
    fn add_game(&mut self, own: Score, opponent: Score, desk_weight: f64, color_mult: f64) {
        self.record.add_game(own, opponent);
        self.tb_desk += own.as_f64() * desk_weight;
        self.tb_black += own.as_f64() * color_mult;
    }

    fn wdl(&self) -> Wdl {
        Wdl {
            wins: self.record.wins,
            draws: self.record.draws,
            losses: self.record.losses,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MatchTally {
    points: Score,
    wdl: Wdl,
}

/// Compute player standings, team standings, desk tables and board prizes
///
/// Every roster player and every team gets a row, including those without
/// games. BYE pairings contribute nothing.
pub fn compute_standings(
    teams: &[Team],
    players: &[Player],
    pairings: &[Pairing],
    board_results: &[BoardResult],
    config: &ScoringConfig,
) -> Standings {
    let max = max_desk(players, board_results);
    let weight = |desk: u32| desk_weight(desk, max, config.desk_weight_scale);
    let color = |c| color_multiplier(c, config.black_bonus);

    let mut player_tallies: HashMap<&str, Tally> = HashMap::new();
    let mut boards_by_pairing: HashMap<&str, Vec<&BoardResult>> = HashMap::new();

    for board in board_results {
        boards_by_pairing
            .entry(board.pairing_id.as_str())
            .or_default()
            .push(board);

        let Some(result) = board.result else {
            continue;
        };
        let (a, b) = result.points();
        let w = weight(board.desk_number);
        player_tallies
            .entry(board.player_a_id.as_str())
            .or_default()
            .add_game(a, b, w, color(board.player_a_color));
        player_tallies
            .entry(board.player_b_id.as_str())
            .or_default()
            .add_game(b, a, w, color(board.player_b_color));
    }

    let mut player_standings: Vec<PlayerStanding> = players
        .iter()
        .map(|p| {
            let tally = player_tallies.get(p.id.as_str()).copied().unwrap_or_default();
            PlayerStanding {
                player_id: p.id.clone(),
                full_name: p.full_name.clone(),
                team_id: p.team_id.clone(),
                desk_number: p.desk_number,
                points: tally.record.points,
                wins: tally.record.wins,
                draws: tally.record.draws,
                losses: tally.record.losses,
                games_played: tally.record.games_played(),
                tb_desk: round3(tally.tb_desk),
                tb_black: round3(tally.tb_black),
            }
        })
        .collect();
    player_standings.sort_by(compare_players);

    let mut team_boards: HashMap<&str, Tally> = HashMap::new();
    let mut team_matches: HashMap<&str, MatchTally> = HashMap::new();

    for pairing in pairings {
        let Some((team_a, team_b)) = pairing.teams() else {
            continue;
        };
        let Some(boards) = boards_by_pairing.get(pairing.id.as_str()) else {
            continue;
        };

        let mut a_points = Score::ZERO;
        let mut b_points = Score::ZERO;
        let mut decided = false;

        for board in boards {
            let Some(result) = board.result else {
                continue;
            };
            decided = true;
            let (a, b) = result.points();
            a_points += a;
            b_points += b;

            let w = weight(board.desk_number);
            team_boards
                .entry(team_a)
                .or_default()
                .add_game(a, b, w, color(board.player_a_color));
            team_boards
                .entry(team_b)
                .or_default()
                .add_game(b, a, w, color(board.player_b_color));
        }

        if decided {
            let (a_match, b_match) = match a_points.cmp(&b_points) {
                Ordering::Greater => (Score::ONE, Score::ZERO),
                Ordering::Equal => (Score::HALF, Score::HALF),
                Ordering::Less => (Score::ZERO, Score::ONE),
            };
            record_match(team_matches.entry(team_a).or_default(), a_match, b_match);
            record_match(team_matches.entry(team_b).or_default(), b_match, a_match);
        }
    }

    let mut team_standings: Vec<TeamStanding> = teams
        .iter()
        .map(|t| {
            let boards = team_boards.get(t.id.as_str()).copied().unwrap_or_default();
            let matches = team_matches.get(t.id.as_str()).copied().unwrap_or_default();
            let (points, wdl) = match config.team_scoring {
                TeamScoring::BoardPoints => (boards.record.points, boards.wdl()),
                TeamScoring::MatchPoints => (matches.points, matches.wdl),
            };
            TeamStanding {
                team_id: t.id.clone(),
                name: t.name.clone(),
                short_code: t.short_code.clone(),
                points,
                points_from_boards: boards.record.points,
                points_from_pairings: matches.points,
                wdl,
                tb_desk: round3(boards.tb_desk),
                tb_black: round3(boards.tb_black),
            }
        })
        .collect();
    team_standings.sort_by(compare_teams);

    let desk_tables = desk_tables(&player_standings);
    let board_prizes = board_prizes(&desk_tables);

    Standings {
        player_standings,
        team_standings,
        board_prizes,
        desk_tables,
    }
}

fn record_match(tally: &mut MatchTally, own: Score, opponent: Score) {
    tally.points += own;
    match own.cmp(&opponent) {
        Ordering::Greater => tally.wdl.wins += 1,
        Ordering::Equal => tally.wdl.draws += 1,
        Ordering::Less => tally.wdl.losses += 1,
    }
}

/// Player order: points, tb_desk, tb_black, wins (all descending), then name and id
pub fn compare_players(a: &PlayerStanding, b: &PlayerStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| to_milli(b.tb_desk).cmp(&to_milli(a.tb_desk)))
        .then_with(|| to_milli(b.tb_black).cmp(&to_milli(a.tb_black)))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.full_name.cmp(&b.full_name))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// Team order: points, tb_desk, tb_black, wins (all descending), then name and id
pub fn compare_teams(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| to_milli(b.tb_desk).cmp(&to_milli(a.tb_desk)))
        .then_with(|| to_milli(b.tb_black).cmp(&to_milli(a.tb_black)))
        .then_with(|| b.wdl.wins.cmp(&a.wdl.wins))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Group sorted player standings by roster desk, keeping their order
pub fn desk_tables(player_standings: &[PlayerStanding]) -> Vec<DeskTable> {
    let mut by_desk: BTreeMap<u32, Vec<PlayerStanding>> = BTreeMap::new();
    for standing in player_standings {
        by_desk
            .entry(standing.desk_number)
            .or_default()
            .push(standing.clone());
    }
    by_desk
        .into_iter()
        .map(|(desk_number, players)| DeskTable {
            desk_number,
            players,
        })
        .collect()
}

fn board_prizes(desk_tables: &[DeskTable]) -> Vec<BoardPrize> {
    desk_tables
        .iter()
        .filter_map(|table| {
            table.players.first().map(|p| BoardPrize {
                desk_number: table.desk_number,
                player_id: p.player_id.clone(),
                full_name: p.full_name.clone(),
                team_id: p.team_id.clone(),
                points: p.points,
            })
        })
        .collect()
}
