//! Roster manager: teams and players.

use super::errors::{TournamentError, TournamentResult};
use super::models::{BoardResult, Pairing, Player, Team};
use crate::db::{Query, Records};

/// Roster manager
#[derive(Clone)]
pub struct RosterManager {
    records: Records,
}

impl RosterManager {
    /// Create a new roster manager
    pub fn new(records: Records) -> Self {
        Self { records }
    }

    /// Register a team
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty id or name, or when the id is taken.
    pub async fn add_team(&self, team: Team) -> TournamentResult<Team> {
        if team.id.trim().is_empty() || team.name.trim().is_empty() {
            return Err(TournamentError::Validation(
                "Team id and name are required".to_string(),
            ));
        }
        if self.records.get::<Team>(&team.id).await?.is_some() {
            return Err(TournamentError::Validation(format!(
                "Team {} already exists",
                team.id
            )));
        }

        let team = self.records.insert(&team).await?;
        log::info!("Added team {} ({})", team.name, team.id);
        Ok(team)
    }

    /// Register a player on an existing team
    ///
    /// # Errors
    ///
    /// * `NotFound` - the team does not exist
    /// * `Validation` - desk 0, an occupied desk, or a taken id
    pub async fn add_player(&self, player: Player) -> TournamentResult<Player> {
        if player.id.trim().is_empty() || player.full_name.trim().is_empty() {
            return Err(TournamentError::Validation(
                "Player id and name are required".to_string(),
            ));
        }
        if player.desk_number == 0 {
            return Err(TournamentError::Validation(
                "Desk numbers start at 1".to_string(),
            ));
        }
        if self.records.get::<Team>(&player.team_id).await?.is_none() {
            return Err(TournamentError::not_found("Team", &player.team_id));
        }
        if self.records.get::<Player>(&player.id).await?.is_some() {
            return Err(TournamentError::Validation(format!(
                "Player {} already exists",
                player.id
            )));
        }

        let roster = self.roster(&player.team_id).await?;
        if let Some(holder) = roster.iter().find(|p| p.desk_number == player.desk_number) {
            return Err(TournamentError::Validation(format!(
                "Desk {} of team {} is already held by {}",
                player.desk_number, player.team_id, holder.full_name
            )));
        }

        let player = self.records.insert(&player).await?;
        log::info!(
            "Added player {} to team {} on desk {}",
            player.full_name,
            player.team_id,
            player.desk_number
        );
        Ok(player)
    }

    /// All teams in store order
    pub async fn teams(&self) -> TournamentResult<Vec<Team>> {
        Ok(self.records.all().await?)
    }

    /// All players of every team
    pub async fn players(&self) -> TournamentResult<Vec<Player>> {
        Ok(self.records.all().await?)
    }

    /// A team's players ordered by desk number
    pub async fn roster(&self, team_id: &str) -> TournamentResult<Vec<Player>> {
        let query = Query::all()
            .filter("team_id", team_id)
            .sort_by("desk_number");
        Ok(self.records.list(&query).await?)
    }

    /// Delete a team that nothing refers to
    ///
    /// # Errors
    ///
    /// * `NotFound` - no such team
    /// * `Referenced` - players or pairings still point at the team
    pub async fn delete_team(&self, team_id: &str) -> TournamentResult<()> {
        if self.records.get::<Team>(team_id).await?.is_none() {
            return Err(TournamentError::not_found("Team", team_id));
        }

        let players = self.roster(team_id).await?;
        if !players.is_empty() {
            return Err(TournamentError::Referenced {
                entity: "Team",
                id: team_id.to_string(),
                by: format!("{} player(s)", players.len()),
            });
        }

        let as_a: Vec<Pairing> = self
            .records
            .list(&Query::all().filter("team_a_id", team_id))
            .await?;
        let as_b: Vec<Pairing> = self
            .records
            .list(&Query::all().filter("team_b_id", team_id))
            .await?;
        if !as_a.is_empty() || !as_b.is_empty() {
            return Err(TournamentError::Referenced {
                entity: "Team",
                id: team_id.to_string(),
                by: format!("{} pairing(s)", as_a.len() + as_b.len()),
            });
        }

        self.records.delete::<Team>(team_id).await?;
        log::info!("Deleted team {team_id}");
        Ok(())
    }

    /// Delete a player with no recorded games
    ///
    /// # Errors
    ///
    /// * `NotFound` - no such player
    /// * `Referenced` - board results still name the player
    pub async fn delete_player(&self, player_id: &str) -> TournamentResult<()> {
        if self.records.get::<Player>(player_id).await?.is_none() {
            return Err(TournamentError::not_found("Player", player_id));
        }

        let as_a: Vec<BoardResult> = self
            .records
            .list(&Query::all().filter("player_a_id", player_id))
            .await?;
        let as_b: Vec<BoardResult> = self
            .records
            .list(&Query::all().filter("player_b_id", player_id))
            .await?;
        let games = as_a.len() + as_b.len();
        if games > 0 {
            return Err(TournamentError::Referenced {
                entity: "Player",
                id: player_id.to_string(),
                by: format!("{games} board result(s)"),
            });
        }

        self.records.delete::<Player>(player_id).await?;
        log::info!("Deleted player {player_id}");
        Ok(())
    }
}
