//! Desk commands.
//!
//! Each command maps to one library operation and produces an [`Outcome`]
//! that [`crate::report`] renders as text or JSON.

use pico_args::Arguments;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use team_chess::db::{Database, DocumentStore, MemoryStore, PgDocumentStore, Records};
use team_chess::results::{BoardEntry, ResultManager, RoundDraft, SaveSummary};
use team_chess::schedule::{ReconcileReport, ScheduleDiff, ScheduleManager};
use team_chess::scoring::DeskTable;
use team_chess::snapshot::{StandingsManager, StandingsSnapshot, StandingsSource, StandingsView};
use team_chess::tournament::{BoardResult, Color, GameResult, RoundId, TournamentError};

use crate::config::{Backend, DeskConfig};

/// A parsed desk command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Ensure the full round-robin schedule
    Schedule,
    /// Diff a round against the expected schedule
    VerifyRound(u32),
    /// Remove duplicate round rows
    CleanupRounds,
    /// Save one board result
    Record {
        pairing_id: String,
        desk_number: u32,
        player_a_id: String,
        player_b_id: String,
        result: Option<GameResult>,
        player_a_color: Option<Color>,
    },
    /// Batch save a round from a JSON draft file
    CommitRound { round_number: u32, draft: PathBuf },
    /// Read standings, from the snapshot unless `live`
    Standings {
        live: bool,
        max_age: Option<Duration>,
    },
    /// Recompute and publish the live snapshot
    Publish,
    /// Per-desk tables
    Desks,
}

impl Command {
    /// Parse the subcommand and its arguments
    ///
    /// # Errors
    ///
    /// Returns a usage error for unknown commands and malformed arguments.
    pub fn parse(pargs: &mut Arguments) -> Result<Self, DeskError> {
        let name = pargs
            .subcommand()
            .map_err(usage)?
            .ok_or_else(|| DeskError::Usage("missing command".to_string()))?;

        let command = match name.as_str() {
            "schedule" => Command::Schedule,
            "verify-round" => Command::VerifyRound(pargs.free_from_str().map_err(usage)?),
            "cleanup-rounds" => Command::CleanupRounds,
            "record" => {
                let player_a_color = pargs
                    .opt_value_from_fn("--a-color", |s| s.parse::<Color>())
                    .map_err(usage)?;
                let pairing_id: String = pargs.free_from_str().map_err(usage)?;
                let desk_number: u32 = pargs.free_from_str().map_err(usage)?;
                let player_a_id: String = pargs.free_from_str().map_err(usage)?;
                let player_b_id: String = pargs.free_from_str().map_err(usage)?;
                let result = pargs.free_from_fn(parse_result).map_err(usage)?;
                Command::Record {
                    pairing_id,
                    desk_number,
                    player_a_id,
                    player_b_id,
                    result,
                    player_a_color,
                }
            }
            "commit-round" => {
                let draft = pargs.value_from_str("--draft").map_err(usage)?;
                let round_number = pargs.free_from_str().map_err(usage)?;
                Command::CommitRound {
                    round_number,
                    draft,
                }
            }
            "standings" => {
                let live = pargs.contains("--live");
                let max_age = pargs
                    .opt_value_from_str::<_, u64>("--max-age")
                    .map_err(usage)?
                    .map(Duration::from_secs);
                Command::Standings { live, max_age }
            }
            "publish" => Command::Publish,
            "desks" => Command::Desks,
            other => return Err(DeskError::Usage(format!("unknown command '{other}'"))),
        };

        let rest = pargs.clone().finish();
        if !rest.is_empty() {
            return Err(DeskError::Usage(format!(
                "unexpected arguments: {}",
                rest.iter()
                    .map(|s| s.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ")
            )));
        }
        Ok(command)
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Schedule => "schedule",
            Command::VerifyRound(_) => "verify-round",
            Command::CleanupRounds => "cleanup-rounds",
            Command::Record { .. } => "record",
            Command::CommitRound { .. } => "commit-round",
            Command::Standings { .. } => "standings",
            Command::Publish => "publish",
            Command::Desks => "desks",
        }
    }
}

/// Parse a result argument; `pending` or `-` clears the result
fn parse_result(s: &str) -> Result<Option<GameResult>, String> {
    match s.trim() {
        "pending" | "-" | "" => Ok(None),
        other => other.parse().map(Some),
    }
}

fn usage(e: pico_args::Error) -> DeskError {
    DeskError::Usage(e.to_string())
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    Scheduled(Vec<ReconcileReport>),
    Verified { round_number: u32, diff: ScheduleDiff },
    CleanedUp(Vec<RoundId>),
    Recorded(BoardResult),
    Committed(SaveSummary),
    Standings(StandingsView),
    Published(StandingsSnapshot),
    Desks(Vec<DeskTable>),
}

/// Errors reported by the desk
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error("Cannot read draft {}: {source}", path.display())]
    DraftRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed draft {}: {source}", path.display())]
    DraftFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cannot open storage: {0}")]
    Storage(String),
}

impl DeskError {
    /// Message shown to the operator
    pub fn client_message(&self) -> String {
        match self {
            DeskError::Tournament(e) => e.client_message(),
            other => other.to_string(),
        }
    }
}

/// Managers over one opened store
#[derive(Clone)]
pub struct Session {
    pub records: Records,
    pub schedule: ScheduleManager,
    pub results: ResultManager,
    pub standings: StandingsManager,
    snapshot_max_age: Option<Duration>,
}

impl Session {
    /// Build a session over an already opened store
    pub fn new(store: Arc<dyn DocumentStore>, config: &DeskConfig) -> Self {
        let records = Records::new(store);
        Self {
            schedule: ScheduleManager::new(records.clone(), config.tournament_id.clone()),
            results: ResultManager::new(records.clone()),
            standings: StandingsManager::new(records.clone(), config.scoring),
            snapshot_max_age: config.snapshot_max_age,
            records,
        }
    }

    /// Open the configured store and build a session over it
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the data file is unreadable or the database
    /// cannot be reached.
    pub async fn open(config: &DeskConfig) -> Result<Self, DeskError> {
        let store: Arc<dyn DocumentStore> = match &config.backend {
            Backend::File(path) => {
                log::info!("Using data file {}", path.display());
                let store = MemoryStore::open(path)
                    .await
                    .map_err(|e| DeskError::Storage(format!("{}: {e}", path.display())))?;
                Arc::new(store)
            }
            Backend::Postgres(db_config) => {
                let db = Database::new(db_config)
                    .await
                    .map_err(|e| DeskError::Storage(format!("database: {e}")))?;
                db.ensure_schema()
                    .await
                    .map_err(|e| DeskError::Storage(format!("schema: {e}")))?;
                Arc::new(PgDocumentStore::new(db.pool().clone()))
            }
        };
        Ok(Self::new(store, config))
    }

    /// Run one command
    pub async fn run(&self, command: Command) -> Result<Outcome, DeskError> {
        let outcome = match command {
            Command::Schedule => Outcome::Scheduled(self.schedule.ensure_schedule().await?),
            Command::VerifyRound(round_number) => Outcome::Verified {
                round_number,
                diff: self.schedule.verify_round(round_number).await?,
            },
            Command::CleanupRounds => {
                Outcome::CleanedUp(self.schedule.cleanup_duplicate_rounds().await?)
            }
            Command::Record {
                pairing_id,
                desk_number,
                player_a_id,
                player_b_id,
                result,
                player_a_color,
            } => {
                let entry = BoardEntry {
                    pairing_id,
                    desk_number,
                    player_a_id,
                    player_b_id,
                    result,
                    player_a_color,
                };
                Outcome::Recorded(self.results.upsert_board_result(entry).await?)
            }
            Command::CommitRound {
                round_number,
                draft,
            } => Outcome::Committed(self.commit_round(round_number, &draft).await?),
            Command::Standings { live, max_age } => {
                if live {
                    let standings = self.standings.compute_live().await?;
                    Outcome::Standings(StandingsView {
                        source: StandingsSource::Live,
                        snapshot: StandingsSnapshot::from_standings(
                            &standings,
                            chrono::Utc::now(),
                        ),
                    })
                } else {
                    let max_age = max_age.or(self.snapshot_max_age);
                    Outcome::Standings(self.standings.get_standings(max_age).await?)
                }
            }
            Command::Publish => Outcome::Published(self.standings.recompute_and_publish().await?),
            Command::Desks => {
                Outcome::Desks(self.standings.compute_live().await?.desk_tables)
            }
        };
        Ok(outcome)
    }

    async fn commit_round(
        &self,
        round_number: u32,
        draft_path: &Path,
    ) -> Result<SaveSummary, DeskError> {
        let raw = tokio::fs::read_to_string(draft_path)
            .await
            .map_err(|source| DeskError::DraftRead {
                path: draft_path.to_path_buf(),
                source,
            })?;
        let draft: RoundDraft =
            serde_json::from_str(&raw).map_err(|source| DeskError::DraftFormat {
                path: draft_path.to_path_buf(),
                source,
            })?;

        let round = self
            .schedule
            .find_round(round_number)
            .await?
            .ok_or_else(|| TournamentError::not_found("Round", round_number.to_string()))?;

        log::info!(
            "Committing round {round_number} ({}) with {} drafted board(s)",
            round.id,
            draft.len()
        );
        Ok(self.results.commit_round(&round.id, &draft).await?)
    }
}
