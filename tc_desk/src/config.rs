//! Desk configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use team_chess::db::DatabaseConfig;
use team_chess::scoring::{BLACK_BONUS, DESK_WEIGHT_SCALE, ScoringConfig, TeamScoring};

/// Data file used when neither a file nor a database is configured
pub const DEFAULT_DATA_FILE: &str = "db.json";

/// Tournament id used for deterministic round ids when none is configured
pub const DEFAULT_TOURNAMENT_ID: &str = "default";

/// Where tournament records are kept
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// JSON data file loaded into memory
    File(PathBuf),
    /// PostgreSQL document table
    Postgres(DatabaseConfig),
}

/// Values given on the command line, which win over the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub database_url: Option<String>,
    pub tournament_id: Option<String>,
}

/// Complete desk configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    /// Record storage
    pub backend: Backend,
    /// Tournament id used in round ids
    pub tournament_id: String,
    /// Tie-break weights and team-scoring model
    pub scoring: ScoringConfig,
    /// Oldest snapshot `standings` accepts before recomputing
    pub snapshot_max_age: Option<Duration>,
}

impl DeskConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI flags
    ///
    /// Storage is chosen in this order: `--db-url`, `--data`, `TC_DATA_FILE`,
    /// `DATABASE_URL`, then `db.json` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let backend = if let Some(url) = overrides.database_url {
            Backend::Postgres(database_config(url)?)
        } else if let Some(path) = overrides.data_file {
            Backend::File(path)
        } else if let Some(path) = non_empty_env("TC_DATA_FILE") {
            Backend::File(PathBuf::from(path))
        } else if let Some(url) = non_empty_env("DATABASE_URL") {
            Backend::Postgres(database_config(url)?)
        } else {
            Backend::File(PathBuf::from(DEFAULT_DATA_FILE))
        };

        let tournament_id = overrides
            .tournament_id
            .or_else(|| non_empty_env("TOURNAMENT_ID"))
            .unwrap_or_else(|| DEFAULT_TOURNAMENT_ID.to_string());

        let scoring = ScoringConfig {
            desk_weight_scale: parse_env_or("DESK_WEIGHT_SCALE", DESK_WEIGHT_SCALE)?,
            black_bonus: parse_env_or("BLACK_BONUS", BLACK_BONUS)?,
            team_scoring: parse_env_or("TEAM_SCORING", TeamScoring::default())?,
        };

        let snapshot_max_age = parse_env::<u64>("SNAPSHOT_MAX_AGE_SECS")?.map(Duration::from_secs);

        Ok(DeskConfig {
            backend,
            tournament_id,
            scoring,
            snapshot_max_age,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tournament_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TOURNAMENT_ID".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if let Err(e) = self.scoring.validate() {
            let var = if (0.0..=1.0).contains(&self.scoring.desk_weight_scale) {
                "BLACK_BONUS"
            } else {
                "DESK_WEIGHT_SCALE"
            };
            return Err(ConfigError::Invalid {
                var: var.to_string(),
                reason: e.to_string(),
            });
        }

        if let Backend::Postgres(db) = &self.backend {
            if db.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
            if db.min_connections > db.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!("Cannot exceed max connections ({})", db.max_connections),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Invalid database pool settings: {0}")]
    Pool(String),
}

fn database_config(url: String) -> Result<DatabaseConfig, ConfigError> {
    DatabaseConfig::from_env(url).map_err(ConfigError::Pool)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable if it is set
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{raw}': {e}"),
            }),
        None => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_env(key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "TC_DATA_FILE",
        "DATABASE_URL",
        "TOURNAMENT_ID",
        "DESK_WEIGHT_SCALE",
        "BLACK_BONUS",
        "TEAM_SCORING",
        "SNAPSHOT_MAX_AGE_SECS",
        "DB_MAX_CONNECTIONS",
    ];

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        // SAFETY: every test touching the environment runs under #[serial]
        unsafe {
            for key in VARS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        let result = f();
        unsafe {
            for (key, _) in vars {
                std::env::remove_var(key);
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let config = with_env(&[], || DeskConfig::from_env(ConfigOverrides::default())).unwrap();
        assert_eq!(config.backend, Backend::File(PathBuf::from("db.json")));
        assert_eq!(config.tournament_id, "default");
        assert_eq!(config.scoring, ScoringConfig::default());
        assert!(config.snapshot_max_age.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_values() {
        let config = with_env(
            &[
                ("TC_DATA_FILE", "/tmp/cup.json"),
                ("DATABASE_URL", "postgres://localhost/ignored"),
                ("TOURNAMENT_ID", "spring"),
                ("TEAM_SCORING", "matches"),
                ("DESK_WEIGHT_SCALE", "0.25"),
                ("SNAPSHOT_MAX_AGE_SECS", "300"),
            ],
            || DeskConfig::from_env(ConfigOverrides::default()),
        )
        .unwrap();

        assert_eq!(config.backend, Backend::File(PathBuf::from("/tmp/cup.json")));
        assert_eq!(config.tournament_id, "spring");
        assert_eq!(config.scoring.team_scoring, TeamScoring::MatchPoints);
        assert_eq!(config.scoring.desk_weight_scale, 0.25);
        assert_eq!(config.snapshot_max_age, Some(Duration::from_secs(300)));
    }

    #[test]
    #[serial]
    fn test_flags_win_over_env() {
        let overrides = ConfigOverrides {
            database_url: Some("postgres://localhost/cup".to_string()),
            data_file: Some(PathBuf::from("local.json")),
            tournament_id: Some("cli".to_string()),
        };
        let config = with_env(&[("TC_DATA_FILE", "/tmp/cup.json")], || {
            DeskConfig::from_env(overrides)
        })
        .unwrap();

        match config.backend {
            Backend::Postgres(db) => assert_eq!(db.database_url, "postgres://localhost/cup"),
            other => panic!("unexpected backend: {other:?}"),
        }
        assert_eq!(config.tournament_id, "cli");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_are_rejected() {
        let err = with_env(&[("BLACK_BONUS", "lots")], || {
            DeskConfig::from_env(ConfigOverrides::default())
        })
        .unwrap_err();
        assert!(err.to_string().contains("BLACK_BONUS"));

        let err = with_env(&[("TEAM_SCORING", "elo")], || {
            DeskConfig::from_env(ConfigOverrides::default())
        })
        .unwrap_err();
        assert!(err.to_string().contains("expected boards or matches"));

        let err = with_env(
            &[
                ("DATABASE_URL", "postgres://localhost/cup"),
                ("DB_MAX_CONNECTIONS", "many"),
            ],
            || DeskConfig::from_env(ConfigOverrides::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Pool(_)));
    }

    #[test]
    fn test_validation_of_scoring_ranges() {
        let mut config = DeskConfig {
            backend: Backend::File(PathBuf::from("db.json")),
            tournament_id: "cup".to_string(),
            scoring: ScoringConfig::default(),
            snapshot_max_age: None,
        };

        config.scoring.black_bonus = 0.5; // Invalid: above 0.25
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("BLACK_BONUS"));

        config.scoring.black_bonus = BLACK_BONUS;
        config.scoring.desk_weight_scale = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DESK_WEIGHT_SCALE"));

        config.scoring.desk_weight_scale = DESK_WEIGHT_SCALE;
        config.tournament_id = " ".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid { .. }
        ));
    }

    #[test]
    fn test_validation_of_pool_settings() {
        let mut db = DatabaseConfig::with_url("postgres://localhost/cup");
        db.min_connections = 10;
        let config = DeskConfig {
            backend: Backend::Postgres(db),
            tournament_id: "cup".to_string(),
            scoring: ScoringConfig::default(),
            snapshot_max_age: None,
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DB_MIN_CONNECTIONS"));
    }
}
