//! Tournament error types.

use crate::db::StoreError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Input rejected before anything was written
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Writes were accepted but could not be read back
    #[error("Saved data could not be verified for: {}", missing.join(", "))]
    Consistency { missing: Vec<String> },

    /// Round commit attempted before every required board has a result
    #[error("Round is incomplete, missing results for: {}", missing.join(", "))]
    RoundIncomplete { missing: Vec<String> },

    /// Stored pairings still diverge from the expected schedule
    #[error("Round {round_number} does not match the schedule: {diff}")]
    ScheduleConflict { round_number: u32, diff: String },

    /// Deletion refused because other records still point at this one
    #[error("{entity} {id} is still referenced by {by}")]
    Referenced {
        entity: &'static str,
        id: String,
        by: String,
    },

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Shorthand for a not-found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        TournamentError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Get a client-safe error message
    ///
    /// Storage errors are reduced to a generic message so SQL and file
    /// system details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(StoreError::NotFound { collection, id }) => {
                format!("Record not found: {collection}/{id}")
            }
            TournamentError::Store(_) => "Storage unavailable, please retry".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_storage_details() {
        let err = TournamentError::Store(StoreError::Io(std::io::Error::other(
            "/var/lib/secret/db.json: permission denied",
        )));
        assert_eq!(err.client_message(), "Storage unavailable, please retry");
    }

    #[test]
    fn test_consistency_lists_keys() {
        let err = TournamentError::Consistency {
            missing: vec!["p1#1".to_string(), "p1#3".to_string()],
        };
        assert_eq!(
            err.client_message(),
            "Saved data could not be verified for: p1#1, p1#3"
        );
    }
}
