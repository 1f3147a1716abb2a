//! Store error types.

use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No document with this id
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Insert hit an existing id
    #[error("Document already exists: {collection}/{id}")]
    Duplicate { collection: String, id: String },

    /// Document body has no string `id` field
    #[error("Document in '{collection}' has no string id")]
    MissingId { collection: String },
}

impl StoreError {
    /// Whether the error is a missing document rather than a storage failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Whether the error is a duplicate-id insert
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
