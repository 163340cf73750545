//! Error types for the heartbeat store.
//!
//! redb and serde_json errors are kept as typed sources so callers can walk
//! the chain down to the underlying I/O failure.

use thiserror::Error;

/// Result type alias for store operations.
pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("database I/O error: {0}")]
    Io(#[from] redb::StorageError),

    #[error("failed to encode heartbeat: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode heartbeat: {0}")]
    Decode(#[source] serde_json::Error),
}
