//! Error types for the bucket store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the bucket store.
///
/// SQLite error details are flattened into strings so callers never depend on
/// the underlying driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened or configured.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The database handle could not be closed cleanly.
    #[error("failed to close database: {0}")]
    Close(String),

    /// A transaction could not be started or committed.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// A read query failed.
    #[error("read failed: {0}")]
    Read(String),

    /// A write statement failed.
    #[error("write failed: {0}")]
    Write(String),
}
