use std::path::PathBuf;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while building, opening or querying the symbol store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No store file at the given path
    #[error("symbol store not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Store was written by an incompatible version
    #[error("symbol store format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: u32, found: String },

    /// Database has no table of the expected layout
    #[error("symbol store is missing a table")]
    MissingTable,

    /// Store database error
    #[error("symbol store database error: {0}")]
    Database(String),

    /// Corpus file could not be read or parsed
    #[error("invalid corpus file {}: {reason}", .path.display())]
    Corpus { path: PathBuf, reason: String },

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::Error> for StoreError {
    fn from(err: redb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Database(err.to_string())
    }
}
