use minver_graph::WalkError;
use minver_store::StoreError;

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that abort a compatibility check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Root module could not be walked.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// Symbol store could not be queried.
    #[error(transparent)]
    Store(#[from] StoreError),
}
