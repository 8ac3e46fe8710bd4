//! CLI errors and their conversion to miette reports.

use std::path::PathBuf;

use minver::CheckError;
use minver_config::ConfigError;
use minver_graph::{LoaderError, WalkError};
use minver_store::StoreError;
use miette::Report;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not read import manifest: {0}")]
    Manifest(#[source] LoaderError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Symbol store error: {0}")]
    Store(#[from] StoreError),

    /// Building the store needs the documentation tree
    #[error("No documentation directory configured for building {}", .0.display())]
    MissingDocsDir(PathBuf),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convert a CLI error to a miette report with a hint where one helps.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Store(StoreError::NotFound(path)) => miette::miette!(
            "Symbol store not found: {}\n\nHint: build it with `minver build-store --docs-dir <DIR>`",
            path.display()
        ),
        CliError::Store(StoreError::FormatMismatch { expected, found }) => miette::miette!(
            "Symbol store has format {found}, expected {expected}\n\nHint: rebuild it with --rebuild-store"
        ),
        CliError::Check(CheckError::Walk(WalkError::RootNotLoadable { path, source })) => {
            miette::miette!(
                "Cannot load root module {}: {}\n\nHint: the root must be listed in the import manifest",
                path.display(),
                source
            )
        }
        CliError::MissingDocsDir(path) => miette::miette!(
            "No documentation directory configured for building {}\n\nHint: pass --docs-dir or set docs_dir in minver.toml",
            path.display()
        ),
        _ => miette::miette!("{}", err),
    }
}
