//! Command implementations. Each returns the process exit code.

mod build_store;
mod check;

pub use build_store::execute as build_store_execute;
pub use check::execute as check_execute;

use minver_config::MinverConfig;
use minver_store::{SymbolStore, read_corpus};

use crate::error::{CliError, Result};

/// Open the configured store, building it from the documentation tree when
/// it is missing or `rebuild` is set.
pub(crate) fn open_store(config: &MinverConfig, rebuild: bool) -> Result<SymbolStore> {
    match &config.docs_dir {
        Some(docs_dir) => Ok(SymbolStore::load_or_build(
            &config.store_path,
            rebuild,
            || read_corpus(docs_dir),
        )?),
        None if rebuild => Err(CliError::MissingDocsDir(config.store_path.clone())),
        None => Ok(SymbolStore::open(&config.store_path)?),
    }
}
