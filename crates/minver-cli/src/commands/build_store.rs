use std::path::Path;

use minver_config::MinverConfig;
use minver_store::{SymbolStore, read_corpus};

use crate::cli::BuildStoreArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// Rebuild the symbol store from the documentation tree.
pub fn execute(args: BuildStoreArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = MinverConfig::load(config_path, &args.store.overrides())?;
    let docs_dir = config
        .docs_dir
        .as_deref()
        .ok_or_else(|| CliError::MissingDocsDir(config.store_path.clone()))?;

    ui::info(&format!("Reading API documentation from {}", docs_dir.display()));
    let records = read_corpus(docs_dir)?;
    let store = SymbolStore::rebuild(&config.store_path, records)?;

    ui::success(&format!(
        "Built {} with {} symbols",
        store.path().display(),
        store.len()?
    ));
    Ok(0)
}
