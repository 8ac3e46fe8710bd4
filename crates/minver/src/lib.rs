//! # minver
//!
//! Minimum Windows version auditing for native binaries.
//!
//! A check walks the import graph of a root module, looks every imported
//! symbol up in a symbol store, and reduces the matches to one verdict:
//!
//! - the **required version**, the highest documented minimum over all
//!   matched symbols, and the symbols that set it
//! - **unexpected** symbols, newer than a configured threshold
//! - **disallowed** symbols, imported from modules on a deny list
//! - **unresolved** modules, imports the loader could not locate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minver::{CheckOptions, VersionThreshold, default_should_recurse, run_check};
//! use minver_graph::ManifestLoader;
//! use minver_store::SymbolStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ManifestLoader::from_file(Path::new("imports.toml"))?;
//! let store = SymbolStore::open("symbols.redb")?;
//! let options = CheckOptions::new().max_allowed("Win7".parse::<VersionThreshold>()?);
//!
//! let report = run_check(&loader, &store, "C:/App/app.exe", default_should_recurse, &options)?;
//! println!("requires {}", report.required);
//! std::process::exit(report.exit_code().into());
//! # }
//! ```

pub mod check;
pub mod error;
pub mod evaluate;
pub mod flatten;
pub mod report;
pub mod threshold;

pub use check::{
    Checker, DEFAULT_NO_RECURSE_PATTERN, default_should_recurse, recurse_unless_matches, run_check,
};
pub use error::{CheckError, Result};
pub use evaluate::{CheckOptions, evaluate};
pub use flatten::{FlattenedGraph, SymbolUse};
pub use report::{
    CheckReport, CheckStatus, EXIT_NO_SYMBOLS, MAX_VIOLATION_EXIT, ResolvedSymbol,
    combined_exit_code,
};
pub use threshold::VersionThreshold;
