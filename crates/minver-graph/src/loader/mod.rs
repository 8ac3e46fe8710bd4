//! Module loader abstraction.
//!
//! The walker never parses binaries itself. It consumes a `ModuleLoader`
//! that reads a module's import table and applies the platform's search-order
//! rules to locate imported modules. Loader backends implement this trait.

pub mod manifest;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use manifest::{ImportManifest, ManifestImport, ManifestLoader, ManifestModule};

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors that can occur while loading a module's import table
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// File does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File exists but is not a loadable module
    #[error("Not a loadable module: {}: {reason}", .path.display())]
    NotAModule { path: PathBuf, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// A single symbol imported from another module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportedSymbol {
    /// Import by exported name
    Name(String),
    /// Import by ordinal only
    Ordinal(u16),
}

impl ImportedSymbol {
    /// Name used to key the symbol in the graph and in store lookups.
    ///
    /// Ordinal imports have no name, so they are keyed as `Ordinal_<n>`.
    pub fn key(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Ordinal(ordinal) => format!("Ordinal_{}", ordinal),
        }
    }
}

impl fmt::Display for ImportedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Ordinal(ordinal) => write!(f, "Ordinal_{}", ordinal),
        }
    }
}

/// Symbols a module imports from one requested module name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImports {
    /// Module name as written in the import table (e.g. `KERNEL32.dll`)
    pub module: String,
    /// Symbols consumed from that module
    pub symbols: Vec<ImportedSymbol>,
}

impl ModuleImports {
    pub fn new(module: impl Into<String>, symbols: Vec<ImportedSymbol>) -> Self {
        Self {
            module: module.into(),
            symbols,
        }
    }
}

/// Import table of one module, grouped by requested module name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    pub imports: Vec<ModuleImports>,
}

impl ImportTable {
    pub fn new(imports: Vec<ModuleImports>) -> Self {
        Self { imports }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Which loader search rule located an imported module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// The requested name was already a full path
    FullPath,
    /// Found next to the referencing module
    ApplicationDirectory,
    /// Found in one of the configured search directories
    SearchPath,
}

/// Outcome of resolving an imported module name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    /// Module located on disk.
    Found {
        strategy: SearchStrategy,
        path: PathBuf,
    },
    /// No search rule located the module.
    NotFound,
}

impl ResolveResult {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found { .. })
    }
}

/// Module loader capability consumed by the graph walker.
///
/// Implementations must be deterministic for the lifetime of one walk: the
/// walker memoizes by resolved path and never asks twice for the same module.
pub trait ModuleLoader: Send + Sync + fmt::Debug {
    /// Read the import table of the module at `path`.
    fn load(&self, path: &Path) -> LoaderResult<ImportTable>;

    /// Locate `requested` as imported by the module at `referencing`.
    fn resolve(&self, referencing: &Path, requested: &str) -> ResolveResult;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load(&self, path: &Path) -> LoaderResult<ImportTable> {
        (**self).load(path)
    }

    fn resolve(&self, referencing: &Path, requested: &str) -> ResolveResult {
        (**self).resolve(referencing, requested)
    }
}
