//! End-to-end check of one root module.

use std::path::Path;

use minver_graph::{GraphWalker, ModuleLoader};
use minver_store::SymbolLookup;
use tracing::debug;

use crate::Result;
use crate::evaluate::{CheckOptions, evaluate};
use crate::flatten::FlattenedGraph;
use crate::report::CheckReport;
use crate::threshold::VersionThreshold;

/// Path fragment of modules whose imports are not walked by default.
pub const DEFAULT_NO_RECURSE_PATTERN: &str = "system32";

/// Default recursion filter: do not walk into system directories.
pub fn default_should_recurse(path: &Path) -> bool {
    !path
        .to_string_lossy()
        .to_lowercase()
        .contains(DEFAULT_NO_RECURSE_PATTERN)
}

/// Recursion filter rejecting paths that contain any of `patterns`,
/// case-insensitively.
pub fn recurse_unless_matches(patterns: Vec<String>) -> impl Fn(&Path) -> bool + Send + Sync {
    let patterns: Vec<String> = patterns
        .into_iter()
        .map(|pattern| pattern.to_lowercase())
        .filter(|pattern| !pattern.is_empty())
        .collect();

    move |path: &Path| {
        let path = path.to_string_lossy().to_lowercase();
        !patterns.iter().any(|pattern| path.contains(pattern.as_str()))
    }
}

/// Walk `root`, look up every imported symbol and evaluate the result.
///
/// Fails only if the root cannot be loaded or the store cannot be read.
pub fn run_check(
    loader: &dyn ModuleLoader,
    store: &dyn SymbolLookup,
    root: impl AsRef<Path>,
    should_recurse: impl Fn(&Path) -> bool + Send + Sync,
    options: &CheckOptions,
) -> Result<CheckReport> {
    let root = root.as_ref();

    let graph = GraphWalker::new(loader)
        .should_recurse(should_recurse)
        .walk(root)?;
    let flattened = FlattenedGraph::from_graph(&graph);

    debug!(
        root = %root.display(),
        modules = graph.len(),
        symbols = flattened.len(),
        "flattened import graph"
    );

    Ok(evaluate(root, &flattened, store, options)?)
}

/// Builder over [`run_check`].
///
/// # Example
///
/// ```rust
/// use minver::{Checker, VersionThreshold};
/// use minver_graph::{ImportManifest, ManifestLoader, ManifestModule};
/// use minver_store::{Build, MemoryStore, OsVersion, SymbolRecord};
///
/// let loader = ManifestLoader::new(
///     ImportManifest::new()
///         .module(ManifestModule::new("/app/app.exe").import("kernel32.dll", &["CreateFile2"]))
///         .module(ManifestModule::new("/app/kernel32.dll")),
/// );
/// let store = MemoryStore::from_records([SymbolRecord::new(
///     "kernel32.dll",
///     "CreateFile2",
///     "DllExport",
///     OsVersion::from_build(Build::WIN8_RTM),
/// )]);
///
/// let report = Checker::new(&loader, &store)
///     .max_allowed("Win7".parse::<VersionThreshold>().unwrap())
///     .check("/app/app.exe")
///     .unwrap();
/// assert_eq!(report.unexpected.len(), 1);
/// ```
pub struct Checker<'a> {
    loader: &'a dyn ModuleLoader,
    store: &'a dyn SymbolLookup,
    options: CheckOptions,
    no_recurse: Option<Vec<String>>,
}

impl<'a> Checker<'a> {
    /// Create a checker with no limits and the default recursion filter.
    pub fn new(loader: &'a dyn ModuleLoader, store: &'a dyn SymbolLookup) -> Self {
        Self {
            loader,
            store,
            options: CheckOptions::default(),
            no_recurse: None,
        }
    }

    pub fn options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_allowed(mut self, threshold: VersionThreshold) -> Self {
        self.options.max_allowed = Some(threshold);
        self
    }

    pub fn disallow(mut self, module: impl Into<String>) -> Self {
        self.options.disallowed_modules.push(module.into());
        self
    }

    /// Replace the default `system32` filter with these path fragments.
    pub fn no_recurse_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.no_recurse = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Check one root module.
    pub fn check(&self, root: impl AsRef<Path>) -> Result<CheckReport> {
        match &self.no_recurse {
            Some(patterns) => run_check(
                self.loader,
                self.store,
                root,
                recurse_unless_matches(patterns.clone()),
                &self.options,
            ),
            None => run_check(
                self.loader,
                self.store,
                root,
                default_should_recurse,
                &self.options,
            ),
        }
    }
}
