//! Graph walker for module import traversal.
//!
//! Performs a depth-first walk of the import relation starting at one root
//! module, asking a `ModuleLoader` for import tables and search-order
//! resolution, and builds a `ModuleGraph` arena.

mod traversal;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::graph::ModuleGraph;
use crate::loader::{LoaderError, ModuleLoader};

/// Error that can occur during graph walking.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("Root module '{}' could not be loaded: {source}", .path.display())]
    RootNotLoadable {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },
}

/// Predicate deciding whether a module's own imports are walked.
pub type RecursePredicate<'a> = Box<dyn Fn(&Path) -> bool + Send + Sync + 'a>;

/// Graph walker that traverses the import graph of one root module.
///
/// # Example
///
/// ```rust
/// use minver_graph::{GraphWalker, ImportManifest, ManifestLoader, ManifestModule};
///
/// let loader = ManifestLoader::new(
///     ImportManifest::new()
///         .module(ManifestModule::new("/app/app.exe").import("helper.dll", &["Run"]))
///         .module(ManifestModule::new("/app/helper.dll")),
/// );
///
/// let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();
/// assert_eq!(graph.len(), 2);
/// ```
pub struct GraphWalker<'a> {
    loader: &'a dyn ModuleLoader,
    should_recurse: RecursePredicate<'a>,
}

impl<'a> GraphWalker<'a> {
    /// Create a walker that expands every module it reaches.
    pub fn new(loader: &'a dyn ModuleLoader) -> Self {
        Self {
            loader,
            should_recurse: Box::new(|_| true),
        }
    }

    /// Only expand modules for which `predicate` holds.
    ///
    /// Modules that fail the predicate stay in the graph as leaves, so the
    /// symbols consumed from them are still recorded.
    pub fn should_recurse(mut self, predicate: impl Fn(&Path) -> bool + Send + Sync + 'a) -> Self {
        self.should_recurse = Box::new(predicate);
        self
    }

    /// Walk the import graph rooted at `root`.
    ///
    /// Fails only when the root module itself cannot be loaded.
    pub fn walk(&self, root: impl AsRef<Path>) -> Result<ModuleGraph, WalkError> {
        traversal::Traversal::new(self.loader, self.should_recurse.as_ref()).run(root.as_ref())
    }
}

impl fmt::Debug for GraphWalker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphWalker")
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

/// Walk the import graph of `root` with a custom recursion filter.
pub fn walk(
    loader: &dyn ModuleLoader,
    root: impl AsRef<Path>,
    should_recurse: impl Fn(&Path) -> bool + Send + Sync,
) -> Result<ModuleGraph, WalkError> {
    GraphWalker::new(loader)
        .should_recurse(should_recurse)
        .walk(root)
}
