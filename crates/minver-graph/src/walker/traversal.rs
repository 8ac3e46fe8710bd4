//! Depth-first traversal logic for graph walking.
//!
//! Each resolved path is expanded at most once. The current chain of
//! modules from the root is kept on a stack and recorded on every symbol
//! a module consumes, so repeated chains collapse in the graph.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::WalkError;
use crate::graph::{ModuleGraph, UsagePath};
use crate::loader::{ModuleLoader, ResolveResult};
use crate::module_key::ModuleKey;

/// DFS traversal state.
pub(super) struct Traversal<'a> {
    loader: &'a dyn ModuleLoader,
    should_recurse: &'a (dyn Fn(&Path) -> bool + Send + Sync),
    stack: Vec<PathBuf>,
}

impl<'a> Traversal<'a> {
    pub(super) fn new(
        loader: &'a dyn ModuleLoader,
        should_recurse: &'a (dyn Fn(&Path) -> bool + Send + Sync),
    ) -> Self {
        Self {
            loader,
            should_recurse,
            stack: Vec::new(),
        }
    }

    pub(super) fn run(mut self, root: &Path) -> Result<ModuleGraph, WalkError> {
        let key = ModuleKey::found(root);
        let mut graph = ModuleGraph::new(key.clone());

        debug!(root = %root.display(), "walking import graph");

        if !(self.should_recurse)(root) {
            debug!(root = %root.display(), "not recursing into root");
            return Ok(graph);
        }

        self.stack.push(root.to_path_buf());
        let result = self.expand(&mut graph, &key, root, true);
        self.stack.pop();
        result?;

        debug!(
            root = %root.display(),
            modules = graph.len(),
            unresolved = graph.unresolved().count(),
            "import graph complete"
        );

        Ok(graph)
    }

    /// Visit a resolved module, expanding it on first sight.
    fn visit(&mut self, graph: &mut ModuleGraph, path: &Path) -> Result<ModuleKey, WalkError> {
        let key = ModuleKey::found(path);

        if !graph.insert_if_absent(&key) {
            trace!(module = %path.display(), "already visited");
            return Ok(key);
        }

        if !(self.should_recurse)(path) {
            debug!(module = %path.display(), "not recursing into module");
            return Ok(key);
        }

        self.stack.push(path.to_path_buf());
        let result = self.expand(graph, &key, path, false);
        self.stack.pop();
        result.map(|()| key)
    }

    /// Read the import table of `path` and attach every imported module.
    fn expand(
        &mut self,
        graph: &mut ModuleGraph,
        key: &ModuleKey,
        path: &Path,
        is_root: bool,
    ) -> Result<(), WalkError> {
        let table = match self.loader.load(path) {
            Ok(table) => table,
            Err(source) if is_root => {
                return Err(WalkError::RootNotLoadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                warn!(module = %path.display(), error = %err, "module could not be loaded, treating as leaf");
                return Ok(());
            }
        };

        graph.mark_expanded(key);
        let usage = UsagePath::new(self.stack.clone());

        for import in table.imports {
            let child = match self.loader.resolve(path, &import.module) {
                ResolveResult::Found { strategy, path: resolved } => {
                    trace!(
                        requested = %import.module,
                        resolved = %resolved.display(),
                        ?strategy,
                        "resolved import"
                    );
                    self.visit(graph, &resolved)?
                }
                ResolveResult::NotFound => {
                    debug!(
                        requested = %import.module,
                        importer = %path.display(),
                        "import could not be resolved"
                    );
                    let unresolved = ModuleKey::unresolved(import.module);
                    graph.insert_if_absent(&unresolved);
                    unresolved
                }
            };

            graph.add_dependency(key, &child, import.symbols, &usage);
        }

        Ok(())
    }
}
