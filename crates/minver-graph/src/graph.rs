//! Arena-backed module import graph.
//!
//! Nodes live in a single map keyed by `ModuleKey`; edges are stored as key
//! references. A module reached through several import chains is one node
//! with several incoming edges, and import cycles need no special ownership.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::loader::ImportedSymbol;
use crate::module_key::ModuleKey;

/// Chain of modules from the walk root to the module that performs an import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsagePath(Vec<PathBuf>);

impl UsagePath {
    pub fn new(modules: Vec<PathBuf>) -> Self {
        Self(modules)
    }

    pub fn modules(&self) -> &[PathBuf] {
        &self.0
    }

    /// The root module (first element).
    pub fn root(&self) -> Option<&Path> {
        self.0.first().map(PathBuf::as_path)
    }

    /// The module that directly performs the import (last element).
    pub fn importer(&self) -> Option<&Path> {
        self.0.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Format the chain as a human-readable string.
    ///
    /// Example: "app.exe -> helper.dll"
    pub fn format_chain(&self) -> String {
        self.0
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned())
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// One imported symbol of a module, with every chain that led to its use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolUsage {
    pub symbol: ImportedSymbol,
    pub usage_paths: IndexSet<UsagePath>,
}

impl SymbolUsage {
    fn new(symbol: ImportedSymbol) -> Self {
        Self {
            symbol,
            usage_paths: IndexSet::new(),
        }
    }
}

/// A module in the import graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub key: ModuleKey,
    /// Modules this module imports from, in discovery order
    pub dependencies: IndexSet<ModuleKey>,
    /// Symbols other modules consume from this module, keyed by symbol name
    pub symbols: IndexMap<String, SymbolUsage>,
    /// Whether this module's own import table was read
    pub expanded: bool,
}

impl ModuleNode {
    pub fn new(key: ModuleKey) -> Self {
        Self {
            key,
            dependencies: IndexSet::new(),
            symbols: IndexMap::new(),
            expanded: false,
        }
    }

    /// Record that `symbol` is consumed from this module along `path`.
    ///
    /// Repeated paths for the same symbol collapse.
    pub fn add_used_symbol(&mut self, symbol: ImportedSymbol, path: &UsagePath) {
        let usage = self
            .symbols
            .entry(symbol.key())
            .or_insert_with(|| SymbolUsage::new(symbol));
        usage.usage_paths.insert(path.clone());
    }

    /// Symbol names consumed from this module.
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Every distinct usage path across all symbols of this module.
    pub fn usage_paths(&self) -> IndexSet<&UsagePath> {
        self.symbols
            .values()
            .flat_map(|usage| usage.usage_paths.iter())
            .collect()
    }
}

/// Import graph produced by one walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGraph {
    root: ModuleKey,
    nodes: IndexMap<ModuleKey, ModuleNode>,
}

impl ModuleGraph {
    /// Create a graph containing only its root node.
    pub fn new(root: ModuleKey) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(root.clone(), ModuleNode::new(root.clone()));
        Self { root, nodes }
    }

    pub fn root(&self) -> &ModuleKey {
        &self.root
    }

    pub fn root_node(&self) -> &ModuleNode {
        // The root is inserted at construction and nodes are never removed.
        &self.nodes[&self.root]
    }

    pub fn node(&self, key: &ModuleKey) -> Option<&ModuleNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// All nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependencies of `key`.
    pub fn dependencies(&self, key: &ModuleKey) -> impl Iterator<Item = &ModuleNode> {
        self.nodes
            .get(key)
            .into_iter()
            .flat_map(|node| node.dependencies.iter())
            .filter_map(|dep| self.nodes.get(dep))
    }

    /// Modules that import `key` directly.
    pub fn dependents(&self, key: &ModuleKey) -> Vec<&ModuleKey> {
        self.nodes
            .values()
            .filter(|node| node.dependencies.contains(key))
            .map(|node| &node.key)
            .collect()
    }

    /// Nodes the loader could not locate.
    pub fn unresolved(&self) -> impl Iterator<Item = &ModuleKey> {
        self.nodes.keys().filter(|key| key.is_unresolved())
    }

    /// Nodes reachable from the root, each exactly once, in depth-first order.
    pub fn reachable(&self) -> Vec<&ModuleNode> {
        let mut seen = IndexSet::new();
        let mut stack = vec![&self.root];

        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                continue;
            }
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.dependencies.iter().rev());
            }
        }

        seen.into_iter()
            .filter_map(|key| self.nodes.get(key))
            .collect()
    }

    pub(crate) fn insert_if_absent(&mut self, key: &ModuleKey) -> bool {
        if self.nodes.contains_key(key) {
            return false;
        }
        self.nodes.insert(key.clone(), ModuleNode::new(key.clone()));
        true
    }

    pub(crate) fn mark_expanded(&mut self, key: &ModuleKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.expanded = true;
        }
    }

    /// Add an edge `from -> to` and attach the consumed symbols to `to`.
    pub(crate) fn add_dependency(
        &mut self,
        from: &ModuleKey,
        to: &ModuleKey,
        symbols: Vec<ImportedSymbol>,
        path: &UsagePath,
    ) {
        if let Some(node) = self.nodes.get_mut(from) {
            node.dependencies.insert(to.clone());
        }

        let child = self
            .nodes
            .entry(to.clone())
            .or_insert_with(|| ModuleNode::new(to.clone()));

        for symbol in symbols {
            child.add_used_symbol(symbol, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> UsagePath {
        UsagePath::new(parts.iter().map(PathBuf::from).collect())
    }

    #[test]
    fn duplicate_usage_paths_collapse() {
        let mut node = ModuleNode::new(ModuleKey::found("/sys/kernel32.dll"));
        let usage = path(&["/app/app.exe"]);

        node.add_used_symbol(ImportedSymbol::Name("Sleep".into()), &usage);
        node.add_used_symbol(ImportedSymbol::Name("Sleep".into()), &usage);
        node.add_used_symbol(
            ImportedSymbol::Name("Sleep".into()),
            &path(&["/app/app.exe", "/app/helper.dll"]),
        );

        assert_eq!(node.symbols.len(), 1);
        assert_eq!(node.symbols["Sleep"].usage_paths.len(), 2);
        assert_eq!(node.usage_paths().len(), 2);
    }

    #[test]
    fn format_chain_uses_file_names() {
        let usage = path(&["/app/app.exe", "/app/helper.dll"]);
        assert_eq!(usage.format_chain(), "app.exe -> helper.dll");
        assert_eq!(usage.importer(), Some(Path::new("/app/helper.dll")));
    }

    #[test]
    fn reachable_visits_each_node_once() {
        let root = ModuleKey::found("/app/a.dll");
        let b = ModuleKey::found("/app/b.dll");
        let mut graph = ModuleGraph::new(root.clone());
        let usage = path(&["/app/a.dll"]);

        graph.add_dependency(&root, &b, vec![], &usage);
        graph.add_dependency(&b, &root, vec![], &usage);

        let reachable = graph.reachable();
        assert_eq!(reachable.len(), 2);
        assert_eq!(graph.dependents(&root), vec![&b]);
    }
}
