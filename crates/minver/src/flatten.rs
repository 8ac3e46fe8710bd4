//! Flattening of an import graph into distinct `(module, symbol)` uses.

use minver_graph::{ModuleGraph, ModuleKey, UsagePath};
use serde::Serialize;

/// One symbol consumed from one located module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolUse {
    pub module: ModuleKey,
    pub symbol: String,
    /// Chains of modules (root first) that import the symbol
    pub usage_paths: Vec<UsagePath>,
}

/// Distinct symbol uses of a graph plus the modules that could not be located.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenedGraph {
    pub symbols: Vec<SymbolUse>,
    pub unresolved_modules: Vec<String>,
}

impl FlattenedGraph {
    /// Flatten the nodes reachable from the root, in depth-first order.
    ///
    /// Symbols of unresolved modules are not collected: without a location
    /// there is no module to look them up against.
    pub fn from_graph(graph: &ModuleGraph) -> Self {
        let mut flattened = Self::default();

        for node in graph.reachable() {
            match &node.key {
                ModuleKey::Unresolved(name) => flattened.unresolved_modules.push(name.clone()),
                ModuleKey::Found(_) => {
                    flattened
                        .symbols
                        .extend(node.symbols.iter().map(|(name, usage)| SymbolUse {
                            module: node.key.clone(),
                            symbol: name.clone(),
                            usage_paths: usage.usage_paths.iter().cloned().collect(),
                        }));
                }
            }
        }

        flattened
    }

    /// Usage paths of `symbol` imported from `module`.
    pub fn usage_paths(&self, module: &ModuleKey, symbol: &str) -> Option<&[UsagePath]> {
        self.symbols
            .iter()
            .find(|entry| &entry.module == module && entry.symbol == symbol)
            .map(|entry| entry.usage_paths.as_slice())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
