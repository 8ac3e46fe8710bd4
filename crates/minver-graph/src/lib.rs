//! # minver-graph
//!
//! Module import graph data structures and the depth-first walker that
//! builds them.
//!
//! ## Overview
//!
//! A walk starts at one root module and follows the import relation through
//! a [`ModuleLoader`]. The loader reads import tables and applies the
//! platform's search order; this crate never parses binaries itself.
//!
//! The result is a [`ModuleGraph`] arena:
//!
//! - one node per resolved path, however many chains reach it
//! - one node per unresolved requested name
//! - each node records the symbols other modules consume from it, with the
//!   chain of modules (root first) that led to each use
//!
//! ```text
//!   app.exe ──imports──▶ helper.dll ──imports──▶ kernel32.dll
//!      │                                              ▲
//!      └──────────────────imports─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use minver_graph::{GraphWalker, ImportManifest, ManifestLoader, ManifestModule, ModuleKey};
//!
//! let loader = ManifestLoader::new(
//!     ImportManifest::new()
//!         .search_path("/windows/system32")
//!         .module(ManifestModule::new("/app/app.exe").import("KERNEL32.dll", &["CreateFile2"]))
//!         .module(ManifestModule::new("/windows/system32/kernel32.dll")),
//! );
//!
//! let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();
//! let kernel32 = graph
//!     .node(&ModuleKey::found("/windows/system32/kernel32.dll"))
//!     .unwrap();
//! assert!(kernel32.symbols.contains_key("CreateFile2"));
//! ```

pub mod graph;
pub mod loader;
pub mod module_key;
pub mod walker;

pub use graph::{ModuleGraph, ModuleNode, SymbolUsage, UsagePath};
pub use loader::{
    ImportManifest, ImportTable, ImportedSymbol, LoaderError, LoaderResult, ManifestImport,
    ManifestLoader, ManifestModule, ModuleImports, ModuleLoader, ResolveResult, SearchStrategy,
};
pub use module_key::ModuleKey;
pub use walker::{GraphWalker, RecursePredicate, WalkError, walk};

#[cfg(test)]
mod tests;
