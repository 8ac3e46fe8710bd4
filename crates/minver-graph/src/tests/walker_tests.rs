//! Tests for the depth-first graph walker.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{
    GraphWalker, ImportManifest, ImportTable, ImportedSymbol, LoaderResult, ManifestLoader,
    ManifestModule, ModuleKey, ModuleLoader, ResolveResult, UsagePath, WalkError, walk,
};

/// Records every path passed to `load`.
#[derive(Debug)]
struct CountingLoader {
    inner: ManifestLoader,
    loads: Mutex<Vec<PathBuf>>,
}

impl CountingLoader {
    fn new(inner: ManifestLoader) -> Self {
        Self {
            inner,
            loads: Mutex::new(Vec::new()),
        }
    }

    fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().unwrap().clone()
    }
}

impl ModuleLoader for CountingLoader {
    fn load(&self, path: &Path) -> LoaderResult<ImportTable> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        self.inner.load(path)
    }

    fn resolve(&self, referencing: &Path, requested: &str) -> ResolveResult {
        self.inner.resolve(referencing, requested)
    }
}

fn key(path: &str) -> ModuleKey {
    ModuleKey::found(path)
}

fn chain(parts: &[&str]) -> UsagePath {
    UsagePath::new(parts.iter().map(PathBuf::from).collect())
}

#[test]
fn test_walk_single_module_without_imports() {
    let loader = ManifestLoader::new(ImportManifest::new().module(ManifestModule::new("/app/app.exe")));

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.root(), &key("/app/app.exe"));
    assert!(graph.root_node().expanded);
    assert!(graph.root_node().dependencies.is_empty());
}

#[test]
fn test_walk_records_symbols_on_imported_module() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(ManifestModule::new("/app/app.exe").import("helper.dll", &["Run", "Stop"]))
            .module(ManifestModule::new("/app/helper.dll")),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();
    let helper = graph.node(&key("/app/helper.dll")).unwrap();

    assert_eq!(helper.symbol_names().collect::<Vec<_>>(), vec!["Run", "Stop"]);
    assert_eq!(
        helper.symbols["Run"].usage_paths.iter().collect::<Vec<_>>(),
        vec![&chain(&["/app/app.exe"])]
    );
}

#[test]
fn test_fan_in_module_is_expanded_once() {
    // app -> a -> common, app -> b -> common
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/app/app.exe")
                    .import("a.dll", &["A"])
                    .import("b.dll", &["B"]),
            )
            .module(ManifestModule::new("/app/a.dll").import("common.dll", &["Shared"]))
            .module(ManifestModule::new("/app/b.dll").import("common.dll", &["Shared"]))
            .module(ManifestModule::new("/app/common.dll")),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    assert_eq!(graph.len(), 4);
    let common = graph.node(&key("/app/common.dll")).unwrap();
    assert_eq!(common.symbols.len(), 1);

    let paths: Vec<_> = common.symbols["Shared"].usage_paths.iter().cloned().collect();
    assert_eq!(
        paths,
        vec![
            chain(&["/app/app.exe", "/app/a.dll"]),
            chain(&["/app/app.exe", "/app/b.dll"]),
        ]
    );

    let mut dependents: Vec<_> = graph
        .dependents(&key("/app/common.dll"))
        .into_iter()
        .cloned()
        .collect();
    dependents.sort();
    assert_eq!(dependents, vec![key("/app/a.dll"), key("/app/b.dll")]);
}

#[test]
fn test_each_module_is_loaded_once() {
    // app -> {a, b}, a -> {c, app}, b -> c, c -> a
    let loader = CountingLoader::new(ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/app/app.exe")
                    .import("a.dll", &["A"])
                    .import("b.dll", &["B"]),
            )
            .module(
                ManifestModule::new("/app/a.dll")
                    .import("c.dll", &["C"])
                    .import("app.exe", &["Callback"]),
            )
            .module(ManifestModule::new("/app/b.dll").import("c.dll", &["C"]))
            .module(ManifestModule::new("/app/c.dll").import("a.dll", &["A"])),
    ));

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(
        loader.loads(),
        vec![
            PathBuf::from("/app/app.exe"),
            PathBuf::from("/app/a.dll"),
            PathBuf::from("/app/c.dll"),
            PathBuf::from("/app/b.dll"),
        ]
    );
}

#[test]
fn test_cycle_terminates() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(ManifestModule::new("/app/a.dll").import("b.dll", &["FromB"]))
            .module(ManifestModule::new("/app/b.dll").import("a.dll", &["FromA"])),
    );

    let graph = GraphWalker::new(&loader).walk("/app/a.dll").unwrap();

    assert_eq!(graph.len(), 2);
    let a = graph.node(&key("/app/a.dll")).unwrap();
    assert!(a.dependencies.contains(&key("/app/b.dll")));
    assert_eq!(
        a.symbols["FromA"].usage_paths.iter().collect::<Vec<_>>(),
        vec![&chain(&["/app/a.dll", "/app/b.dll"])]
    );
}

#[test]
fn test_unresolved_import_is_a_leaf_keyed_by_requested_name() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/app/app.exe")
                    .import("Missing.DLL", &["Gone"])
                    .import("helper.dll", &["Run"]),
            )
            .module(ManifestModule::new("/app/helper.dll").import("Missing.DLL", &["Lost"])),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    let unresolved: Vec<_> = graph.unresolved().collect();
    assert_eq!(unresolved, vec![&ModuleKey::unresolved("Missing.DLL")]);

    let node = graph.node(&ModuleKey::unresolved("Missing.DLL")).unwrap();
    assert!(!node.expanded);
    assert!(node.symbols.contains_key("Gone"));
    assert_eq!(
        node.symbols["Lost"].usage_paths.iter().collect::<Vec<_>>(),
        vec![&chain(&["/app/app.exe", "/app/helper.dll"])]
    );

    let mut dependents: Vec<_> = graph
        .dependents(&ModuleKey::unresolved("Missing.DLL"))
        .into_iter()
        .cloned()
        .collect();
    dependents.sort();
    assert_eq!(dependents, vec![key("/app/app.exe"), key("/app/helper.dll")]);
}

#[test]
fn test_unloadable_root_is_fatal() {
    let loader = ManifestLoader::new(ImportManifest::new());

    let err = GraphWalker::new(&loader).walk("/app/nothing.exe").unwrap_err();

    match err {
        WalkError::RootNotLoadable { path, .. } => assert_eq!(path, Path::new("/app/nothing.exe")),
    }
}

#[test]
fn test_invalid_root_is_fatal() {
    let loader = ManifestLoader::new(
        ImportManifest::new().module(ManifestModule::new("/app/app.exe").invalid()),
    );

    assert!(GraphWalker::new(&loader).walk("/app/app.exe").is_err());
}

#[test]
fn test_invalid_dependency_stays_a_leaf() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(ManifestModule::new("/app/app.exe").import("broken.dll", &["Thing"]))
            .module(ManifestModule::new("/app/broken.dll").invalid()),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();
    let broken = graph.node(&key("/app/broken.dll")).unwrap();

    assert!(!broken.expanded);
    assert!(broken.symbols.contains_key("Thing"));
}

#[test]
fn test_should_recurse_keeps_filtered_module_as_leaf() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .search_path("/windows/system32")
            .module(ManifestModule::new("/app/app.exe").import("kernel32.dll", &["CreateFileW"]))
            .module(
                ManifestModule::new("/windows/system32/kernel32.dll")
                    .import("ntdll.dll", &["NtCreateFile"]),
            )
            .module(ManifestModule::new("/windows/system32/ntdll.dll")),
    );

    let graph = walk(&loader, "/app/app.exe", |path: &Path| {
        !path.to_string_lossy().to_lowercase().contains("system32")
    })
    .unwrap();

    assert_eq!(graph.len(), 2);
    let kernel32 = graph.node(&key("/windows/system32/kernel32.dll")).unwrap();
    assert!(!kernel32.expanded);
    assert!(kernel32.symbols.contains_key("CreateFileW"));
    assert!(!graph.contains(&key("/windows/system32/ntdll.dll")));
}

#[test]
fn test_filtered_root_is_not_expanded() {
    let loader = CountingLoader::new(ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/windows/system32/tool.exe")
                    .import("helper.dll", &["Run"]),
            )
            .module(ManifestModule::new("/windows/system32/helper.dll")),
    ));

    let graph = walk(&loader, "/windows/system32/tool.exe", |path: &Path| {
        !path.to_string_lossy().contains("system32")
    })
    .unwrap();

    assert_eq!(graph.len(), 1);
    assert!(!graph.root_node().expanded);
    assert!(loader.loads().is_empty());
}

#[test]
fn test_usage_path_is_popped_between_siblings() {
    // app -> a -> deep, then app -> b: b's imports must not carry a's chain
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/app/app.exe")
                    .import("a.dll", &["A"])
                    .import("b.dll", &["B"]),
            )
            .module(ManifestModule::new("/app/a.dll").import("deep.dll", &["Deep"]))
            .module(ManifestModule::new("/app/deep.dll"))
            .module(ManifestModule::new("/app/b.dll").import("leaf.dll", &["Leaf"]))
            .module(ManifestModule::new("/app/leaf.dll")),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    let leaf = graph.node(&key("/app/leaf.dll")).unwrap();
    assert_eq!(
        leaf.symbols["Leaf"].usage_paths.iter().collect::<Vec<_>>(),
        vec![&chain(&["/app/app.exe", "/app/b.dll"])]
    );
}

#[test]
fn test_ordinal_imports_are_recorded() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(ManifestModule::new("/app/app.exe").import_ordinals("ws2_32.dll", &[23]))
            .module(ManifestModule::new("/app/ws2_32.dll")),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();
    let ws2 = graph.node(&key("/app/ws2_32.dll")).unwrap();

    assert_eq!(ws2.symbols["Ordinal_23"].symbol, ImportedSymbol::Ordinal(23));
}

#[test]
fn test_reachable_covers_every_node() {
    let loader = ManifestLoader::new(
        ImportManifest::new()
            .module(
                ManifestModule::new("/app/app.exe")
                    .import("a.dll", &["A"])
                    .import("missing.dll", &["M"]),
            )
            .module(ManifestModule::new("/app/a.dll").import("app.exe", &["Callback"])),
    );

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    assert_eq!(graph.reachable().len(), graph.len());
}
