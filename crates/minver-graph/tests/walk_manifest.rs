//! Integration tests walking manifests read from disk.

use std::fs;
use std::path::Path;

use minver_graph::{GraphWalker, LoaderError, ManifestLoader, ModuleKey, WalkError};
use tempfile::TempDir;

const MANIFEST: &str = r#"
search_paths = ["C:/Windows/System32"]

[[modules]]
path = "C:/App/app.exe"

[[modules.imports]]
module = "helper.dll"
symbols = ["DoWork"]

[[modules.imports]]
module = "KERNEL32.dll"
symbols = ["CreateFile2", "CreateFileW"]

[[modules.imports]]
module = "vendor.dll"
symbols = ["VendorInit"]

[[modules]]
path = "C:/App/helper.dll"

[[modules.imports]]
module = "kernel32.dll"
symbols = ["CreateFileW"]

[[modules.imports]]
module = "app.exe"
symbols = ["Callback"]

[[modules]]
path = "C:/Windows/System32/kernel32.dll"

[[modules.imports]]
module = "ntdll.dll"
symbols = ["NtCreateFile"]

[[modules]]
path = "C:/Windows/System32/ntdll.dll"
"#;

fn write_manifest(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn walks_toml_manifest_from_disk() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "imports.toml", MANIFEST);
    let loader = ManifestLoader::from_file(&manifest).unwrap();

    let graph = GraphWalker::new(&loader)
        .should_recurse(|path: &Path| !path.to_string_lossy().to_lowercase().contains("system32"))
        .walk("C:/App/app.exe")
        .unwrap();

    // app, helper, kernel32, vendor (unresolved); ntdll is behind a non-recursed module
    assert_eq!(graph.len(), 4);
    assert!(!graph.contains(&ModuleKey::found("C:/Windows/System32/ntdll.dll")));

    let kernel32 = graph
        .node(&ModuleKey::found("C:/Windows/System32/kernel32.dll"))
        .unwrap();
    // helper.dll is expanded before app.exe's own kernel32 import is attached
    let names: Vec<_> = kernel32.symbol_names().collect();
    assert_eq!(names, vec!["CreateFileW", "CreateFile2"]);

    let mut create_file_w: Vec<_> = kernel32.symbols["CreateFileW"]
        .usage_paths
        .iter()
        .map(|path| path.format_chain())
        .collect();
    create_file_w.sort();
    assert_eq!(create_file_w, vec!["app.exe", "app.exe -> helper.dll"]);

    let unresolved: Vec<_> = graph.unresolved().collect();
    assert_eq!(unresolved, vec![&ModuleKey::unresolved("vendor.dll")]);
}

#[test]
fn walks_json_manifest_from_disk() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "imports.json",
        r#"{
            "modules": [
                { "path": "/app/app.exe", "imports": [ { "module": "a.dll", "symbols": ["A"] } ] },
                { "path": "/app/a.dll" }
            ]
        }"#,
    );
    let loader = ManifestLoader::from_file(&manifest).unwrap();

    let graph = GraphWalker::new(&loader).walk("/app/app.exe").unwrap();

    assert_eq!(graph.len(), 2);
}

#[test]
fn missing_manifest_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = ManifestLoader::from_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, LoaderError::FileNotFound(_)));
}

#[test]
fn root_missing_from_manifest_fails_walk() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "imports.toml", MANIFEST);
    let loader = ManifestLoader::from_file(&manifest).unwrap();

    let err = GraphWalker::new(&loader).walk("C:/App/other.exe").unwrap_err();
    assert!(matches!(
        err,
        WalkError::RootNotLoadable {
            source: LoaderError::FileNotFound(_),
            ..
        }
    ));
    assert!(err.to_string().contains("other.exe"));
}
