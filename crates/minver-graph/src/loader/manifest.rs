//! Loader backed by a captured import manifest.
//!
//! Binary parsing happens elsewhere; this loader consumes import tables that
//! were captured into a JSON or TOML manifest and applies loader search
//! order over the set of modules the manifest knows about:
//!
//! 1. the requested name is itself a known path
//! 2. the application directory of the referencing module
//! 3. each configured search directory, in order
//!
//! File-name matching is case-insensitive, as on the platform loader.
//!
//! ```toml
//! search_paths = ["C:/Windows/System32"]
//!
//! [[modules]]
//! path = "C:/app/app.exe"
//!
//! [[modules.imports]]
//! module = "KERNEL32.dll"
//! symbols = ["CreateFile2", "CreateFileW"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{
    ImportTable, ImportedSymbol, LoaderError, LoaderResult, ModuleImports, ModuleLoader,
    ResolveResult, SearchStrategy,
};

/// Captured import tables for a set of modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportManifest {
    /// Directories searched after the application directory
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Known modules and their import tables
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
}

/// One module entry of an import manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModule {
    pub path: PathBuf,

    #[serde(default)]
    pub imports: Vec<ManifestImport>,

    /// File exists but could not be parsed as a module
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invalid: bool,
}

/// Symbols imported from one requested module name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestImport {
    pub module: String,

    #[serde(default)]
    pub symbols: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordinals: Vec<u16>,
}

impl ImportManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn module(mut self, module: ManifestModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Parse a manifest from a JSON or TOML file, chosen by extension.
    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoaderError::FileNotFound(path.to_path_buf()),
            _ => LoaderError::Io(e.to_string()),
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml(&content).map_err(|reason| LoaderError::NotAModule {
                path: path.to_path_buf(),
                reason,
            })
        } else {
            Self::from_json(&content).map_err(|reason| LoaderError::NotAModule {
                path: path.to_path_buf(),
                reason,
            })
        }
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("invalid manifest JSON: {}", e))
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("invalid manifest TOML: {}", e))
    }
}

impl ManifestModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Mark the module as present on disk but not loadable.
    pub fn invalid(mut self) -> Self {
        self.invalid = true;
        self
    }

    /// Add named imports from `module`.
    pub fn import<S: AsRef<str>>(mut self, module: impl Into<String>, symbols: &[S]) -> Self {
        self.imports.push(ManifestImport {
            module: module.into(),
            symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
            ordinals: Vec::new(),
        });
        self
    }

    /// Add ordinal-only imports from `module`.
    pub fn import_ordinals(mut self, module: impl Into<String>, ordinals: &[u16]) -> Self {
        self.imports.push(ManifestImport {
            module: module.into(),
            symbols: Vec::new(),
            ordinals: ordinals.to_vec(),
        });
        self
    }

    fn import_table(&self) -> ImportTable {
        let imports = self
            .imports
            .iter()
            .map(|import| {
                let symbols = import
                    .symbols
                    .iter()
                    .cloned()
                    .map(ImportedSymbol::Name)
                    .chain(import.ordinals.iter().copied().map(ImportedSymbol::Ordinal))
                    .collect();
                ModuleImports::new(import.module.clone(), symbols)
            })
            .collect();

        ImportTable::new(imports)
    }
}

/// `ModuleLoader` over an in-memory import manifest.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    search_paths: Vec<PathBuf>,
    modules: FxHashMap<String, ManifestModule>,
}

impl ManifestLoader {
    pub fn new(manifest: ImportManifest) -> Self {
        let modules = manifest
            .modules
            .into_iter()
            .map(|module| (lookup_key(&module.path), module))
            .collect();

        Self {
            search_paths: manifest.search_paths,
            modules,
        }
    }

    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        ImportManifest::from_file(path).map(Self::new)
    }

    /// Number of modules the manifest describes.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn find(&self, candidate: &Path) -> Option<&ManifestModule> {
        self.modules.get(&lookup_key(candidate))
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&self, path: &Path) -> LoaderResult<ImportTable> {
        let module = self
            .find(path)
            .ok_or_else(|| LoaderError::FileNotFound(path.to_path_buf()))?;

        if module.invalid {
            return Err(LoaderError::NotAModule {
                path: path.to_path_buf(),
                reason: "not a valid module image".to_string(),
            });
        }

        Ok(module.import_table())
    }

    fn resolve(&self, referencing: &Path, requested: &str) -> ResolveResult {
        let requested_path = Path::new(requested);

        if requested_path.is_absolute() || requested_path.components().count() > 1 {
            return match self.find(requested_path) {
                Some(module) => ResolveResult::Found {
                    strategy: SearchStrategy::FullPath,
                    path: module.path.clone(),
                },
                None => ResolveResult::NotFound,
            };
        }

        if let Some(app_dir) = referencing.parent() {
            if let Some(module) = self.find(&app_dir.join(requested)) {
                return ResolveResult::Found {
                    strategy: SearchStrategy::ApplicationDirectory,
                    path: module.path.clone(),
                };
            }
        }

        for dir in &self.search_paths {
            if let Some(module) = self.find(&dir.join(requested)) {
                return ResolveResult::Found {
                    strategy: SearchStrategy::SearchPath,
                    path: module.path.clone(),
                };
            }
        }

        ResolveResult::NotFound
    }
}

fn lookup_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}
