use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identifier for a module node in the import graph.
///
/// A module the loader located on disk is identified by its resolved path.
/// A module the loader could not locate keeps the bare name the importer
/// requested, so two importers asking for the same missing name share a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ModuleKey {
    /// Module resolved to a concrete path.
    Found(PathBuf),
    /// Module that could not be resolved, keyed by the requested name.
    Unresolved(String),
}

impl ModuleKey {
    pub fn found(path: impl Into<PathBuf>) -> Self {
        Self::Found(path.into())
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::Unresolved(name.into())
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Resolved path, if the module was found.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::Unresolved(_) => None,
        }
    }

    /// File name component of the module (`kernel32.dll` for `C:/Windows/System32/kernel32.dll`).
    ///
    /// Unresolved modules return their requested name unchanged.
    pub fn file_name(&self) -> Cow<'_, str> {
        match self {
            Self::Found(path) => match path.file_name() {
                Some(name) => name.to_string_lossy(),
                None => path.to_string_lossy(),
            },
            Self::Unresolved(name) => Cow::Borrowed(name.as_str()),
        }
    }

    /// Full identifier as a string for logging and rendering.
    pub fn id_string(&self) -> Cow<'_, str> {
        match self {
            Self::Found(path) => path.to_string_lossy(),
            Self::Unresolved(name) => Cow::Borrowed(name.as_str()),
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(path) => write!(f, "{}", path.display()),
            Self::Unresolved(name) => write!(f, "{} (unresolved)", name),
        }
    }
}
