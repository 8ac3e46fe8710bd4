//! Symbol records and the lookup capability.

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::version::{Build, OsVersion, WindowsVersion};

/// Documented minimum version of one exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Normalized module name (`kernel32`)
    pub module: String,
    /// Exported symbol name, case-sensitive
    pub symbol: String,
    pub api_type: String,
    pub min_version: WindowsVersion,
    pub min_build: Build,
}

impl SymbolRecord {
    /// Create a record, normalizing the module name.
    pub fn new(
        module: &str,
        symbol: impl Into<String>,
        api_type: impl Into<String>,
        version: OsVersion,
    ) -> Self {
        Self {
            module: normalize_module_name(module),
            symbol: symbol.into(),
            api_type: api_type.into(),
            min_version: version.version,
            min_build: version.build,
        }
    }

    pub fn os_version(&self) -> OsVersion {
        OsVersion::new(self.min_version, self.min_build)
    }

    /// Records without a module or symbol name are never stored.
    pub fn is_storable(&self) -> bool {
        !self.module.is_empty() && !self.symbol.is_empty()
    }
}

/// Normalize a module reference for storage and lookup.
///
/// Keeps the file name only, lower-cases it and strips the final extension,
/// so `C:\Windows\System32\KERNEL32.DLL` and `kernel32` are the same module
/// and `winspool.drv` is `winspool`.
pub fn normalize_module_name(name: &str) -> String {
    let file_name = name
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name,
    }
}

/// Read access to symbol records keyed by `(module, symbol)`.
///
/// `module` may be a path or file name; implementations normalize it with
/// [`normalize_module_name`]. Symbols match case-sensitively.
pub trait SymbolLookup: Send + Sync {
    fn lookup(&self, module: &str, symbol: &str) -> StoreResult<Option<SymbolRecord>>;
}

impl<T: SymbolLookup + ?Sized> SymbolLookup for &T {
    fn lookup(&self, module: &str, symbol: &str) -> StoreResult<Option<SymbolRecord>> {
        (**self).lookup(module, symbol)
    }
}
