//! Reduction of resolved symbols to a compatibility verdict.

use std::path::PathBuf;

use minver_store::{StoreResult, SymbolLookup, normalize_module_name};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::flatten::FlattenedGraph;
use crate::report::{CheckReport, CheckStatus, ResolvedSymbol};
use crate::threshold::VersionThreshold;

/// Limits a check enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Symbols newer than this are unexpected
    pub max_allowed: Option<VersionThreshold>,
    /// Modules no symbol may be imported from (`d3d12.dll`, `d3d12`)
    pub disallowed_modules: Vec<String>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_allowed(mut self, threshold: VersionThreshold) -> Self {
        self.max_allowed = Some(threshold);
        self
    }

    pub fn disallow(mut self, module: impl Into<String>) -> Self {
        self.disallowed_modules.push(module.into());
        self
    }
}

/// Look up every flattened symbol and reduce the matches to a report.
///
/// Lookup misses are dropped. The required version is the highest matched
/// `(version, build)`; every match equal to it is listed in `at_required`.
pub fn evaluate(
    root: impl Into<PathBuf>,
    flattened: &FlattenedGraph,
    store: &dyn SymbolLookup,
    options: &CheckOptions,
) -> StoreResult<CheckReport> {
    let root = root.into();
    let mut all_matched = Vec::new();

    for entry in &flattened.symbols {
        let module_name = entry.module.file_name().into_owned();
        let Some(record) = store.lookup(&module_name, &entry.symbol)? else {
            debug!(module = %module_name, symbol = %entry.symbol, "no version data");
            continue;
        };

        all_matched.push(ResolvedSymbol {
            module: entry.module.clone(),
            module_name,
            symbol: entry.symbol.clone(),
            api_type: record.api_type.clone(),
            version: record.os_version(),
            usage_paths: entry.usage_paths.clone(),
        });
    }

    let required = all_matched
        .iter()
        .map(|symbol| symbol.version)
        .max()
        .unwrap_or_default();

    let at_required: Vec<_> = all_matched
        .iter()
        .filter(|symbol| symbol.version == required)
        .cloned()
        .collect();

    let unexpected: Vec<_> = match options.max_allowed {
        Some(threshold) => all_matched
            .iter()
            .filter(|symbol| threshold.is_exceeded_by(symbol.version))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let disallowed_set: FxHashSet<String> = options
        .disallowed_modules
        .iter()
        .map(String::as_str)
        .map(normalize_module_name)
        .collect();
    let disallowed: Vec<_> = all_matched
        .iter()
        .filter(|symbol| disallowed_set.contains(&normalize_module_name(&symbol.module_name)))
        .cloned()
        .collect();

    let status = if all_matched.is_empty() {
        CheckStatus::NoSymbols
    } else if !unexpected.is_empty() || !disallowed.is_empty() {
        CheckStatus::Fail
    } else {
        CheckStatus::Ok
    };

    info!(
        root = %root.display(),
        checked = flattened.len(),
        matched = all_matched.len(),
        required = %required,
        status = status.as_str(),
        "evaluated imports"
    );

    Ok(CheckReport {
        root,
        status,
        required,
        symbols_checked: flattened.len(),
        all_matched,
        at_required,
        max_allowed: options.max_allowed,
        unexpected,
        disallowed,
        unresolved_modules: flattened.unresolved_modules.clone(),
    })
}
