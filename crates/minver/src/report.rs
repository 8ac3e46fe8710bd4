//! Check results.

use std::path::PathBuf;

use minver_graph::{ModuleKey, UsagePath};
use minver_store::OsVersion;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::threshold::VersionThreshold;

/// Exit code when no imported symbol matched the store.
pub const EXIT_NO_SYMBOLS: u8 = 255;

/// Largest exit code used to count violations.
pub const MAX_VIOLATION_EXIT: u8 = 254;

/// Imported symbol with its documented minimum version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSymbol {
    pub module: ModuleKey,
    /// File name of the module (`KERNEL32.dll`)
    pub module_name: String,
    pub symbol: String,
    pub api_type: String,
    pub version: OsVersion,
    pub usage_paths: Vec<UsagePath>,
}

/// Overall verdict of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Symbols matched and none violated the configured limits
    Ok,
    /// At least one symbol exceeded the threshold or came from a disallowed module
    Fail,
    /// No imported symbol matched the store
    NoSymbols,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fail => "fail",
            Self::NoSymbols => "no_symbols",
        }
    }
}

/// Result of checking one root module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub root: PathBuf,
    pub status: CheckStatus,
    /// Highest `(version, build)` over all matched symbols
    pub required: OsVersion,
    /// Number of distinct `(module, symbol)` pairs looked up
    pub symbols_checked: usize,
    pub all_matched: Vec<ResolvedSymbol>,
    pub at_required: Vec<ResolvedSymbol>,
    pub max_allowed: Option<VersionThreshold>,
    pub unexpected: Vec<ResolvedSymbol>,
    pub disallowed: Vec<ResolvedSymbol>,
    pub unresolved_modules: Vec<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    /// Distinct symbols that are unexpected, disallowed or both.
    pub fn violation_count(&self) -> usize {
        self.unexpected
            .iter()
            .chain(&self.disallowed)
            .map(|symbol| (&symbol.module, symbol.symbol.as_str()))
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Process exit code: `0` when ok, the violation count (at most 254)
    /// when failing, `255` when no symbols matched.
    pub fn exit_code(&self) -> u8 {
        match self.status {
            CheckStatus::Ok => 0,
            CheckStatus::Fail => clamp_violations(self.violation_count()),
            CheckStatus::NoSymbols => EXIT_NO_SYMBOLS,
        }
    }
}

/// Combined exit code for several roots.
///
/// Violations are summed across roots. Without violations, any root with no
/// matched symbols yields `255`.
pub fn combined_exit_code<'a>(reports: impl IntoIterator<Item = &'a CheckReport>) -> u8 {
    let mut violations = 0usize;
    let mut no_symbols = false;

    for report in reports {
        match report.status {
            CheckStatus::Fail => violations += report.violation_count(),
            CheckStatus::NoSymbols => no_symbols = true,
            CheckStatus::Ok => {}
        }
    }

    if violations > 0 {
        clamp_violations(violations)
    } else if no_symbols {
        EXIT_NO_SYMBOLS
    } else {
        0
    }
}

fn clamp_violations(count: usize) -> u8 {
    count.clamp(1, MAX_VIOLATION_EXIT as usize) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use minver_store::Build;

    fn symbol(name: &str) -> ResolvedSymbol {
        ResolvedSymbol {
            module: ModuleKey::found("/app/kernel32.dll"),
            module_name: "kernel32.dll".into(),
            symbol: name.into(),
            api_type: "DllExport".into(),
            version: OsVersion::from_build(Build::WIN8_RTM),
            usage_paths: Vec::new(),
        }
    }

    fn report(status: CheckStatus, unexpected: Vec<ResolvedSymbol>) -> CheckReport {
        CheckReport {
            root: PathBuf::from("/app/app.exe"),
            status,
            required: OsVersion::from_build(Build::WIN8_RTM),
            symbols_checked: unexpected.len(),
            all_matched: unexpected.clone(),
            at_required: unexpected.clone(),
            max_allowed: None,
            unexpected,
            disallowed: Vec::new(),
            unresolved_modules: Vec::new(),
        }
    }

    #[test]
    fn violation_exit_code_is_clamped() {
        let many = (0..300).map(|i| symbol(&format!("Fn{i}"))).collect();
        let report = report(CheckStatus::Fail, many);

        assert_eq!(report.violation_count(), 300);
        assert_eq!(report.exit_code(), MAX_VIOLATION_EXIT);
    }

    #[test]
    fn violations_outrank_missing_symbols_when_combined() {
        let failing = report(CheckStatus::Fail, vec![symbol("CreateFile2")]);
        let empty = report(CheckStatus::NoSymbols, Vec::new());
        let ok = report(CheckStatus::Ok, Vec::new());

        assert_eq!(combined_exit_code([&empty, &failing]), 1);
        assert_eq!(combined_exit_code([&ok, &empty]), EXIT_NO_SYMBOLS);
        assert_eq!(combined_exit_code([&ok, &ok]), 0);
    }
}
