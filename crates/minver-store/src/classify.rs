//! Classification of free-text minimum-version sentences.
//!
//! API documentation states requirements in prose ("Windows 10, version
//! 1809 [desktop apps only]", "Windows Vista and Windows Server 2008").
//! [`classify`] maps such a sentence onto an [`OsVersion`]. A sentence that
//! names several releases resolves to the lowest one. Unrecognized phrasing
//! yields [`OsVersion::NONE`].

use std::sync::LazyLock;

use regex::Regex;

use crate::version::{Build, KNOWN_BUILDS, OsVersion, WindowsVersion, feature_update};

static WINDOWS_BUILD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Windows [bB]uild (\d+)").ok());

static WINDOWS_11_UPDATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Windows 11,? version (\w+)").ok());

static WINDOWS_10_UPDATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Windows 10,? version (\w+)").ok());

static CLAUSE_SEPARATOR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r",| and ").ok());

const AVAILABLE_IN: &str = "Available in ";
const PLATFORM_UPDATE: &str = "Platform Update";

/// Classify a documentation sentence.
///
/// Never fails: empty or unrecognized text returns [`OsVersion::NONE`].
pub fn classify(text: &str) -> OsVersion {
    let text = text.replace('\u{a0}', " ");
    clauses(&text)
        .into_iter()
        .filter_map(classify_clause)
        .min()
        .unwrap_or(OsVersion::NONE)
}

/// Canonical sentence for a release and build.
///
/// For every named build, `classify(&describe(v, b)) == OsVersion::new(v, b)`.
/// An unknown Windows 10 or 11 build renders as an unrecognized feature
/// update so that it classifies back to the same pair.
pub fn describe(version: WindowsVersion, build: Build) -> String {
    if build.is_unknown() {
        return match version {
            WindowsVersion::Win10 | WindowsVersion::Win11 => {
                format!("{}, version unknown", version.display_name())
            }
            other => other.display_name().to_string(),
        };
    }

    match build {
        Build::NONE => String::new(),
        Build::WIN2000_RTM => "Windows 2000 Professional".to_string(),
        Build::WINVISTA_SP1 | Build::WINVISTA_SP2 => {
            format!("Windows build {}", build.build_number().unwrap_or_default())
        }
        Build::WIN7_SP1 => "Windows 7 with SP1".to_string(),
        Build::WIN10_1507 | Build::WIN11_21H2 => version.display_name().to_string(),
        other => match other.known().and_then(|known| known.update) {
            Some(update) => format!("{}, version {}", version.display_name(), update),
            None => version.display_name().to_string(),
        },
    }
}

/// Split a sentence into trimmed, non-empty clauses.
///
/// The comma of "Windows 10, version 1809" belongs to its clause.
fn clauses(text: &str) -> Vec<&str> {
    let text = text.trim();
    let text = match text.find('[') {
        Some(index) => &text[..index],
        None => text,
    };
    let text = text.strip_prefix(AVAILABLE_IN).unwrap_or(text);

    let Some(separator) = CLAUSE_SEPARATOR.as_ref() else {
        return vec![text.trim()];
    };

    let mut clauses = Vec::new();
    let mut start = 0;
    for found in separator.find_iter(text) {
        if found.as_str() == "," && text[found.end()..].trim_start().starts_with("version") {
            continue;
        }
        clauses.push(&text[start..found.start()]);
        start = found.end();
    }
    clauses.push(&text[start..]);

    clauses
        .into_iter()
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .collect()
}

/// Apply the rules in order; the first that matches decides the clause.
fn classify_clause(clause: &str) -> Option<OsVersion> {
    if let Some(number) = capture(&WINDOWS_BUILD, clause) {
        if let Some(found) = number.parse::<u32>().ok().and_then(build_from_number) {
            return Some(found);
        }
    }

    if let Some(code) = capture(&WINDOWS_11_UPDATE, clause) {
        return Some(update_or_unknown(WindowsVersion::Win11, code));
    }
    if clause.contains("Windows 11") {
        return Some(OsVersion::from_build(Build::WIN11_21H2));
    }

    if let Some(code) = capture(&WINDOWS_10_UPDATE, clause) {
        return Some(update_or_unknown(WindowsVersion::Win10, code));
    }
    if clause.contains("Windows 10") {
        return Some(OsVersion::from_build(Build::WIN10_1507));
    }

    let platform_update = clause.contains(PLATFORM_UPDATE);
    let build = if clause.contains("Windows 8.1") {
        Build::WIN8_1_RTM
    } else if clause.contains("Windows 8") {
        Build::WIN8_RTM
    } else if clause.contains("Windows 7 with SP1") && !platform_update {
        Build::WIN7_SP1
    } else if clause.contains("Windows 7") && !platform_update {
        Build::WIN7_RTM
    } else if clause.contains("Windows Vista") && !platform_update {
        Build::WINVISTA_RTM
    } else if clause.contains("Windows XP") {
        Build::WINXP_RTM
    } else if clause.contains("Windows 2000") {
        Build::WIN2000_RTM
    } else {
        return None;
    };

    Some(OsVersion::from_build(build))
}

fn capture<'t>(pattern: &LazyLock<Option<Regex>>, text: &'t str) -> Option<&'t str> {
    pattern
        .as_ref()?
        .captures(text)?
        .get(1)
        .map(|group| group.as_str())
}

/// Reverse lookup of a bare build number against the named builds.
fn build_from_number(number: u32) -> Option<OsVersion> {
    KNOWN_BUILDS
        .iter()
        .find(|known| known.build.build_number() == Some(number))
        .map(|known| OsVersion::from_build(known.build))
}

fn update_or_unknown(version: WindowsVersion, code: &str) -> OsVersion {
    match feature_update(version, code) {
        Some(build) => OsVersion::new(version, build),
        None => OsVersion::new(version, Build::UNKNOWN),
    }
}
