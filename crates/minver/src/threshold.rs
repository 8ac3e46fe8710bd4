//! Maximum-allowed version thresholds.

use std::fmt;
use std::str::FromStr;

use minver_store::{Build, OsVersion, ParseVersionError, WindowsVersion};
use serde::{Deserialize, Serialize};

/// Highest release (or build) a binary is expected to require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionThreshold {
    /// Any build of this release or older is allowed
    Version(WindowsVersion),
    /// This build or older is allowed
    Build(Build),
}

impl VersionThreshold {
    /// Whether `version` is newer than the threshold allows.
    ///
    /// Build thresholds compare `(release, build)` pairs, so a symbol known
    /// only as "Windows 11, unknown build" still exceeds any Windows 10 build.
    pub fn is_exceeded_by(&self, version: OsVersion) -> bool {
        match *self {
            Self::Version(max) => version.version > max,
            Self::Build(max) => version > OsVersion::from_build(max),
        }
    }
}

impl fmt::Display for VersionThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(version) => write!(f, "version {}", version.name()),
            Self::Build(build) => write!(f, "build {}", build),
        }
    }
}

/// Parses a build name (`Win10_1809`) or a version name (`Win7`),
/// case-insensitively. Build names are tried first.
impl FromStr for VersionThreshold {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(build) = s.parse::<Build>() {
            return Ok(Self::Build(build));
        }
        s.parse::<WindowsVersion>().map(Self::Version)
    }
}
