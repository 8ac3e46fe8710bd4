//! Windows release and build identifiers.
//!
//! A [`Build`] packs its release into the upper bits:
//! `(version << 20) | build_number`. Comparing two packed builds as integers
//! therefore orders them by release first and build number second.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bit offset of the release inside a packed [`Build`].
pub const VERSION_SHIFT: u32 = 20;

/// Mask selecting the build number of a packed [`Build`].
pub const BUILD_NUMBER_MASK: i32 = 0x0F_FFFF;

/// Windows client release.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum WindowsVersion {
    /// No version data
    #[default]
    None = 0,
    Win2000 = 50,
    WinXP = 51,
    WinVista = 60,
    Win7 = 70,
    Win8 = 80,
    Win8_1 = 81,
    Win10 = 100,
    Win11 = 110,
}

impl WindowsVersion {
    /// Every defined release, oldest first.
    pub const ALL: [WindowsVersion; 8] = [
        Self::Win2000,
        Self::WinXP,
        Self::WinVista,
        Self::Win7,
        Self::Win8,
        Self::Win8_1,
        Self::Win10,
        Self::Win11,
    ];

    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            other => Self::ALL.into_iter().find(|v| v.as_i32() == other),
        }
    }

    /// Identifier name (`Win8_1`).
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Win2000 => "Win2000",
            Self::WinXP => "WinXP",
            Self::WinVista => "WinVista",
            Self::Win7 => "Win7",
            Self::Win8 => "Win8",
            Self::Win8_1 => "Win8_1",
            Self::Win10 => "Win10",
            Self::Win11 => "Win11",
        }
    }

    /// Marketing name (`Windows 8.1`).
    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "no version data",
            Self::Win2000 => "Windows 2000",
            Self::WinXP => "Windows XP",
            Self::WinVista => "Windows Vista",
            Self::Win7 => "Windows 7",
            Self::Win8 => "Windows 8",
            Self::Win8_1 => "Windows 8.1",
            Self::Win10 => "Windows 10",
            Self::Win11 => "Windows 11",
        }
    }
}

impl fmt::Display for WindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a version or build name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown Windows version or build name '{0}'")]
pub struct ParseVersionError(pub String);

impl FromStr for WindowsVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

/// Packed release and build number.
///
/// `Build::NONE` means no data. `Build::UNKNOWN` means the release is known
/// but the build within it is not.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Build(i32);

impl Build {
    pub const NONE: Build = Build(0);
    pub const UNKNOWN: Build = Build(-1);

    pub const WIN2000_RTM: Build = Build::pack(WindowsVersion::Win2000, 2195);
    pub const WINXP_RTM: Build = Build::pack(WindowsVersion::WinXP, 2600);
    pub const WINVISTA_RTM: Build = Build::pack(WindowsVersion::WinVista, 6000);
    pub const WINVISTA_SP1: Build = Build::pack(WindowsVersion::WinVista, 6001);
    pub const WINVISTA_SP2: Build = Build::pack(WindowsVersion::WinVista, 6002);
    pub const WIN7_RTM: Build = Build::pack(WindowsVersion::Win7, 7600);
    pub const WIN7_SP1: Build = Build::pack(WindowsVersion::Win7, 7601);
    pub const WIN8_RTM: Build = Build::pack(WindowsVersion::Win8, 9200);
    pub const WIN8_1_RTM: Build = Build::pack(WindowsVersion::Win8_1, 9600);
    pub const WIN10_1507: Build = Build::pack(WindowsVersion::Win10, 10240);
    pub const WIN10_1511: Build = Build::pack(WindowsVersion::Win10, 10586);
    pub const WIN10_1607: Build = Build::pack(WindowsVersion::Win10, 14393);
    pub const WIN10_1703: Build = Build::pack(WindowsVersion::Win10, 15063);
    pub const WIN10_1709: Build = Build::pack(WindowsVersion::Win10, 16299);
    pub const WIN10_1803: Build = Build::pack(WindowsVersion::Win10, 17134);
    pub const WIN10_1809: Build = Build::pack(WindowsVersion::Win10, 17763);
    pub const WIN10_1903: Build = Build::pack(WindowsVersion::Win10, 18362);
    pub const WIN10_1909: Build = Build::pack(WindowsVersion::Win10, 18363);
    pub const WIN10_2004: Build = Build::pack(WindowsVersion::Win10, 19041);
    pub const WIN10_20H2: Build = Build::pack(WindowsVersion::Win10, 19042);
    pub const WIN10_21H1: Build = Build::pack(WindowsVersion::Win10, 19043);
    pub const WIN10_21H2: Build = Build::pack(WindowsVersion::Win10, 19044);
    pub const WIN10_22H2: Build = Build::pack(WindowsVersion::Win10, 19045);
    pub const WIN11_21H2: Build = Build::pack(WindowsVersion::Win11, 22000);
    pub const WIN11_22H2: Build = Build::pack(WindowsVersion::Win11, 22621);
    pub const WIN11_23H2: Build = Build::pack(WindowsVersion::Win11, 22631);
    pub const WIN11_24H2: Build = Build::pack(WindowsVersion::Win11, 26100);

    /// Pack a release and build number. `number` must fit in 20 bits.
    pub const fn pack(version: WindowsVersion, number: u32) -> Build {
        Build((version.as_i32() << VERSION_SHIFT) | (number as i32 & BUILD_NUMBER_MASK))
    }

    pub const fn from_raw(raw: i32) -> Build {
        Build(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_unknown(self) -> bool {
        self.0 == -1
    }

    /// Build number within the release, for concrete builds.
    pub fn build_number(self) -> Option<u32> {
        if self.0 <= 0 {
            return None;
        }
        Some((self.0 & BUILD_NUMBER_MASK) as u32)
    }

    /// Release encoded in the upper bits. Sentinels decode to `None`.
    pub fn version(self) -> WindowsVersion {
        if self.0 <= 0 {
            return WindowsVersion::None;
        }
        WindowsVersion::from_i32(self.0 >> VERSION_SHIFT).unwrap_or_default()
    }

    /// The named build this value corresponds to, if any.
    pub fn known(self) -> Option<&'static KnownBuild> {
        KNOWN_BUILDS.iter().find(|known| known.build == self)
    }

    /// Identifier name (`Win10_1809`), or `None`/`Unknown` for sentinels.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::NONE => Some("None"),
            Self::UNKNOWN => Some("Unknown"),
            other => other.known().map(|known| known.name),
        }
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for Build {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        KNOWN_BUILDS
            .iter()
            .find(|known| known.name.eq_ignore_ascii_case(wanted))
            .map(|known| known.build)
            .ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

/// A named build of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownBuild {
    pub build: Build,
    /// Identifier name (`Win10_1809`)
    pub name: &'static str,
    /// Feature-update code used in documentation (`1809`, `22H2`)
    pub update: Option<&'static str>,
}

impl KnownBuild {
    const fn new(build: Build, name: &'static str, update: Option<&'static str>) -> Self {
        Self {
            build,
            name,
            update,
        }
    }

    pub fn version(&self) -> WindowsVersion {
        self.build.version()
    }
}

/// Every named build, oldest first.
pub static KNOWN_BUILDS: &[KnownBuild] = &[
    KnownBuild::new(Build::WIN2000_RTM, "Win2000_RTM", None),
    KnownBuild::new(Build::WINXP_RTM, "WinXP_RTM", None),
    KnownBuild::new(Build::WINVISTA_RTM, "WinVista_RTM", None),
    KnownBuild::new(Build::WINVISTA_SP1, "WinVista_SP1", None),
    KnownBuild::new(Build::WINVISTA_SP2, "WinVista_SP2", None),
    KnownBuild::new(Build::WIN7_RTM, "Win7_RTM", None),
    KnownBuild::new(Build::WIN7_SP1, "Win7_SP1", None),
    KnownBuild::new(Build::WIN8_RTM, "Win8_RTM", None),
    KnownBuild::new(Build::WIN8_1_RTM, "Win8_1_RTM", None),
    KnownBuild::new(Build::WIN10_1507, "Win10_1507", Some("1507")),
    KnownBuild::new(Build::WIN10_1511, "Win10_1511", Some("1511")),
    KnownBuild::new(Build::WIN10_1607, "Win10_1607", Some("1607")),
    KnownBuild::new(Build::WIN10_1703, "Win10_1703", Some("1703")),
    KnownBuild::new(Build::WIN10_1709, "Win10_1709", Some("1709")),
    KnownBuild::new(Build::WIN10_1803, "Win10_1803", Some("1803")),
    KnownBuild::new(Build::WIN10_1809, "Win10_1809", Some("1809")),
    KnownBuild::new(Build::WIN10_1903, "Win10_1903", Some("1903")),
    KnownBuild::new(Build::WIN10_1909, "Win10_1909", Some("1909")),
    KnownBuild::new(Build::WIN10_2004, "Win10_2004", Some("2004")),
    KnownBuild::new(Build::WIN10_20H2, "Win10_20H2", Some("20H2")),
    KnownBuild::new(Build::WIN10_21H1, "Win10_21H1", Some("21H1")),
    KnownBuild::new(Build::WIN10_21H2, "Win10_21H2", Some("21H2")),
    KnownBuild::new(Build::WIN10_22H2, "Win10_22H2", Some("22H2")),
    KnownBuild::new(Build::WIN11_21H2, "Win11_21H2", Some("21H2")),
    KnownBuild::new(Build::WIN11_22H2, "Win11_22H2", Some("22H2")),
    KnownBuild::new(Build::WIN11_23H2, "Win11_23H2", Some("23H2")),
    KnownBuild::new(Build::WIN11_24H2, "Win11_24H2", Some("24H2")),
];

/// Look up a feature update of `version` by its documentation code.
pub fn feature_update(version: WindowsVersion, code: &str) -> Option<Build> {
    KNOWN_BUILDS
        .iter()
        .find(|known| known.version() == version && known.update == Some(code))
        .map(|known| known.build)
}

/// Release and build pair, ordered by release first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OsVersion {
    pub version: WindowsVersion,
    pub build: Build,
}

impl OsVersion {
    pub const NONE: OsVersion = OsVersion::new(WindowsVersion::None, Build::NONE);

    pub const fn new(version: WindowsVersion, build: Build) -> Self {
        Self { version, build }
    }

    /// Pair for a named build, with the release taken from the build.
    pub fn from_build(build: Build) -> Self {
        Self::new(build.version(), build)
    }

    pub fn is_none(&self) -> bool {
        self.version == WindowsVersion::None
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str(self.version.display_name());
        }
        match self.build.build_number() {
            Some(number) => write!(f, "{} (build {})", self.version, number),
            None => write!(f, "{} (unknown build)", self.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_builds_order_by_release_then_number() {
        assert!(Build::WIN7_SP1 > Build::WIN7_RTM);
        assert!(Build::WIN8_RTM > Build::WIN7_SP1);
        assert!(Build::WIN11_21H2 > Build::WIN10_22H2);
        assert!(Build::UNKNOWN < Build::NONE);
    }

    #[test]
    fn build_decodes_release_and_number() {
        assert_eq!(Build::WIN10_1809.version(), WindowsVersion::Win10);
        assert_eq!(Build::WIN10_1809.build_number(), Some(17763));
        assert_eq!(Build::WIN10_1809.raw(), (100 << 20) | 17763);
        assert_eq!(Build::UNKNOWN.version(), WindowsVersion::None);
        assert_eq!(Build::NONE.build_number(), None);
    }

    #[test]
    fn known_builds_are_sorted_and_consistent() {
        for pair in KNOWN_BUILDS.windows(2) {
            assert!(pair[0].build < pair[1].build, "{} >= {}", pair[0].name, pair[1].name);
        }
        for known in KNOWN_BUILDS {
            assert!(known.name.starts_with(known.version().name()));
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("win8_1".parse::<WindowsVersion>(), Ok(WindowsVersion::Win8_1));
        assert_eq!("WIN10_1809".parse::<Build>(), Ok(Build::WIN10_1809));
        assert!("Win12".parse::<WindowsVersion>().is_err());
        assert!("None".parse::<WindowsVersion>().is_err());
    }

    #[test]
    fn feature_update_lookup_is_per_release() {
        assert_eq!(feature_update(WindowsVersion::Win10, "21H2"), Some(Build::WIN10_21H2));
        assert_eq!(feature_update(WindowsVersion::Win11, "21H2"), Some(Build::WIN11_21H2));
        assert_eq!(feature_update(WindowsVersion::Win11, "1809"), None);
    }

    #[test]
    fn os_version_orders_lexicographically() {
        let unknown_11 = OsVersion::new(WindowsVersion::Win11, Build::UNKNOWN);
        let win10 = OsVersion::from_build(Build::WIN10_22H2);
        assert!(unknown_11 > win10);
        assert!(OsVersion::NONE < win10);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Build::WIN7_SP1.to_string(), "Win7_SP1");
        assert_eq!(
            OsVersion::from_build(Build::WIN7_SP1).to_string(),
            "Windows 7 (build 7601)"
        );
        assert_eq!(
            OsVersion::new(WindowsVersion::Win10, Build::UNKNOWN).to_string(),
            "Windows 10 (unknown build)"
        );
    }
}
