//! Target version values and where they came from

use crate::config::value::ConfigValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A `major.minor` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetVersion {
    pub major: u32,
    pub minor: u32,
}

impl TargetVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Reads an explicit setting given as a number or a string
    pub fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Integer(i) => u32::try_from(*i).ok().map(|major| Self::new(major, 0)),
            ConfigValue::Float(f) => f.to_string().parse().ok(),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

static VERSION_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\.(\d+))?(?:\.\d+)*\s*$").expect("valid version regex"));

impl FromStr for TargetVersion {
    type Err = String;

    /// Accepts `2`, `2.5` and `2.5.1` (the patch level is ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_TEXT
            .captures(s)
            .ok_or_else(|| format!("Invalid version '{}'", s))?;
        let major = captures[1]
            .parse()
            .map_err(|_| format!("Invalid version '{}'", s))?;
        let minor = match captures.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| format!("Invalid version '{}'", s))?,
            None => 0,
        };
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Where a resolved version came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// The explicit setting in the global section
    ExplicitSetting,
    /// A version-marker file
    VersionFile(PathBuf),
    /// A dependency lock file
    LockFile(PathBuf),
    /// Nothing was found; the built-in default applies
    Default,
}

/// A resolved version together with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: TargetVersion,
    pub source: VersionSource,
}

impl ResolvedVersion {
    pub fn new(version: TargetVersion, source: VersionSource) -> Self {
        Self { version, source }
    }
}

/// Language versions the analysis supports
pub const KNOWN_LANGUAGE_VERSIONS: [TargetVersion; 6] = [
    TargetVersion::new(2, 2),
    TargetVersion::new(2, 3),
    TargetVersion::new(2, 4),
    TargetVersion::new(2, 5),
    TargetVersion::new(2, 6),
    TargetVersion::new(2, 7),
];

/// Dropped language versions and the last release that still analyzed them
pub const OBSOLETE_LANGUAGE_VERSIONS: [(TargetVersion, &str); 3] = [
    (TargetVersion::new(1, 9), "0.50"),
    (TargetVersion::new(2, 0), "0.50"),
    (TargetVersion::new(2, 1), "0.58"),
];

pub const DEFAULT_LANGUAGE_VERSION: TargetVersion = TargetVersion::new(2, 2);

pub const DEFAULT_FRAMEWORK_VERSION: TargetVersion = TargetVersion::new(5, 0);

/// Returns true if `version` is supported
pub fn is_known_language_version(version: TargetVersion) -> bool {
    KNOWN_LANGUAGE_VERSIONS.contains(&version)
}

/// Last release that supported a dropped version
pub fn obsolete_since(version: TargetVersion) -> Option<&'static str> {
    OBSOLETE_LANGUAGE_VERSIONS
        .iter()
        .find(|(obsolete, _)| *obsolete == version)
        .map(|(_, release)| *release)
}

/// Comma-separated list of supported versions
pub fn supported_versions_list() -> String {
    KNOWN_LANGUAGE_VERSIONS
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
