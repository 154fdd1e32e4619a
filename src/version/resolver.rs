//! Target version resolution
//!
//! The language version is taken from the first source that yields one:
//! the explicit `TargetRubyVersion` setting, the nearest `.ruby-version`
//! file, the nearest lock file, and finally the built-in default. The
//! framework version skips the marker-file step.

use crate::config::document::ConfigDocument;
use crate::config::value::ConfigValue;
use crate::version::probe::{
    VERSION_FILE, find_file_upwards, find_lock_file, framework_version_from_lock_file,
    read_version_file, runtime_version_from_lock_file,
};
use crate::version::target::{
    DEFAULT_FRAMEWORK_VERSION, DEFAULT_LANGUAGE_VERSION, ResolvedVersion, TargetVersion,
    VersionSource,
};
use std::path::Path;

/// Global-section key holding the explicit language version
pub const TARGET_LANGUAGE_VERSION_KEY: &str = "TargetRubyVersion";

/// Global-section key holding the explicit framework version
pub const TARGET_FRAMEWORK_VERSION_KEY: &str = "TargetRailsVersion";

/// Resolves the target language version
pub fn resolve_language_version(explicit: Option<&ConfigValue>, base_dir: &Path) -> ResolvedVersion {
    if let Some(version) = explicit.and_then(TargetVersion::from_value) {
        return ResolvedVersion::new(version, VersionSource::ExplicitSetting);
    }

    if let Some(path) = find_file_upwards(VERSION_FILE, base_dir)
        && let Some(version) = read_version_file(&path)
    {
        tracing::debug!(path = %path.display(), %version, "language version from version file");
        return ResolvedVersion::new(version, VersionSource::VersionFile(path));
    }

    if let Some(path) = find_lock_file(base_dir)
        && let Some(version) = runtime_version_from_lock_file(&path)
    {
        tracing::debug!(path = %path.display(), %version, "language version from lock file");
        return ResolvedVersion::new(version, VersionSource::LockFile(path));
    }

    ResolvedVersion::new(DEFAULT_LANGUAGE_VERSION, VersionSource::Default)
}

/// Resolves the target framework version
pub fn resolve_framework_version(explicit: Option<&ConfigValue>, base_dir: &Path) -> ResolvedVersion {
    if let Some(version) = explicit.and_then(TargetVersion::from_value) {
        return ResolvedVersion::new(version, VersionSource::ExplicitSetting);
    }

    if let Some(path) = find_lock_file(base_dir)
        && let Some(version) = framework_version_from_lock_file(&path)
    {
        tracing::debug!(path = %path.display(), %version, "framework version from lock file");
        return ResolvedVersion::new(version, VersionSource::LockFile(path));
    }

    ResolvedVersion::new(DEFAULT_FRAMEWORK_VERSION, VersionSource::Default)
}

impl ConfigDocument {
    /// The resolved target language version, memoized
    pub fn target_language_version(&self) -> &ResolvedVersion {
        self.language_version.get_or_init(|| {
            resolve_language_version(
                self.for_all_checks().get(TARGET_LANGUAGE_VERSION_KEY),
                self.base_dir(),
            )
        })
    }

    /// The resolved target framework version, memoized
    pub fn target_framework_version(&self) -> &ResolvedVersion {
        self.framework_version.get_or_init(|| {
            resolve_framework_version(
                self.for_all_checks().get(TARGET_FRAMEWORK_VERSION_KEY),
                self.base_dir(),
            )
        })
    }

    /// Describes where the language version came from, for messages
    pub fn language_version_origin(&self) -> String {
        match &self.target_language_version().source {
            VersionSource::ExplicitSetting | VersionSource::Default => format!(
                "`{}` parameter (in {})",
                TARGET_LANGUAGE_VERSION_KEY,
                self.friendly_path()
            ),
            VersionSource::VersionFile(_) => format!("`{}`", VERSION_FILE),
            VersionSource::LockFile(path) => format!("`{}`", path.display()),
        }
    }
}
