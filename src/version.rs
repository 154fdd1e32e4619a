//! Target language and framework version resolution

pub mod probe;
mod resolver;
pub mod target;

pub use resolver::{
    TARGET_FRAMEWORK_VERSION_KEY, TARGET_LANGUAGE_VERSION_KEY, resolve_framework_version,
    resolve_language_version,
};
pub use target::{
    DEFAULT_FRAMEWORK_VERSION, DEFAULT_LANGUAGE_VERSION, KNOWN_LANGUAGE_VERSIONS,
    OBSOLETE_LANGUAGE_VERSIONS, ResolvedVersion, TargetVersion, VersionSource,
};
