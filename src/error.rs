//! Error types for copconf
//!
//! Every variant of [`ConfigError`] is a hard failure: the configuration
//! cannot be used and no check may run. Recoverable problems are reported
//! as [`crate::validation::Diagnostic`] values instead.

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document tree has a shape the value model does not support
    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),

    /// A section is present but has no body
    #[error("empty section {section} found in {path}")]
    EmptySection { section: String, path: String },

    /// Target language version that used to be supported
    #[error(
        "Unsupported Ruby version {version} found in {origin}. {version}-compatible analysis was dropped after version {last_release}.\nSupported versions: {supported}"
    )]
    ObsoleteTargetVersion {
        version: String,
        origin: String,
        last_release: String,
        supported: String,
    },

    /// Target language version that was never supported
    #[error("Unknown Ruby version {version} found in {origin}.\nSupported versions: {supported}")]
    UnknownTargetVersion {
        version: String,
        origin: String,
        supported: String,
    },

    /// An `Enforced*` value outside of the supported list
    #[error("invalid {key} '{value}' for {check} found in {path}\nValid choices are: {choices}")]
    InvalidEnforcedStyle {
        check: String,
        key: String,
        value: String,
        path: String,
        choices: String,
    },

    /// `AllCops.NewCops` has an unrecognized value
    #[error("invalid {value} for `NewCops` found in {path}\nValid choices are: {choices}")]
    InvalidNewChecksPolicy {
        value: String,
        path: String,
        choices: String,
    },

    /// The protected syntax check was reconfigured
    #[error("configuration for Syntax cop found in {path}\nIt's not possible to disable this cop.")]
    ProtectedCheckModified { check: String, path: String },

    /// `DisabledByDefault` and `EnabledByDefault` are both set
    #[error("Cops cannot be both enabled by default and disabled by default (in {path})")]
    MutuallyExclusiveDefaults { path: String },

    /// A section marked unsafe claims a safe autocorrection
    #[error("Unsafe cops cannot have a safe auto-correction (section {section} in {path})")]
    ConflictingSafetySettings { section: String, path: String },

    /// Renamed or removed checks and parameters
    #[error("{messages}\n(obsolete configuration found in {path}, please update it)")]
    ObsoleteConfiguration { messages: String, path: String },

    /// YAML document could not be parsed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Returns true for errors raised by validation rather than by loading
    pub fn is_validation_error(&self) -> bool {
        !matches!(
            self,
            ConfigError::Yaml(_) | ConfigError::Toml(_) | ConfigError::Io(_)
        )
    }
}
