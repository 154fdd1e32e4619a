#![forbid(unsafe_code)]

//! copconf: effective configuration for a Ruby static-analysis tool
//!
//! Takes a merged configuration document, finalizes it once against the
//! shipped defaults, and then answers the questions asked for every file
//! and check during a run: is this file in scope, is this check enabled
//! and with which options, and which language and framework versions
//! are targeted.

pub mod checks;
pub mod config;
pub mod error;
pub mod scope;
pub mod types;
pub mod validation;
pub mod version;

// Re-export error types for convenient access
pub use error::ConfigError;

// Re-export core domain types for convenient access
pub use checks::{CheckRegistry, CheckState, NewChecksPolicy, StaticCheckRegistry};
pub use config::{ConfigDocument, ConfigValue, NoObsoletion, ObsoleteConfigPolicy, ObsoletionTable};
pub use scope::Pattern;
pub use types::{CheckName, Severity};
pub use validation::{Diagnostic, DiagnosticKind, Validator};
pub use version::{ResolvedVersion, TargetVersion, VersionSource};
