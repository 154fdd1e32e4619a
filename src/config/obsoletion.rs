//! Rejection of renamed and removed checks and parameters
//!
//! The tool ships its obsoletion data as a separate TOML document:
//!
//! ```toml
//! [renamed]
//! "Style/MethodMissing" = "Style/MissingRespondToMissing"
//!
//! [removed]
//! "Layout/SpaceAfterControlKeyword" = "Layout/SpaceAroundKeyword"
//! "Style/TrailingComma" = ""
//!
//! [[parameters]]
//! checks = ["Layout/SpaceAroundOperators"]
//! parameters = ["MultiSpaceAllowedForOperators"]
//! alternative = "AllowForAlignment"
//! ```

use crate::config::document::ConfigDocument;
use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Decides whether a document uses configuration that no longer exists
pub trait ObsoleteConfigPolicy: Send + Sync {
    /// Returns an error describing every obsolete entry found in `document`
    fn reject_obsolete(&self, document: &ConfigDocument) -> Result<(), ConfigError>;
}

/// Policy that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObsoletion;

impl ObsoleteConfigPolicy for NoObsoletion {
    fn reject_obsolete(&self, _document: &ConfigDocument) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Parameters that were dropped from one or more checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsoleteParameter {
    pub checks: Vec<String>,
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

/// Table-driven obsoletion policy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObsoletionTable {
    /// Old check name to new check name
    #[serde(default)]
    pub renamed: IndexMap<String, String>,

    /// Removed check name to replacement (empty when there is none)
    #[serde(default)]
    pub removed: IndexMap<String, String>,

    #[serde(default)]
    pub parameters: Vec<ObsoleteParameter>,
}

impl ObsoletionTable {
    /// Load an obsoletion table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse an obsoletion table from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let table: ObsoletionTable = toml::from_str(s)?;
        Ok(table)
    }

    /// Messages for every obsolete entry in `document`
    pub fn messages_for(&self, document: &ConfigDocument) -> Vec<String> {
        let mut messages = Vec::new();

        for (old, new) in &self.renamed {
            if document.contains_section(old) {
                messages.push(format!("The `{}` cop has been renamed to `{}`.", old, new));
            }
        }

        for (name, replacement) in &self.removed {
            if document.contains_section(name) {
                if replacement.is_empty() {
                    messages.push(format!("The `{}` cop has been removed.", name));
                } else {
                    messages.push(format!(
                        "The `{}` cop has been removed. Please use `{}` instead.",
                        name, replacement
                    ));
                }
            }
        }

        for entry in &self.parameters {
            for check in &entry.checks {
                let options = document.for_check(check);
                for parameter in &entry.parameters {
                    if !options.contains_key(parameter) {
                        continue;
                    }
                    let mut message = format!(
                        "obsolete parameter {} (for {}) found in {}",
                        parameter,
                        check,
                        document.friendly_path()
                    );
                    if let Some(alternative) = &entry.alternative {
                        message.push_str(&format!("\n`{}` has been replaced by `{}`.", parameter, alternative));
                    }
                    messages.push(message);
                }
            }
        }

        messages
    }
}

impl ObsoleteConfigPolicy for ObsoletionTable {
    fn reject_obsolete(&self, document: &ConfigDocument) -> Result<(), ConfigError> {
        let messages = self.messages_for(document);
        if messages.is_empty() {
            return Ok(());
        }
        Err(ConfigError::ObsoleteConfiguration {
            messages: messages.join("\n"),
            path: document.friendly_path(),
        })
    }
}
