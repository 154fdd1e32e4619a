#![forbid(unsafe_code)]

//! Core domain types for copconf
//!
//! This module defines the small value types shared by the resolver,
//! the validator and the check-state cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved section holding cross-cutting settings
pub const GLOBAL_SECTION: &str = "AllCops";

/// Directive key kept in documents although it names no check
pub const INHERIT_MODE_KEY: &str = "inherit_mode";

/// Severity levels a check may report with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Refactor,
    Convention,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// All severity levels, least severe first
    pub const ALL: [Severity; 6] = [
        Severity::Info,
        Severity::Refactor,
        Severity::Convention,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Refactor => "refactor",
            Severity::Convention => "convention",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| format!("Unknown severity '{}'", s))
    }
}

/// A qualified check name of the form `Department/ShortName`
///
/// A bare department name (`Style`) is also a valid `CheckName`; it simply
/// has no short part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckName {
    qualified: String,
    split: Option<usize>,
}

impl CheckName {
    /// Parses a check name, splitting at the first `/`
    pub fn new(name: impl Into<String>) -> Self {
        let qualified = name.into();
        let split = qualified.find('/');
        CheckName { qualified, split }
    }

    /// Returns the department part (the whole name for department-only names)
    pub fn department(&self) -> &str {
        match self.split {
            Some(idx) => &self.qualified[..idx],
            None => &self.qualified,
        }
    }

    /// Returns the short part, if any
    pub fn short_name(&self) -> Option<&str> {
        self.split.map(|idx| &self.qualified[idx + 1..])
    }

    pub fn is_department(&self) -> bool {
        self.split.is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.qualified
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

impl From<&str> for CheckName {
    fn from(name: &str) -> Self {
        CheckName::new(name)
    }
}
