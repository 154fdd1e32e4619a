//! Structured warnings produced while finalizing a document

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What a warning is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A section naming no known check, department or directive
    UnrecognizedSection,
    /// A parameter the check does not support
    UnknownParameter,
    /// A key that was renamed and has been migrated
    Deprecation,
    /// A `Severity` value that names no severity level
    InvalidSeverity,
    /// An `Include`/`Exclude` entry that cannot be used as a pattern
    InvalidPattern,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnrecognizedSection => "unrecognized-section",
            DiagnosticKind::UnknownParameter => "unknown-parameter",
            DiagnosticKind::Deprecation => "deprecation",
            DiagnosticKind::InvalidSeverity => "invalid-severity",
            DiagnosticKind::InvalidPattern => "invalid-pattern",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable configuration problem
///
/// Diagnostics are always warnings. The caller decides how to render them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Document the problem was found in, `None` for in-memory documents
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: Option<PathBuf>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning: {}", self.message)
    }
}
