//! Test utilities for copconf integration tests

#![allow(dead_code)]

use copconf::{ConfigDocument, StaticCheckRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

/// A trimmed-down version of the shipped default configuration
pub const REFERENCE_YAML: &str = r#"
AllCops:
  Include:
    - '**/*.rb'
  Exclude: []
  TargetRubyVersion: ~
  TargetRailsVersion: ~
  DisabledByDefault: false
  EnabledByDefault: false
  NewCops: pending
Lint/Syntax:
  Description: Checks syntax error.
  Enabled: true
  VersionAdded: '0.9'
Style/StringLiterals:
  Description: Checks if uses of quotes match the configured preference.
  Enabled: true
  EnforcedStyle: single_quotes
  SupportedStyles:
    - single_quotes
    - double_quotes
Style/Foo:
  Enabled: true
  EnforcedFooStyle: a
  SupportedEnforcedFooStyles:
    - a
    - b
Layout/LineLength:
  Description: Checks that line length does not exceed the configured limit.
  Enabled: true
  Max: 80
"#;

/// Parse the reference document
pub fn reference_document() -> ConfigDocument {
    ConfigDocument::from_yaml_str(REFERENCE_YAML, None).expect("reference document parses")
}

/// Registry knowing every check in the reference document
pub fn registry_for(reference: &ConfigDocument) -> StaticCheckRegistry {
    StaticCheckRegistry::from_reference(reference)
}

/// A temporary project directory
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    /// Remove a file relative to the project root
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).expect("remove file");
    }

    /// Write `yaml` as the dotfile in `relative_dir` and load it
    pub fn dotfile(&self, relative_dir: &str, yaml: &str) -> ConfigDocument {
        let relative = if relative_dir.is_empty() {
            ".rubocop.yml".to_string()
        } else {
            format!("{}/.rubocop.yml", relative_dir)
        };
        let path = self.write(&relative, yaml);
        ConfigDocument::load(&path)
            .expect("load dotfile")
            .with_working_dir(self.root())
    }
}
