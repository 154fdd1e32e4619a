//! File probes for version markers and dependency lock files
//!
//! Every probe degrades to `None` when a file is missing, unreadable or
//! does not contain what we look for.

use crate::version::target::TargetVersion;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Version-marker file looked up from the base directory upwards
pub const VERSION_FILE: &str = ".ruby-version";

/// Lock files, in lookup order
pub const LOCK_FILES: [&str; 2] = ["gems.locked", "Gemfile.lock"];

static VERSION_FILE_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A(?:ruby-)?(\d+)\.(\d+)").expect("valid version file regex"));

static LOCK_SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*RUBY\s*VERSION\s*$").expect("valid lock header regex"));

static LOCK_RUNTIME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*ruby\s+(\d+)\.(\d+)[p.\d]*\s*$").expect("valid lock runtime regex"));

static LOCK_FRAMEWORK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+railties \((\d+)\.(\d+)").expect("valid lock framework regex"));

/// Finds `file_name` in `start_dir` or the nearest ancestor containing it
pub fn find_file_upwards(file_name: &str, start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Finds the first lock file above `start_dir`
pub fn find_lock_file(start_dir: &Path) -> Option<PathBuf> {
    LOCK_FILES
        .iter()
        .find_map(|name| find_file_upwards(name, start_dir))
}

/// Extracts the version from a version-marker file
pub fn read_version_file(path: &Path) -> Option<TargetVersion> {
    let content = fs::read_to_string(path)
        .map_err(|e| tracing::debug!(path = %path.display(), error = %e, "unreadable version file"))
        .ok()?;
    version_from_captures(VERSION_FILE_CONTENT.captures(&content))
}

/// Scans a lock file for the runtime version
///
/// Only lines after the `RUBY VERSION` header are considered, and only a
/// line naming the `ruby` runtime alone matches. Alternate runtimes are
/// written as `ruby 2.3.3p222 (jruby 9.1.15.0)` and are skipped.
pub fn runtime_version_from_lock_file(path: &Path) -> Option<TargetVersion> {
    let mut in_version_section = false;
    for line in lines_of(path)? {
        in_version_section = in_version_section || LOCK_SECTION_HEADER.is_match(&line);
        if !in_version_section {
            continue;
        }
        if let Some(version) = version_from_captures(LOCK_RUNTIME_LINE.captures(&line)) {
            return Some(version);
        }
    }
    None
}

/// Scans a lock file for the framework dependency version; first match wins
pub fn framework_version_from_lock_file(path: &Path) -> Option<TargetVersion> {
    lines_of(path)?.find_map(|line| version_from_captures(LOCK_FRAMEWORK_LINE.captures(&line)))
}

fn lines_of(path: &Path) -> Option<impl Iterator<Item = String>> {
    let file = File::open(path)
        .map_err(|e| tracing::debug!(path = %path.display(), error = %e, "unreadable lock file"))
        .ok()?;
    Some(BufReader::new(file).lines().map_while(Result::ok))
}

fn version_from_captures(captures: Option<regex::Captures<'_>>) -> Option<TargetVersion> {
    let captures = captures?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;
    Some(TargetVersion::new(major, minor))
}
