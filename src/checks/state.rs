#![forbid(unsafe_code)]

//! Effective per-check enablement and options
//!
//! States are computed on first request and cached on the document for
//! its lifetime. The cache maps a check name to a shared [`CheckState`];
//! concurrent first requests may both compute, but only the first insert
//! is kept, so every caller observes the same `Arc`.

use crate::config::document::ConfigDocument;
use crate::config::value::{ConfigValue, Options};
use crate::scope::matcher::Pattern;
use crate::types::{CheckName, Severity};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Value of `Enabled` that defers to the `NewCops` policy
pub const PENDING: &str = "pending";

/// How checks marked `Enabled: pending` are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewChecksPolicy {
    /// Leave pending checks disabled (and announce them)
    #[default]
    Pending,
    /// Leave pending checks disabled silently
    Disable,
    /// Turn pending checks on
    Enable,
}

impl NewChecksPolicy {
    pub const VALUES: [&'static str; 3] = ["pending", "disable", "enable"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewChecksPolicy::Pending => "pending",
            NewChecksPolicy::Disable => "disable",
            NewChecksPolicy::Enable => "enable",
        }
    }
}

impl fmt::Display for NewChecksPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewChecksPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NewChecksPolicy::Pending),
            "disable" => Ok(NewChecksPolicy::Disable),
            "enable" => Ok(NewChecksPolicy::Enable),
            other => Err(format!("Unknown NewCops value '{}'", other)),
        }
    }
}

/// Resolved state of one check
#[derive(Debug, Clone)]
pub struct CheckState {
    name: CheckName,
    enabled: bool,
    options: Options,
    include: Option<Vec<Pattern>>,
    exclude: Option<Vec<Pattern>>,
}

impl CheckState {
    pub fn name(&self) -> &CheckName {
        &self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The check's own section with the resolved `Enabled` written back
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.options.get(key)
    }

    /// Configured severity, if it names a known level
    pub fn severity(&self) -> Option<Severity> {
        self.options
            .get("Severity")
            .and_then(ConfigValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// The check's own `Include` patterns, `None` when unset
    pub fn include_patterns(&self) -> Option<&[Pattern]> {
        self.include.as_deref()
    }

    /// The check's own `Exclude` patterns, `None` when unset
    pub fn exclude_patterns(&self) -> Option<&[Pattern]> {
        self.exclude.as_deref()
    }
}

impl ConfigDocument {
    /// Effective state of `check`, memoized for the document's lifetime
    pub fn state_of(&self, check: &str) -> Arc<CheckState> {
        if let Some(cached) = self.check_states.get(check) {
            return Arc::clone(cached.value());
        }

        let computed = Arc::new(self.compute_check_state(check));
        let entry = self
            .check_states
            .entry(check.to_string())
            .or_insert(computed);
        Arc::clone(entry.value())
    }

    /// Shorthand for `state_of(check).enabled()`
    pub fn is_check_enabled(&self, check: &str) -> bool {
        self.state_of(check).enabled()
    }

    /// `AllCops/DisabledByDefault`
    pub fn disabled_by_default(&self) -> bool {
        self.for_all_checks()
            .get("DisabledByDefault")
            .is_some_and(ConfigValue::is_truthy)
    }

    /// `AllCops/EnabledByDefault`
    pub fn enabled_by_default(&self) -> bool {
        self.for_all_checks()
            .get("EnabledByDefault")
            .is_some_and(ConfigValue::is_truthy)
    }

    /// `AllCops/NewCops`; unrecognized values are rejected during validation
    pub fn new_checks_policy(&self) -> NewChecksPolicy {
        self.for_all_checks()
            .get("NewCops")
            .and_then(ConfigValue::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Names of checks whose `Enabled` is `pending`
    pub fn pending_checks(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(_, options)| {
                options
                    .as_ref()
                    .and_then(|o| o.get("Enabled"))
                    .and_then(ConfigValue::as_str)
                    == Some(PENDING)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn compute_check_state(&self, check: &str) -> CheckState {
        let name = CheckName::new(check);
        let mut options = self.for_check(check).clone();

        let department_disabled = name.short_name().is_some()
            && self
                .for_department(name.department())
                .get("Enabled")
                .and_then(ConfigValue::as_bool)
                == Some(false);

        let enabled = if department_disabled {
            false
        } else {
            match options.get("Enabled") {
                Some(ConfigValue::String(s)) if s == PENDING => {
                    self.new_checks_policy() == NewChecksPolicy::Enable
                }
                Some(value) => value.is_truthy(),
                None => !self.disabled_by_default(),
            }
        };

        tracing::debug!(check, enabled, department_disabled, "resolved check state");

        let include = options
            .get("Include")
            .map(|value| Self::patterns_from(Some(value)));
        let exclude = options
            .get("Exclude")
            .map(|value| Self::patterns_from(Some(value)));
        options.insert("Enabled".to_string(), ConfigValue::Bool(enabled));

        CheckState {
            name,
            enabled,
            options,
            include,
            exclude,
        }
    }
}
