#![forbid(unsafe_code)]

//! Cross-checks a merged document against the reference defaults
//!
//! Warnings are collected and returned; the first hard problem aborts
//! validation with a [`ConfigError`].

use crate::checks::{CheckRegistry, NewChecksPolicy};
use crate::config::document::ConfigDocument;
use crate::config::obsoletion::{NoObsoletion, ObsoleteConfigPolicy};
use crate::config::value::{ConfigValue, Options};
use crate::error::ConfigError;
use crate::scope::matcher::Pattern;
use crate::types::{CheckName, INHERIT_MODE_KEY, Severity};
use crate::validation::diagnostic::{Diagnostic, DiagnosticKind};
use crate::version::TARGET_LANGUAGE_VERSION_KEY;
use crate::version::target::{
    TargetVersion, is_known_language_version, obsolete_since, supported_versions_list,
};
use std::path::{Path, PathBuf};

/// Parameters every check accepts
pub const COMMON_PARAMS: [&str; 7] = [
    "Exclude",
    "Include",
    "Severity",
    INHERIT_MODE_KEY,
    "AutoCorrect",
    "StyleGuide",
    "Details",
];

/// Schema keys used for documentation only, never listed as supported
pub const INTERNAL_PARAMS: [&str; 8] = [
    "Description",
    "StyleGuide",
    "VersionAdded",
    "VersionChanged",
    "VersionRemoved",
    "Reference",
    "Safe",
    "SafeAutoCorrect",
];

/// Check whose configuration must match the shipped defaults
pub const PROTECTED_CHECK: &str = "Lint/Syntax";

const ENFORCED_PREFIX: &str = "Enforced";

/// Validates documents against a reference document
pub struct Validator<'a> {
    reference: &'a ConfigDocument,
    registry: &'a dyn CheckRegistry,
    obsoletion: &'a dyn ObsoleteConfigPolicy,
    shipped_config_dir: Option<&'a Path>,
}

/// Warnings gathered during one validation pass
struct Findings {
    location: Option<PathBuf>,
    diagnostics: Vec<Diagnostic>,
}

impl Findings {
    fn warn(&mut self, kind: DiagnosticKind, message: String) {
        tracing::debug!(%kind, %message, "configuration warning");
        self.diagnostics
            .push(Diagnostic::new(kind, message, self.location.clone()));
    }
}

impl<'a> Validator<'a> {
    pub fn new(reference: &'a ConfigDocument, registry: &'a dyn CheckRegistry) -> Self {
        Self {
            reference,
            registry,
            obsoletion: &NoObsoletion,
            shipped_config_dir: None,
        }
    }

    /// Use `policy` to reject renamed and removed configuration
    pub fn with_obsoletion(mut self, policy: &'a dyn ObsoleteConfigPolicy) -> Self {
        self.obsoletion = policy;
        self
    }

    /// Skip documents loaded from inside `dir`
    pub fn with_shipped_config_dir(mut self, dir: &'a Path) -> Self {
        self.shipped_config_dir = Some(dir);
        self
    }

    /// Validates `doc`, returning the warnings found
    pub fn validate(&self, doc: &ConfigDocument) -> Result<Vec<Diagnostic>, ConfigError> {
        if let Some(dir) = self.shipped_config_dir
            && doc.is_internal(dir)
        {
            tracing::debug!(path = %doc.friendly_path(), "skipping validation of shipped configuration");
            return Ok(Vec::new());
        }

        let path = doc.friendly_path();
        let mut findings = Findings {
            location: doc.source_path().map(Path::to_path_buf),
            diagnostics: Vec::new(),
        };

        reject_empty_sections(doc, &path)?;
        reject_conflicting_safe_settings(doc, &path)?;

        let (unrecognized, recognized): (Vec<&str>, Vec<&str>) = doc
            .section_names()
            .partition(|name| !self.reference.contains_section(name));

        self.obsoletion.reject_obsolete(doc)?;
        self.warn_about_unrecognized_sections(&unrecognized, &path, &mut findings);
        check_target_version(doc)?;
        check_new_checks_policy(doc, &path)?;

        for name in &recognized {
            self.warn_about_unknown_parameters(doc, name, &mut findings);
        }
        warn_about_invalid_severities(doc, &path, &mut findings);
        warn_about_invalid_patterns(doc, &path, &mut findings);

        self.validate_enforced_styles(doc, &recognized, &path)?;
        self.validate_protected_check(doc, &path)?;
        reject_mutually_exclusive_defaults(doc, &path)?;

        Ok(findings.diagnostics)
    }

    fn warn_about_unrecognized_sections(&self, names: &[&str], path: &str, findings: &mut Findings) {
        for name in names {
            if *name == INHERIT_MODE_KEY
                || self.is_known_department(name)
                || self.registry.is_known_check(name)
                || self.registry.is_custom_check_matching(name)
            {
                continue;
            }
            findings.warn(
                DiagnosticKind::UnrecognizedSection,
                format!("unrecognized cop {} found in {}", name, path),
            );
        }
    }

    /// A department is known when the reference configures any check in it
    fn is_known_department(&self, name: &str) -> bool {
        CheckName::new(name).is_department()
            && self
                .reference
                .section_names()
                .any(|section| section != name && CheckName::new(section).department() == name)
    }

    fn warn_about_unknown_parameters(&self, doc: &ConfigDocument, name: &str, findings: &mut Findings) {
        let Some(options) = doc.section(name) else {
            return;
        };
        let schema = self.reference.for_check(name);

        for key in options.keys() {
            if COMMON_PARAMS.contains(&key.as_str()) || schema.contains_key(key) {
                continue;
            }
            let supported: Vec<&str> = schema
                .keys()
                .map(String::as_str)
                .filter(|param| !INTERNAL_PARAMS.contains(param))
                .collect();
            findings.warn(
                DiagnosticKind::UnknownParameter,
                format!(
                    "{} does not support {} parameter.\n\nSupported parameters are:\n\n  - {}\n",
                    name,
                    key,
                    supported.join("\n  - ")
                ),
            );
        }
    }

    fn validate_enforced_styles(
        &self,
        doc: &ConfigDocument,
        recognized: &[&str],
        path: &str,
    ) -> Result<(), ConfigError> {
        for name in recognized {
            let Some(options) = doc.section(name) else {
                continue;
            };
            let schema = self.reference.for_check(name);

            for (key, value) in options.iter().filter(|(key, _)| key.starts_with(ENFORCED_PREFIX)) {
                let Some(valid) = supported_styles(schema, key) else {
                    continue;
                };
                if valid.contains(value) {
                    continue;
                }
                let allows_multiple = options
                    .get("AllowMultipleStyles")
                    .or_else(|| schema.get("AllowMultipleStyles"))
                    .is_some_and(ConfigValue::is_truthy);
                if allows_multiple
                    && value
                        .as_list()
                        .is_some_and(|styles| styles.iter().all(|style| valid.contains(style)))
                {
                    continue;
                }

                return Err(ConfigError::InvalidEnforcedStyle {
                    check: name.to_string(),
                    key: key.clone(),
                    value: value.to_string(),
                    path: path.to_string(),
                    choices: valid
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }

    /// The protected check may only restate its defaults
    fn validate_protected_check(&self, doc: &ConfigDocument, path: &str) -> Result<(), ConfigError> {
        let Some(configured) = doc.section(PROTECTED_CHECK) else {
            return Ok(());
        };
        let defaults = self.reference.for_check(PROTECTED_CHECK);

        let mut merged = defaults.clone();
        for (key, value) in configured {
            merged.insert(key.clone(), value.clone());
        }

        if merged != *defaults {
            return Err(ConfigError::ProtectedCheckModified {
                check: PROTECTED_CHECK.to_string(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Name of the supported-styles list for an `Enforced*` key
///
/// `EnforcedStyle` maps to `SupportedStyles` and `EnforcedFooStyle` to
/// `SupportedFooStyles`.
pub(crate) fn supported_styles_key(key: &str) -> String {
    let supported = match key.strip_prefix(ENFORCED_PREFIX) {
        Some(rest) => format!("Supported{}", rest),
        None => key.to_string(),
    };
    supported.replacen("Style", "Styles", 1)
}

fn supported_styles<'s>(schema: &'s Options, key: &str) -> Option<&'s [ConfigValue]> {
    schema
        .get(&supported_styles_key(key))
        .or_else(|| schema.get(&format!("Supported{}s", key)))
        .and_then(ConfigValue::as_list)
}

fn reject_empty_sections(doc: &ConfigDocument, path: &str) -> Result<(), ConfigError> {
    match doc.section_names().find(|name| doc.is_empty_section(name)) {
        Some(section) => Err(ConfigError::EmptySection {
            section: section.to_string(),
            path: path.to_string(),
        }),
        None => Ok(()),
    }
}

fn reject_conflicting_safe_settings(doc: &ConfigDocument, path: &str) -> Result<(), ConfigError> {
    for name in doc.section_names() {
        let options = doc.for_check(name);
        if options.get("Safe") == Some(&ConfigValue::Bool(false))
            && options.get("SafeAutoCorrect") == Some(&ConfigValue::Bool(true))
        {
            return Err(ConfigError::ConflictingSafetySettings {
                section: name.to_string(),
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

fn check_target_version(doc: &ConfigDocument) -> Result<(), ConfigError> {
    if let Some(raw) = doc.for_all_checks().get(TARGET_LANGUAGE_VERSION_KEY)
        && !raw.is_null()
        && TargetVersion::from_value(raw).is_none()
    {
        return Err(ConfigError::UnknownTargetVersion {
            version: raw.to_string(),
            origin: format!(
                "`{}` parameter (in {})",
                TARGET_LANGUAGE_VERSION_KEY,
                doc.friendly_path()
            ),
            supported: supported_versions_list(),
        });
    }

    let version = doc.target_language_version().version;
    if is_known_language_version(version) {
        return Ok(());
    }

    let origin = doc.language_version_origin();
    Err(match obsolete_since(version) {
        Some(release) => ConfigError::ObsoleteTargetVersion {
            version: version.to_string(),
            origin,
            last_release: release.to_string(),
            supported: supported_versions_list(),
        },
        None => ConfigError::UnknownTargetVersion {
            version: version.to_string(),
            origin,
            supported: supported_versions_list(),
        },
    })
}

fn check_new_checks_policy(doc: &ConfigDocument, path: &str) -> Result<(), ConfigError> {
    let Some(value) = doc.for_all_checks().get("NewCops") else {
        return Ok(());
    };
    let valid = value
        .as_str()
        .is_some_and(|s| s.parse::<NewChecksPolicy>().is_ok());
    if valid {
        return Ok(());
    }
    Err(ConfigError::InvalidNewChecksPolicy {
        value: value.to_string(),
        path: path.to_string(),
        choices: NewChecksPolicy::VALUES.join(", "),
    })
}

fn warn_about_invalid_severities(doc: &ConfigDocument, path: &str, findings: &mut Findings) {
    for name in doc.section_names() {
        let Some(value) = doc.for_check(name).get("Severity") else {
            continue;
        };
        if value.as_str().is_some_and(|s| s.parse::<Severity>().is_ok()) {
            continue;
        }
        let levels: Vec<&str> = Severity::ALL.iter().map(Severity::as_str).collect();
        findings.warn(
            DiagnosticKind::InvalidSeverity,
            format!(
                "invalid severity {} for {} found in {}\nValid choices are: {}",
                value,
                name,
                path,
                levels.join(", ")
            ),
        );
    }
}

fn warn_about_invalid_patterns(doc: &ConfigDocument, path: &str, findings: &mut Findings) {
    for name in doc.section_names() {
        let options = doc.for_check(name);
        for key in ["Include", "Exclude"] {
            let entries = match options.get(key) {
                Some(ConfigValue::List(items)) => items.as_slice(),
                Some(single) => std::slice::from_ref(single),
                None => continue,
            };
            for entry in entries {
                let usable = match Pattern::from_value(entry) {
                    Some(Pattern::Glob { matcher, .. }) => matcher.is_some(),
                    Some(Pattern::Regex(_)) => true,
                    None => false,
                };
                if !usable {
                    findings.warn(
                        DiagnosticKind::InvalidPattern,
                        format!("{}/{} entry {} found in {} is not a valid pattern", name, key, entry, path),
                    );
                }
            }
        }
    }
}

fn reject_mutually_exclusive_defaults(doc: &ConfigDocument, path: &str) -> Result<(), ConfigError> {
    if doc.disabled_by_default() && doc.enabled_by_default() {
        return Err(ConfigError::MutuallyExclusiveDefaults {
            path: path.to_string(),
        });
    }
    Ok(())
}
