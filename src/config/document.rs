//! The merged configuration document
//!
//! A [`ConfigDocument`] is produced by an external loader (one per
//! directory, already merged with its ancestors and the shipped defaults),
//! finalized once, and then queried read-only for the rest of the run.
//! Derived values are memoized on the instance and are safe to compute
//! from several threads at once.

use crate::checks::CheckState;
use crate::config::value::{ConfigValue, Options, yaml_key};
use crate::error::ConfigError;
use crate::scope::matcher::{Pattern, is_absolute, to_absolute, to_absolute_string};
use crate::types::GLOBAL_SECTION;
use crate::validation::{Diagnostic, DiagnosticKind, Validator};
use crate::version::ResolvedVersion;
use dashmap::DashMap;
use indexmap::IndexMap;
use once_cell::sync::{Lazy, OnceCell};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the per-directory configuration dotfile
pub const DOTFILE: &str = ".rubocop.yml";

/// Any document whose file name starts with this prefix resolves path
/// parameters against its own directory
pub const DOTFILE_PREFIX: &str = ".rubocop";

/// Keys renamed from their plural form in the global section
const DEPRECATED_PLURAL_KEYS: [&str; 2] = ["Exclude", "Include"];

static EMPTY_OPTIONS: Lazy<Options> = Lazy::new(Options::new);

/// A fully merged configuration document
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    pub(crate) sections: IndexMap<String, Option<Options>>,
    source_path: Option<PathBuf>,
    pub(crate) working_dir: PathBuf,
    finalized: bool,
    base_dir: OnceCell<PathBuf>,
    signature: OnceCell<String>,
    pub(crate) include_patterns: OnceCell<Vec<Pattern>>,
    pub(crate) exclude_patterns: OnceCell<Vec<Pattern>>,
    pub(crate) possibly_include_hidden: OnceCell<bool>,
    pub(crate) language_version: OnceCell<ResolvedVersion>,
    pub(crate) framework_version: OnceCell<ResolvedVersion>,
    pub(crate) check_states: DashMap<String, Arc<CheckState>>,
}

impl ConfigDocument {
    /// Creates a document from already-converted sections
    ///
    /// A section value of `None` records a key that is present with an
    /// empty body; validation rejects it.
    pub fn new(sections: IndexMap<String, Option<Options>>, source_path: Option<PathBuf>) -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            sections,
            source_path,
            working_dir,
            finalized: false,
            base_dir: OnceCell::new(),
            signature: OnceCell::new(),
            include_patterns: OnceCell::new(),
            exclude_patterns: OnceCell::new(),
            possibly_include_hidden: OnceCell::new(),
            language_version: OnceCell::new(),
            framework_version: OnceCell::new(),
            check_states: DashMap::new(),
        }
    }

    /// Creates an empty in-memory document
    pub fn empty() -> Self {
        Self::new(IndexMap::new(), None)
    }

    /// Overrides the directory relative paths are resolved against
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.working_dir = match std::env::current_dir() {
            Ok(cwd) => to_absolute(&dir, &cwd),
            Err(_) => dir,
        };
        self.reset_caches();
        self
    }

    /// Load a document from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content, Some(path.to_path_buf()))
    }

    /// Parse a document from YAML text
    ///
    /// The top level must be a mapping of section names to mappings (or to
    /// nothing at all, which marks an empty section).
    pub fn from_yaml_str(text: &str, source_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let root: serde_yaml::Value = serde_yaml::from_str(text)?;
        let mapping = match root {
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            serde_yaml::Value::Mapping(mapping) => mapping,
            other => {
                return Err(ConfigError::InvalidDocument(format!(
                    "top level must be a mapping, found {:?}",
                    other
                )));
            }
        };

        let mut sections = IndexMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = yaml_key(key)?;
            let body = match ConfigValue::from_yaml(value)? {
                ConfigValue::Null => None,
                ConfigValue::Map(options) => Some(options),
                other => {
                    return Err(ConfigError::InvalidDocument(format!(
                        "section {} must be a mapping, found '{}'",
                        name, other
                    )));
                }
            };
            sections.insert(name, body);
        }

        Ok(Self::new(sections, source_path))
    }

    /// Replaces (or adds) a section
    pub fn insert_section(&mut self, name: impl Into<String>, options: Option<Options>) {
        self.sections.insert(name.into(), options);
        self.reset_caches();
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Returns true if `name` is present without a body
    pub fn is_empty_section(&self, name: &str) -> bool {
        matches!(self.sections.get(name), Some(None))
    }

    /// Returns a section's options, `None` when absent or empty
    pub fn section(&self, name: &str) -> Option<&Options> {
        self.sections.get(name).and_then(Option::as_ref)
    }

    /// Options of the reserved global section
    pub fn for_all_checks(&self) -> &Options {
        self.section(GLOBAL_SECTION).unwrap_or(&EMPTY_OPTIONS)
    }

    /// Raw options configured for a check (empty when unconfigured)
    pub fn for_check(&self, name: &str) -> &Options {
        self.section(name).unwrap_or(&EMPTY_OPTIONS)
    }

    /// Raw options configured for a department
    pub fn for_department(&self, department: &str) -> &Options {
        self.for_check(department)
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Absolute form of the source path, if any
    pub fn absolute_source_path(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .map(|path| to_absolute(path, &self.working_dir))
    }

    /// Directory that relative path parameters are resolved against
    ///
    /// Dotfiles resolve against their own directory, except the one in the
    /// user's home directory. Everything else resolves against the working
    /// directory.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.get_or_init(|| {
            if let Some(path) = self.absolute_source_path() {
                let is_dotfile = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(DOTFILE_PREFIX));
                let is_home_dotfile =
                    dirs::home_dir().is_some_and(|home| path == home.join(DOTFILE));
                if is_dotfile
                    && !is_home_dotfile
                    && let Some(parent) = path.parent()
                {
                    return parent.to_path_buf();
                }
            }
            self.working_dir.clone()
        })
    }

    /// Directory of the source file, falling back to the base directory
    pub(crate) fn source_dir(&self) -> PathBuf {
        self.absolute_source_path()
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.base_dir().to_path_buf())
    }

    /// The source path shortened for messages
    pub fn friendly_path(&self) -> String {
        match self.absolute_source_path() {
            Some(path) => match path.strip_prefix(&self.working_dir) {
                Ok(relative) => relative.display().to_string(),
                Err(_) => path.display().to_string(),
            },
            None => "(in-memory)".to_string(),
        }
    }

    /// Returns true if the document was loaded from inside `shipped_dir`
    pub fn is_internal(&self, shipped_dir: &Path) -> bool {
        self.absolute_source_path()
            .is_some_and(|path| path.starts_with(shipped_dir))
    }

    /// Stable content hash of all sections
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            let rendered = serde_json::to_string(&self.sections).unwrap_or_default();
            hex::encode(Sha256::digest(rendered.as_bytes()))
        })
    }

    /// Normalizes, validates and absolutizes the document
    ///
    /// Runs at most once; later calls return no diagnostics and leave the
    /// document unchanged.
    pub fn finalize(&mut self, validator: &Validator<'_>) -> Result<Vec<Diagnostic>, ConfigError> {
        if self.finalized {
            return Ok(Vec::new());
        }

        let mut diagnostics = self.rename_deprecated_keys();
        diagnostics.extend(validator.validate(self)?);
        self.make_excludes_absolute();
        self.finalized = true;

        tracing::debug!(
            path = %self.friendly_path(),
            warnings = diagnostics.len(),
            "finalized configuration"
        );
        Ok(diagnostics)
    }

    /// Moves `Includes`/`Excludes` in the global section to their singular keys
    fn rename_deprecated_keys(&mut self) -> Vec<Diagnostic> {
        let friendly = self.friendly_path();
        let location = self.source_path.clone();
        let mut diagnostics = Vec::new();

        if let Some(Some(global)) = self.sections.get_mut(GLOBAL_SECTION) {
            for key in DEPRECATED_PLURAL_KEYS {
                let plural = format!("{}s", key);
                if let Some(value) = global.shift_remove(&plural) {
                    global.insert(key.to_string(), value);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::Deprecation,
                        format!(
                            "{} - {}/{} was renamed to {}/{}",
                            friendly, GLOBAL_SECTION, plural, GLOBAL_SECTION, key
                        ),
                        location.clone(),
                    ));
                }
            }
        }

        if !diagnostics.is_empty() {
            self.reset_caches();
        }
        diagnostics
    }

    /// Resolves relative `Exclude` entries of every section against the base directory
    fn make_excludes_absolute(&mut self) {
        let base_dir = self.base_dir().to_path_buf();

        for options in self.sections.values_mut().flatten() {
            let items = match options.get_mut("Exclude") {
                Some(ConfigValue::List(items)) => items.as_mut_slice(),
                Some(single) => std::slice::from_mut(single),
                None => continue,
            };
            for item in items {
                if let ConfigValue::String(pattern) = item
                    && !is_absolute(pattern)
                {
                    *pattern = to_absolute_string(pattern, &base_dir);
                }
            }
        }

        self.reset_caches();
    }

    /// Drops every memoized value derived from the sections
    pub(crate) fn reset_caches(&mut self) {
        self.base_dir = OnceCell::new();
        self.signature = OnceCell::new();
        self.include_patterns = OnceCell::new();
        self.exclude_patterns = OnceCell::new();
        self.possibly_include_hidden = OnceCell::new();
        self.language_version = OnceCell::new();
        self.framework_version = OnceCell::new();
        self.check_states.clear();
    }

    /// Returns the global section, creating it if needed
    pub(crate) fn global_section_mut(&mut self) -> &mut Options {
        self.sections
            .entry(GLOBAL_SECTION.to_string())
            .or_insert(None)
            .get_or_insert_with(Options::new)
    }

    /// Builds a pattern list from an option value
    pub(crate) fn patterns_from(value: Option<&ConfigValue>) -> Vec<Pattern> {
        match value {
            Some(ConfigValue::List(items)) => items.iter().filter_map(Pattern::from_value).collect(),
            Some(single) => Pattern::from_value(single).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::empty()
    }
}
