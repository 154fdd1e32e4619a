#![forbid(unsafe_code)]

//! Run-level and per-check file scoping
//!
//! A file takes part in the run when an `AllCops/Include` pattern matches
//! it and no `AllCops/Exclude` pattern does. Each check may narrow that
//! further with its own `Include` and `Exclude` lists.

use crate::config::document::ConfigDocument;
use crate::config::value::ConfigValue;
use crate::scope::matcher::{Pattern, is_absolute, path_str, relative_to, to_absolute, to_absolute_string};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

impl ConfigDocument {
    /// Patterns from `AllCops/Include`
    pub fn patterns_to_include(&self) -> &[Pattern] {
        self.include_patterns
            .get_or_init(|| Self::patterns_from(self.for_all_checks().get("Include")))
    }

    /// Patterns from `AllCops/Exclude`
    pub fn patterns_to_exclude(&self) -> &[Pattern] {
        self.exclude_patterns
            .get_or_init(|| Self::patterns_from(self.for_all_checks().get("Exclude")))
    }

    /// Whether any include pattern could plausibly select a hidden path
    ///
    /// This over-approximates; it only decides whether the cheap rejection
    /// of hidden paths in [`ConfigDocument::in_scope`] is allowed.
    pub fn possibly_include_hidden(&self) -> bool {
        *self.possibly_include_hidden.get_or_init(|| {
            self.patterns_to_include()
                .iter()
                .any(Pattern::could_match_hidden)
        })
    }

    /// Path of `file` relative to the base directory
    pub fn path_relative_to_config(&self, file: impl AsRef<Path>) -> PathBuf {
        let absolute = to_absolute(file.as_ref(), &self.working_dir);
        relative_to(&absolute, self.base_dir())
    }

    /// Returns true if `file` is selected by the include patterns
    pub fn in_scope(&self, file: impl AsRef<Path>) -> bool {
        let absolute = to_absolute(file.as_ref(), &self.working_dir);
        let relative = path_str(&relative_to(&absolute, self.base_dir()));

        let is_hidden = relative.starts_with('.') && !relative.starts_with("..");
        if is_hidden && !self.possibly_include_hidden() {
            return false;
        }

        let absolute = path_str(&absolute);
        self.patterns_to_include()
            .iter()
            .any(|pattern| pattern.matches(&relative) || pattern.matches(&absolute))
    }

    /// Returns true if the absolute form of `file` matches an exclude pattern
    pub fn excluded(&self, file: impl AsRef<Path>) -> bool {
        let absolute = path_str(&to_absolute(file.as_ref(), &self.working_dir));
        self.patterns_to_exclude()
            .iter()
            .any(|pattern| pattern.matches(&absolute))
    }

    /// Appends the global exclude patterns of `ancestor` to this document
    ///
    /// Relative string patterns are resolved against the ancestor's own
    /// directory. Patterns already present are skipped.
    pub fn inherit_excludes_from(&mut self, ancestor: &ConfigDocument) {
        let Some(excludes) = ancestor.for_all_checks().get("Exclude") else {
            return;
        };
        let items = match excludes {
            ConfigValue::List(items) => items.clone(),
            single => vec![single.clone()],
        };
        if items.is_empty() {
            return;
        }

        let ancestor_dir = ancestor.source_dir();
        let resolved: Vec<ConfigValue> = items
            .into_iter()
            .map(|item| match item {
                ConfigValue::String(pattern) if !is_absolute(&pattern) => {
                    ConfigValue::String(to_absolute_string(&pattern, &ancestor_dir))
                }
                other => other,
            })
            .collect();

        let global = self.global_section_mut();
        let current = global
            .entry("Exclude".to_string())
            .or_insert_with(|| ConfigValue::List(Vec::new()));
        if !matches!(current, ConfigValue::List(_)) {
            let single = std::mem::replace(current, ConfigValue::Null);
            *current = ConfigValue::List(vec![single]);
        }
        if let ConfigValue::List(list) = current {
            for pattern in resolved {
                if !list.contains(&pattern) {
                    list.push(pattern);
                }
            }
        }

        tracing::debug!(
            from = %ancestor.friendly_path(),
            into = %self.friendly_path(),
            "inherited exclude patterns"
        );
        self.reset_caches();
    }

    /// Returns true if `check` is enabled and its own patterns select `file`
    ///
    /// A check without `Include` applies to every file; a check without
    /// `Exclude` excludes nothing.
    pub fn check_applies_to(&self, check: &str, file: impl AsRef<Path>) -> bool {
        let state = self.state_of(check);
        if !state.enabled() {
            return false;
        }

        let absolute = to_absolute(file.as_ref(), &self.working_dir);
        let relative = path_str(&relative_to(&absolute, self.base_dir()));
        let absolute = path_str(&absolute);
        let matches_any = |patterns: &[Pattern]| {
            patterns
                .iter()
                .any(|pattern| pattern.matches(&absolute) || pattern.matches(&relative))
        };

        let included = state.include_patterns().is_none_or(matches_any);
        let excluded = state.exclude_patterns().is_some_and(matches_any);
        included && !excluded
    }

    /// Filters `files` down to those in scope and not excluded
    ///
    /// Runs in parallel; the input order is preserved.
    pub fn files_to_inspect(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        files
            .par_iter()
            .filter(|file| self.in_scope(file) && !self.excluded(file))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::document::ConfigDocument;
    use std::path::{Path, PathBuf};

    fn doc(yaml: &str) -> ConfigDocument {
        ConfigDocument::from_yaml_str(yaml, Some(PathBuf::from("/project/.rubocop.yml")))
            .unwrap()
            .with_working_dir("/project")
    }

    #[test]
    fn test_in_scope_relative_and_absolute() {
        let doc = doc("AllCops:\n  Include:\n    - 'lib/**/*.rb'\n    - /elsewhere/*.rb\n");
        assert!(doc.in_scope("lib/a/b.rb"));
        assert!(doc.in_scope("/project/lib/x.rb"));
        assert!(doc.in_scope("/elsewhere/y.rb"));
        assert!(!doc.in_scope("spec/a_spec.rb"));
    }

    #[test]
    fn test_no_include_patterns_means_nothing_in_scope() {
        let doc = doc("AllCops:\n  TargetRubyVersion: 2.5\n");
        assert!(!doc.in_scope("lib/a.rb"));
    }

    #[test]
    fn test_hidden_paths_rejected_cheaply() {
        let doc = doc("AllCops:\n  Include:\n    - '**/*.rb'\n");
        assert!(!doc.possibly_include_hidden());
        assert!(!doc.in_scope(".hidden/foo.rb"));
        assert!(doc.in_scope("visible/foo.rb"));
    }

    #[test]
    fn test_nested_hidden_directories_are_out_of_scope() {
        let doc = doc("AllCops:\n  Include:\n    - '**/*.rb'\n");
        assert!(!doc.in_scope(".git/x.rb"));
        assert!(!doc.in_scope("lib/.git/hooks/x.rb"));
        assert!(!doc.in_scope("/project/lib/.git/hooks/x.rb"));
        assert!(doc.in_scope("lib/git/hooks/x.rb"));

        let dotted = self::doc("AllCops:\n  Include:\n    - '**/*.rb'\n    - '**/.git/**/*.rb'\n");
        assert!(dotted.in_scope("lib/.git/hooks/x.rb"));
        assert!(dotted.in_scope(".git/x.rb"));
    }

    #[test]
    fn test_hidden_paths_allowed_by_dot_pattern() {
        let doc = doc("AllCops:\n  Include:\n    - '.hidden/**/*.rb'\n");
        assert!(doc.possibly_include_hidden());
        assert!(doc.in_scope(".hidden/foo.rb"));
    }

    #[test]
    fn test_parent_relative_path_is_not_hidden() {
        let doc = ConfigDocument::from_yaml_str(
            "AllCops:\n  Include:\n    - '**/*.rb'\n",
            Some(PathBuf::from("/project/sub/.rubocop.yml")),
        )
        .unwrap()
        .with_working_dir("/project");
        assert_eq!(
            doc.path_relative_to_config("/project/other/a.rb"),
            Path::new("../other/a.rb")
        );
        assert!(doc.in_scope("/project/other/a.rb"));
    }

    #[test]
    fn test_excluded_uses_absolute_path() {
        let doc = doc("AllCops:\n  Exclude:\n    - /project/vendor/**\n");
        assert!(doc.excluded("vendor/gem/foo.rb"));
        assert!(doc.excluded("/project/vendor/a.rb"));
        assert!(!doc.excluded("lib/a.rb"));
    }

    #[test]
    fn test_files_to_inspect_preserves_order() {
        let doc = doc("AllCops:\n  Include:\n    - '**/*.rb'\n  Exclude:\n    - /project/vendor/**\n");
        let files: Vec<PathBuf> = ["b.rb", "vendor/x.rb", "a.rb", "c.py", ".git/x.rb"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let selected = doc.files_to_inspect(&files);
        assert_eq!(selected, vec![PathBuf::from("b.rb"), PathBuf::from("a.rb")]);
    }

    #[test]
    fn test_check_applies_to_with_own_patterns() {
        let doc = doc(
            "Rails/Output:\n  Enabled: true\n  Include:\n    - app/**/*.rb\n  Exclude:\n    - app/legacy/**\n",
        );
        assert!(doc.check_applies_to("Rails/Output", "app/models/user.rb"));
        assert!(!doc.check_applies_to("Rails/Output", "app/legacy/old.rb"));
        assert!(!doc.check_applies_to("Rails/Output", "lib/tool.rb"));
    }

    #[test]
    fn test_disabled_check_applies_nowhere() {
        let doc = doc("Style/Foo:\n  Enabled: false\n");
        assert!(!doc.check_applies_to("Style/Foo", "lib/a.rb"));
        // no patterns at all: applies everywhere once enabled
        assert!(doc.check_applies_to("Style/Bar", "lib/a.rb"));
    }
}
