//! Glob and regex path matching plus lexical path helpers
//!
//! Nothing here touches the file system.

use crate::config::value::{ConfigValue, RegexPattern};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf};

/// A path pattern from an `Include` or `Exclude` list
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Shell-style glob anchored to the whole path
    ///
    /// `matcher` is `None` when the source is not a valid glob; such a
    /// pattern only matches a path equal to its source. `dot_segments`
    /// holds the source segments that start with `.`; only those may match
    /// a hidden path component.
    Glob {
        source: String,
        matcher: Option<GlobMatcher>,
        dot_segments: Vec<GlobMatcher>,
    },
    /// Regular expression with find semantics
    Regex(RegexPattern),
}

impl Pattern {
    /// Compiles a glob pattern
    ///
    /// `*` and `?` never cross a `/`; `**` spans directories; character
    /// classes and `{a,b}` alternation are supported. Matching is
    /// case-sensitive. Wildcards never match a leading `.` of a path
    /// component: a hidden component must be matched by a pattern segment
    /// that itself starts with `.`.
    pub fn glob(source: impl Into<String>) -> Self {
        let source = source.into();
        let matcher = match compile_glob(&source) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                tracing::debug!(pattern = %source, error = %e, "treating invalid glob as a literal path");
                None
            }
        };
        let dot_segments = source
            .split('/')
            .filter(|segment| is_hidden_component(segment))
            .filter_map(|segment| compile_glob(segment).ok())
            .collect();
        Pattern::Glob {
            source,
            matcher,
            dot_segments,
        }
    }

    /// Builds a pattern from a string or regex value
    pub fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::String(source) => Some(Pattern::glob(source.as_str())),
            ConfigValue::Regex(re) => Some(Pattern::Regex(re.clone())),
            _ => None,
        }
    }

    /// Returns true if the pattern matches `path`
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Glob {
                source,
                matcher,
                dot_segments,
            } => {
                source == path
                    || (matcher.as_ref().is_some_and(|m| m.is_match(path))
                        && path
                            .split('/')
                            .filter(|component| is_hidden_component(component))
                            .all(|component| dot_segments.iter().any(|s| s.is_match(component))))
            }
            Pattern::Regex(re) => re.is_match(path),
        }
    }

    /// Conservative guess whether the pattern could select a hidden path
    pub fn could_match_hidden(&self) -> bool {
        match self {
            Pattern::Glob { source, .. } => source.starts_with('.') || source.contains("/."),
            Pattern::Regex(_) => true,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }

    /// Returns the pattern source text
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Glob { source, .. } => source,
            Pattern::Regex(re) => re.as_str(),
        }
    }
}

fn compile_glob(source: &str) -> Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(source)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
}

/// A component such as `.git`; `.` and `..` are not hidden
fn is_hidden_component(component: &str) -> bool {
    component.starts_with('.') && component != "." && component != ".."
}

/// Returns true if `path` is absolute
pub fn is_absolute(path: &str) -> bool {
    Path::new(path).is_absolute()
}

/// Joins `path` onto `base_dir` unless it is already absolute, then normalizes
pub fn to_absolute(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_dir.join(path))
    }
}

/// String form of [`to_absolute`]
pub fn to_absolute_string(path: &str, base_dir: &Path) -> String {
    path_str(&to_absolute(Path::new(path), base_dir))
}

/// Resolves `.` and `..` components without consulting the file system
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            Component::Normal(part) => normalized.push(part),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Expresses `path` relative to `base_dir`
///
/// Both paths are normalized first. A path outside `base_dir` is expressed
/// with leading `..` components.
pub fn relative_to(path: &Path, base_dir: &Path) -> PathBuf {
    let path = normalize(path);
    let base_dir = normalize(base_dir);

    if let Ok(stripped) = path.strip_prefix(&base_dir) {
        return if stripped.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            stripped.to_path_buf()
        };
    }

    let path_parts: Vec<_> = path.components().collect();
    let base_parts: Vec<_> = base_dir.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

/// Lossy string form of a path used for pattern matching
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_double_star() {
        let pattern = Pattern::glob("**/*.rb");
        assert!(pattern.matches("foo.rb"));
        assert!(pattern.matches("lib/deep/foo.rb"));
        assert!(pattern.matches("/abs/lib/foo.rb"));
        assert!(!pattern.matches("lib/foo.rbx"));
    }

    #[test]
    fn test_glob_single_star_stays_in_segment() {
        let pattern = Pattern::glob("lib/*.rb");
        assert!(pattern.matches("lib/foo.rb"));
        assert!(!pattern.matches("lib/sub/foo.rb"));
    }

    #[test]
    fn test_glob_question_class_and_braces() {
        assert!(Pattern::glob("spec/?_spec.rb").matches("spec/a_spec.rb"));
        assert!(!Pattern::glob("spec/?_spec.rb").matches("spec/ab_spec.rb"));
        assert!(Pattern::glob("[ab]in/*").matches("bin/setup"));
        assert!(!Pattern::glob("[ab]in/*").matches("cin/setup"));
        let braces = Pattern::glob("**/*.{rb,rake}");
        assert!(braces.matches("lib/tasks/db.rake"));
        assert!(braces.matches("app.rb"));
        assert!(!braces.matches("app.py"));
    }

    #[test]
    fn test_glob_is_case_sensitive() {
        assert!(!Pattern::glob("**/Gemfile").matches("gemfile"));
        assert!(Pattern::glob("**/Gemfile").matches("Gemfile"));
    }

    #[test]
    fn test_invalid_glob_matches_literally() {
        let pattern = Pattern::glob("[invalid");
        assert!(pattern.matches("[invalid"));
        assert!(!pattern.matches("i"));
    }

    #[test]
    fn test_wildcards_skip_hidden_components_at_any_depth() {
        let pattern = Pattern::glob("**/*.rb");
        assert!(!pattern.matches(".git/x.rb"));
        assert!(!pattern.matches("lib/.git/hooks/x.rb"));
        assert!(!pattern.matches("lib/.hidden.rb"));
        assert!(pattern.matches("../lib/x.rb"));

        let dotted = Pattern::glob("**/.git/**/*.rb");
        assert!(dotted.matches("lib/.git/hooks/x.rb"));
        assert!(!dotted.matches("lib/.git/.cache/x.rb"));

        let any_dot_dir = Pattern::glob(".*/*.rb");
        assert!(any_dot_dir.matches(".github/x.rb"));
    }

    #[test]
    fn test_regex_find_semantics() {
        let pattern = Pattern::Regex(RegexPattern::new(r"_spec\.rb").unwrap());
        assert!(pattern.matches("spec/models/user_spec.rb"));
        assert!(!pattern.matches("lib/user.rb"));
        assert!(pattern.is_regex());
    }

    #[test]
    fn test_could_match_hidden() {
        assert!(Pattern::glob(".rubocop.yml").could_match_hidden());
        assert!(Pattern::glob("**/.hidden/*").could_match_hidden());
        assert!(!Pattern::glob("**/*.rb").could_match_hidden());
        assert!(Pattern::Regex(RegexPattern::new("x").unwrap()).could_match_hidden());
    }

    #[test]
    fn test_from_value() {
        assert!(Pattern::from_value(&ConfigValue::string("a/**")).is_some());
        assert!(Pattern::from_value(&ConfigValue::Integer(3)).is_none());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_to_absolute() {
        assert_eq!(
            to_absolute(Path::new("vendor/**"), Path::new("/project")),
            PathBuf::from("/project/vendor/**")
        );
        assert_eq!(
            to_absolute(Path::new("../shared/x.rb"), Path::new("/project/sub")),
            PathBuf::from("/project/shared/x.rb")
        );
        assert_eq!(
            to_absolute(Path::new("/etc/x"), Path::new("/project")),
            PathBuf::from("/etc/x")
        );
        assert!(is_absolute("/etc/x"));
        assert!(!is_absolute("etc/x"));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/project/lib/a.rb"), Path::new("/project")),
            PathBuf::from("lib/a.rb")
        );
        assert_eq!(
            relative_to(Path::new("/other/a.rb"), Path::new("/project/sub")),
            PathBuf::from("../../other/a.rb")
        );
        assert_eq!(
            relative_to(Path::new("/project"), Path::new("/project")),
            PathBuf::from(".")
        );
    }
}
