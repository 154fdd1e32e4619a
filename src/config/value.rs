//! Closed value type for configuration options
//!
//! Parsed YAML trees are converted into [`ConfigValue`] at the document
//! boundary so the rest of the crate never sees an unsupported shape.

use crate::error::ConfigError;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Option name to value mapping of a single section
pub type Options = IndexMap<String, ConfigValue>;

/// YAML tags that mark a regular expression value
const REGEX_TAGS: [&str; 2] = ["ruby/regexp", "regexp"];

/// A compiled regular expression that remembers its source text
///
/// Two patterns are equal when their source text is equal.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    regex: Regex,
}

impl RegexPattern {
    /// Compiles a bare regular expression
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(source)
            .map_err(|e| ConfigError::InvalidDocument(format!("invalid regexp /{}/: {}", source, e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Parses a literal such as `/vendor\//i`
    ///
    /// Text without surrounding slashes is compiled as-is. Supported flags
    /// are `i` (case-insensitive), `m` (dot matches newline) and `x`
    /// (extended).
    pub fn from_literal(literal: &str) -> Result<Self, ConfigError> {
        let trimmed = literal.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return Self::new(trimmed);
        };
        let Some(end) = body.rfind('/') else {
            return Self::new(trimmed);
        };
        let (source, flags) = (&body[..end], &body[end + 1..]);

        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(ConfigError::InvalidDocument(format!(
                        "unsupported regexp flag '{}' in {}",
                        other, literal
                    )));
                }
            };
        }
        let regex = builder.build().map_err(|e| {
            ConfigError::InvalidDocument(format!("invalid regexp {}: {}", literal, e))
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the expression finds a match anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// A single configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Regex(RegexPattern),
    List(Vec<ConfigValue>),
    Map(Options),
}

impl ConfigValue {
    pub fn string(value: impl Into<String>) -> Self {
        ConfigValue::String(value.into())
    }

    /// Builds a list of string values
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(values.into_iter().map(ConfigValue::string).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Options> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&RegexPattern> {
        match self {
            ConfigValue::Regex(re) => Some(re),
            _ => None,
        }
    }

    /// Everything except `Null` and `false` counts as true
    pub fn is_truthy(&self) -> bool {
        !matches!(self, ConfigValue::Null | ConfigValue::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Converts a parsed YAML value
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        use serde_yaml::Value;

        match value {
            Value::Null => Ok(ConfigValue::Null),
            Value::Bool(b) => Ok(ConfigValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ConfigValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ConfigValue::Float(f))
                } else {
                    Err(ConfigError::InvalidDocument(format!(
                        "number {} is out of range",
                        n
                    )))
                }
            }
            Value::String(s) => Ok(ConfigValue::String(s)),
            Value::Sequence(items) => items
                .into_iter()
                .map(ConfigValue::from_yaml)
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::List),
            Value::Mapping(mapping) => {
                let mut options = Options::with_capacity(mapping.len());
                for (key, value) in mapping {
                    options.insert(yaml_key(key)?, ConfigValue::from_yaml(value)?);
                }
                Ok(ConfigValue::Map(options))
            }
            Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                let tag = tag.trim_start_matches('!');
                if !REGEX_TAGS.contains(&tag) {
                    return Err(ConfigError::InvalidDocument(format!(
                        "unsupported tag !{}",
                        tag
                    )));
                }
                match tagged.value {
                    Value::String(literal) => {
                        Ok(ConfigValue::Regex(RegexPattern::from_literal(&literal)?))
                    }
                    _ => Err(ConfigError::InvalidDocument(format!(
                        "!{} expects a string",
                        tag
                    ))),
                }
            }
        }
    }
}

/// Mapping keys are strings; scalar keys are stringified
pub(crate) fn yaml_key(key: serde_yaml::Value) -> Result<String, ConfigError> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ConfigError::InvalidDocument(format!(
            "unsupported mapping key {:?}",
            other
        ))),
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str(""),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Regex(re) => write!(f, "{}", re),
            ConfigValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ConfigValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(x) => serializer.serialize_f64(*x),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Regex(re) => serializer.serialize_str(&re.to_string()),
            ConfigValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<RegexPattern> for ConfigValue {
    fn from(value: RegexPattern) -> Self {
        ConfigValue::Regex(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigValue {
        ConfigValue::from_yaml(serde_yaml::from_str(text).unwrap()).unwrap()
    }

    #[test]
    fn test_scalars_from_yaml() {
        assert_eq!(yaml("true"), ConfigValue::Bool(true));
        assert_eq!(yaml("42"), ConfigValue::Integer(42));
        assert_eq!(yaml("2.5"), ConfigValue::Float(2.5));
        assert_eq!(yaml("single_quotes"), ConfigValue::string("single_quotes"));
        assert_eq!(yaml("~"), ConfigValue::Null);
    }

    #[test]
    fn test_nested_values_from_yaml() {
        let value = yaml("PreferredMethods:\n  collect: map\n  inject: reduce\nList: [a, b]\n");
        let map = value.as_map().unwrap();
        let methods = map["PreferredMethods"].as_map().unwrap();
        assert_eq!(methods["collect"], ConfigValue::string("map"));
        assert_eq!(map["List"], ConfigValue::strings(["a", "b"]));
    }

    #[test]
    fn test_regex_tag_from_yaml() {
        let value = yaml("!ruby/regexp /vendor\\/.*\\.rb$/i");
        let re = value.as_regex().unwrap();
        assert_eq!(re.as_str(), "vendor\\/.*\\.rb$");
        assert!(re.is_match("VENDOR/gem/Foo.RB"));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let raw: serde_yaml::Value = serde_yaml::from_str("!ruby/object:Foo bar").unwrap();
        assert!(ConfigValue::from_yaml(raw).is_err());
    }

    #[test]
    fn test_regex_literal_without_slashes() {
        let re = RegexPattern::from_literal("^spec/").unwrap();
        assert_eq!(re.as_str(), "^spec/");
        assert!(re.is_match("spec/foo_spec.rb"));
        assert!(!re.is_match("lib/spec/foo.rb"));
    }

    #[test]
    fn test_regex_literal_bad_flag() {
        assert!(RegexPattern::from_literal("/foo/q").is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!ConfigValue::Null.is_truthy());
        assert!(!ConfigValue::Bool(false).is_truthy());
        assert!(ConfigValue::string("pending").is_truthy());
        assert!(ConfigValue::Integer(0).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigValue::strings(["a", "b"]).to_string(), "[a, b]");
        assert_eq!(ConfigValue::Float(2.5).to_string(), "2.5");
        let re = RegexPattern::new("foo").unwrap();
        assert_eq!(ConfigValue::Regex(re).to_string(), "/foo/");
    }

    #[test]
    fn test_serialize_json() {
        let mut map = Options::new();
        map.insert("Enabled".to_string(), ConfigValue::Bool(false));
        map.insert(
            "Exclude".to_string(),
            ConfigValue::List(vec![
                ConfigValue::string("vendor/**"),
                ConfigValue::Regex(RegexPattern::new("tmp").unwrap()),
            ]),
        );
        let json = serde_json::to_string(&ConfigValue::Map(map)).unwrap();
        assert_eq!(json, r#"{"Enabled":false,"Exclude":["vendor/**","/tmp/"]}"#);
    }
}
