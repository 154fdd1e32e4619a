#![forbid(unsafe_code)]

//! Check registry seam
//!
//! The registry knows which check names exist. Validation consults it to
//! avoid warning about sections that configure custom checks loaded from
//! outside the shipped defaults.

use crate::config::document::ConfigDocument;
use crate::types::{CheckName, GLOBAL_SECTION};
use std::collections::HashSet;
use std::fmt;

/// Answers questions about known check names
pub trait CheckRegistry: Send + Sync {
    /// Returns true if `name` is a check the tool ships or has loaded
    fn is_known_check(&self, name: &str) -> bool;

    /// Returns true if `name` matches a custom check the registry holds
    fn is_custom_check_matching(&self, name: &str) -> bool;
}

type CustomMatcher = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Registry backed by fixed name lists
///
/// Custom matching defaults to "the name equals a custom check or its
/// department" and can be replaced with [`StaticCheckRegistry::with_custom_matcher`].
pub struct StaticCheckRegistry {
    known: HashSet<String>,
    custom: HashSet<String>,
    custom_matcher: Option<CustomMatcher>,
}

impl StaticCheckRegistry {
    /// Create a registry from known check names
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            custom: HashSet::new(),
            custom_matcher: None,
        }
    }

    /// Create a registry from the qualified section names of a reference document
    pub fn from_reference(reference: &ConfigDocument) -> Self {
        Self::new(
            reference
                .section_names()
                .filter(|name| *name != GLOBAL_SECTION && !CheckName::new(*name).is_department()),
        )
    }

    /// Register custom check names
    pub fn with_custom_checks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom.extend(names.into_iter().map(Into::into));
        self
    }

    /// Replace the custom-name matching rule
    pub fn with_custom_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom_matcher = Some(Box::new(matcher));
        self
    }

    /// Get the number of known checks
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl CheckRegistry for StaticCheckRegistry {
    fn is_known_check(&self, name: &str) -> bool {
        self.known.contains(name) || self.custom.contains(name)
    }

    fn is_custom_check_matching(&self, name: &str) -> bool {
        if let Some(matcher) = &self.custom_matcher {
            return matcher(name);
        }
        self.custom
            .iter()
            .any(|custom| custom == name || CheckName::new(custom.as_str()).department() == name)
    }
}

impl fmt::Debug for StaticCheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCheckRegistry")
            .field("known", &self.known.len())
            .field("custom", &self.custom)
            .field("custom_matcher", &self.custom_matcher.is_some())
            .finish()
    }
}
