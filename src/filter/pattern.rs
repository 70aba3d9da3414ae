//! Pattern set: two ordered lists of compiled regexes.
//!
//! Patterns are compiled when they are added, so an invalid pattern never
//! reaches the filter. Matching is unanchored and case-sensitive.

use crate::error::{ExplorerError, Result};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which list a pattern lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Which {
    Include,
    Exclude,
}

impl fmt::Display for Which {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Which::Include => "include",
            Which::Exclude => "exclude",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(text: &str) -> Result<Self> {
        let regex = Regex::new(text).map_err(|source| ExplorerError::InvalidPattern {
            pattern: text.to_string(),
            source,
        })?;
        Ok(Self {
            text: text.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// "Contains a match" semantics, not a full match.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Pattern {}

/// Parameter infrastructure services every process exposes.
const PARAMETER_SERVICES: [&str; 6] = [
    "describe_parameters",
    "get_parameter_types",
    "get_parameters",
    "list_parameters",
    "set_parameters",
    "set_parameters_atomically",
];

const PARAMETER_TOPICS: [&str; 1] = ["parameter_events"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude patterns hiding the parameter services and the
    /// `parameter_events` topic.
    pub fn parameter_services() -> Self {
        let mut set = Self::new();
        for name in PARAMETER_SERVICES.iter().chain(PARAMETER_TOPICS.iter()) {
            // Anchored on the last path segment so `/x/get_parameters_cache` survives.
            let text = format!("/{}$", name);
            if let Ok(pattern) = Pattern::new(&text) {
                set.exclude.push(pattern);
            }
        }
        set
    }

    pub fn patterns(&self, which: Which) -> &[Pattern] {
        match which {
            Which::Include => &self.include,
            Which::Exclude => &self.exclude,
        }
    }

    pub fn include(&self) -> &[Pattern] {
        &self.include
    }

    pub fn exclude(&self) -> &[Pattern] {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    fn list_mut(&mut self, which: Which) -> &mut Vec<Pattern> {
        match which {
            Which::Include => &mut self.include,
            Which::Exclude => &mut self.exclude,
        }
    }

    /// Compile and append a pattern. Returns `Ok(false)` if the same text is
    /// already in that list. On error the set is unchanged.
    pub fn add(&mut self, which: Which, text: &str) -> Result<bool> {
        let pattern = Pattern::new(text)?;
        let list = self.list_mut(which);
        if list.contains(&pattern) {
            return Ok(false);
        }
        list.push(pattern);
        Ok(true)
    }

    /// Remove a pattern by its text. Returns whether anything was removed.
    pub fn remove(&mut self, which: Which, text: &str) -> bool {
        let list = self.list_mut(which);
        let before = list.len();
        list.retain(|p| p.as_str() != text);
        list.len() != before
    }

    /// Pick-to-filter: the fully-qualified name itself becomes the pattern.
    /// A literal name is a regex matching itself, so this is plain `add`.
    pub fn add_from_entity(&mut self, which: Which, entity_name: &str) -> Result<bool> {
        self.add(which, entity_name)
    }

    /// Append every pattern of `other` not already present.
    pub fn merge(&mut self, other: &PatternSet) {
        for which in [Which::Include, Which::Exclude] {
            for pattern in other.patterns(which) {
                let list = self.list_mut(which);
                if !list.contains(pattern) {
                    list.push(pattern.clone());
                }
            }
        }
    }
}
