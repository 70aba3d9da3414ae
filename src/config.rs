//! Filter presets loaded from JSON.
//!
//! JSON shape:
//! {
//!   "include": ["/perception"],
//!   "exclude": ["rosout", "/tf"],
//!   "hide_parameter_services": true
//! }

use crate::error::Result;
use crate::filter::{PatternSet, Which};

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterPreset {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub hide_parameter_services: bool,
}

impl FilterPreset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read filter preset {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse filter preset {}", path.display()))
    }

    /// Compile into a pattern set. Fails on the first invalid pattern.
    pub fn to_pattern_set(&self) -> Result<PatternSet> {
        let mut set = if self.hide_parameter_services {
            PatternSet::parameter_services()
        } else {
            PatternSet::new()
        };
        for text in &self.include {
            set.add(Which::Include, text)?;
        }
        for text in &self.exclude {
            set.add(Which::Exclude, text)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn loads_preset_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "include": ["/perception"], "exclude": ["rosout"], "hide_parameter_services": true }}"#
        )
        .unwrap();

        let preset = FilterPreset::load(file.path()).unwrap();
        let set = preset.to_pattern_set().unwrap();
        let include: Vec<&str> = set.include().iter().map(|p| p.as_str()).collect();
        assert_eq!(include, vec!["/perception"]);
        // 7 parameter patterns plus the explicit one.
        assert_eq!(set.exclude().len(), 8);
        assert_eq!(set.exclude().last().map(|p| p.as_str()), Some("rosout"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "includes": ["/a"] }}"#).unwrap();
        assert!(FilterPreset::load(file.path()).is_err());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let preset = FilterPreset {
            exclude: vec!["[".to_string()],
            ..FilterPreset::default()
        };
        assert!(matches!(
            preset.to_pattern_set(),
            Err(ExplorerError::InvalidPattern { .. })
        ));
    }
}
