//! Engine configuration.
//!
//! Loaded once at startup from `patchlens.yaml` (or an explicit path) and
//! handed to `GrammarRegistry::load` and `Engine::new`. Every field has a
//! default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::grammar::Language;

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["patchlens.yaml", ".patchlens.yaml"];

/// How the generic cyclomatic fallback traverses the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclomaticTraversal {
    /// Only the direct children of the root are inspected.
    #[default]
    Shallow,
    /// Every descendant of the root is inspected.
    Recursive,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Enabled language tags: extensions (`py`, `.go`) or ids (`python`).
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub cyclomatic: CyclomaticTraversal,
    /// Use the radon-compatible Python estimators (default: true).
    #[serde(default)]
    pub precise_python: Option<bool>,
    /// Truncate the tree dump after this many bytes.
    #[serde(default)]
    pub max_ast_dump_bytes: Option<usize>,
    /// Glob patterns for paths skipped by directory analysis.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_languages() -> Vec<String> {
    Language::ALL.iter().map(|l| l.id().to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            cyclomatic: CyclomaticTraversal::default(),
            precise_python: None,
            max_ast_dump_bytes: None,
            excluded_paths: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse a config from YAML text. Empty text yields the defaults.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EngineConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Look for a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Whether `language` is enabled.
    pub fn enables(&self, language: Language) -> bool {
        self.languages
            .iter()
            .any(|tag| Language::from_tag(tag) == Some(language))
    }

    /// Returns whether the radon-compatible Python path is used (defaults to true).
    pub fn use_precise_python(&self) -> bool {
        self.precise_python.unwrap_or(true)
    }

    /// Check if a path should be excluded based on `excluded_paths` patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Validate a config.
pub fn validate(config: &EngineConfig) -> anyhow::Result<()> {
    for tag in &config.languages {
        if Language::from_tag(tag).is_none() {
            anyhow::bail!(
                "unknown language {:?} (expected one of: {})",
                tag,
                Language::ALL
                    .iter()
                    .map(|l| l.id())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    for pattern in &config.excluded_paths {
        if let Err(e) = globset::Glob::new(pattern) {
            anyhow::bail!("invalid excluded_paths pattern {:?}: {}", pattern, e);
        }
    }

    if config.max_ast_dump_bytes == Some(0) {
        anyhow::bail!("max_ast_dump_bytes must be greater than 0");
    }

    Ok(())
}
