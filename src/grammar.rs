//! Grammar registry: maps file extensions to tree-sitter grammars.
//!
//! The registry is built once at startup from an `EngineConfig` and then
//! only read. Each grammar is validated by binding it to a parser; a grammar
//! that fails validation is recorded as unavailable and every later lookup
//! for it resolves to `UnsupportedLanguage`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::AnalysisError;

/// Languages with a bundled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Go,
    ];

    /// Returns the language identifier (e.g., "python", "go").
    pub fn id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
        }
    }

    /// Canonical file extension, with the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::JavaScript => ".js",
            Language::TypeScript => ".ts",
            Language::Java => ".java",
            Language::Go => ".go",
        }
    }

    /// Resolve a file extension. Accepts `.py`, `py` and `PY`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.extension().trim_start_matches('.') == ext)
    }

    /// Resolve either an extension or a language id.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lowered = tag.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.id() == lowered)
            .or_else(|| Self::from_extension(&lowered))
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A validated grammar for one language.
#[derive(Clone)]
pub struct Grammar {
    language: Language,
    ts_language: tree_sitter::Language,
}

impl Grammar {
    /// Bind the grammar to a throwaway parser to prove it loads.
    fn load(language: Language) -> Result<Self, String> {
        let ts_language = language.tree_sitter_language();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&ts_language).map_err(|e| e.to_string())?;
        if parser.parse("", None).is_none() {
            return Err("grammar produced no tree for empty input".to_string());
        }
        Ok(Self {
            language,
            ts_language,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn ts_language(&self) -> &tree_sitter::Language {
        &self.ts_language
    }

    /// Create a fresh parser. `tree_sitter::Parser` is not `Sync`, so each
    /// analysis gets its own.
    pub fn new_parser(&self) -> Result<tree_sitter::Parser, AnalysisError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.ts_language)
            .map_err(|e| AnalysisError::ParseFailure {
                language: self.language.id(),
                reason: e.to_string(),
            })?;
        Ok(parser)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("language", &self.language)
            .finish()
    }
}

/// Load state of one language's grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarStatus {
    Ready,
    Disabled,
    Failed(String),
}

/// Read-only mapping from languages to loaded grammars.
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    grammars: BTreeMap<Language, Grammar>,
    unavailable: BTreeMap<Language, GrammarStatus>,
}

impl GrammarRegistry {
    /// Load every language enabled by `config`.
    pub fn load(config: &EngineConfig) -> Self {
        Self::load_with(config, Grammar::load)
    }

    /// Load every bundled language.
    pub fn with_defaults() -> Self {
        Self::load(&EngineConfig::default())
    }

    fn load_with<F>(config: &EngineConfig, loader: F) -> Self
    where
        F: Fn(Language) -> Result<Grammar, String>,
    {
        let mut grammars = BTreeMap::new();
        let mut unavailable = BTreeMap::new();

        for language in Language::ALL {
            if !config.enables(language) {
                debug!(language = language.id(), "grammar disabled by configuration");
                unavailable.insert(language, GrammarStatus::Disabled);
                continue;
            }

            match loader(language) {
                Ok(grammar) => {
                    debug!(language = language.id(), "grammar loaded");
                    grammars.insert(language, grammar);
                }
                Err(reason) => {
                    warn!(
                        language = language.id(),
                        %reason,
                        "failed to load grammar; language marked unsupported"
                    );
                    unavailable.insert(language, GrammarStatus::Failed(reason));
                }
            }
        }

        Self {
            grammars,
            unavailable,
        }
    }

    /// Resolve an extension to its grammar.
    pub fn resolve(&self, extension: &str) -> Result<&Grammar, AnalysisError> {
        Language::from_extension(extension)
            .and_then(|language| self.grammars.get(&language))
            .ok_or_else(|| AnalysisError::UnsupportedLanguage(extension.to_string()))
    }

    /// Load state of a language.
    pub fn status(&self, language: Language) -> GrammarStatus {
        if self.grammars.contains_key(&language) {
            return GrammarStatus::Ready;
        }
        self.unavailable
            .get(&language)
            .cloned()
            .unwrap_or(GrammarStatus::Disabled)
    }

    /// Extensions that resolve to a loaded grammar, sorted.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self.grammars.keys().map(|l| l.extension()).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
