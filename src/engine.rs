//! The analysis engine.
//!
//! `Engine::analyze` is a pure function of (source text, extension) to an
//! `AnalysisResult`. It never fails: every stage that cannot run is logged
//! and replaced by its degraded output.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{aggregate, AnalysisResult, BaseMetrics, Issue};
use crate::analysis::{extractor_for, walker, ParsedFile, Structure};
use crate::config::EngineConfig;
use crate::grammar::{GrammarRegistry, Language};
use crate::metrics::{self, python, HalsteadMetrics};

/// One file queued for batch analysis.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Extension used to pick the grammar, e.g. `.py`.
    pub extension: String,
    pub source: String,
    /// Externally produced findings to attach to this file's result.
    pub issues: Vec<Issue>,
}

impl SourceFile {
    /// Build from a path, taking the extension from it.
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            path,
            extension,
            source: source.into(),
            issues: Vec::new(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }
}

/// A batch result.
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Runs the full pipeline for one file at a time, or many in parallel.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: GrammarRegistry,
    config: EngineConfig,
}

impl Engine {
    pub fn new(registry: GrammarRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Load the grammars `config` enables and build an engine around them.
    pub fn from_config(config: EngineConfig) -> Self {
        let registry = GrammarRegistry::load(&config);
        Self::new(registry, config)
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one file with no external issues.
    pub fn analyze(&self, source: &str, extension: &str) -> AnalysisResult {
        self.analyze_with_issues(source, extension, Vec::new())
    }

    /// Analyze one file and attach `issues` to the result.
    pub fn analyze_with_issues(&self, source: &str, extension: &str, issues: Vec<Issue>) -> AnalysisResult {
        let grammar = match self.registry.resolve(extension) {
            Ok(grammar) => grammar,
            Err(err) => {
                warn!(%err, "skipping tree-based analysis");
                return aggregate(
                    BaseMetrics::unsupported(),
                    Structure::default(),
                    metrics::estimate_generic(source),
                    issues,
                );
            }
        };

        let language = grammar.language();
        let parsed = match walker::parse(source, grammar) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(%err, "falling back to text-only metrics");
                return aggregate(
                    BaseMetrics::parse_failure(&err),
                    Structure::default(),
                    metrics::estimate_generic(source),
                    issues,
                );
            }
        };

        let base = self.base_metrics(&parsed);
        let structure = match extractor_for(language).extract(&parsed) {
            Ok(structure) => structure,
            Err(err) => {
                warn!(language = language.id(), error = %err, "structure extraction failed");
                Structure::default()
            }
        };
        let halstead = self.halstead(&parsed, source);

        aggregate(base, structure, halstead, issues)
    }

    /// Analyze many files in parallel. Results are in input order.
    pub fn analyze_batch(&self, files: &[SourceFile]) -> Vec<FileAnalysis> {
        debug!(files = files.len(), "analyzing batch");
        files
            .par_iter()
            .map(|file| FileAnalysis {
                path: file.path.clone(),
                result: self.analyze_with_issues(&file.source, &file.extension, file.issues.clone()),
            })
            .collect()
    }

    fn precise_python(&self, parsed: &ParsedFile) -> bool {
        parsed.language == Language::Python && self.config.use_precise_python()
    }

    fn base_metrics(&self, parsed: &ParsedFile) -> BaseMetrics {
        let root = parsed.root();

        let cyclomatic_complexity = if self.precise_python(parsed) {
            python::cyclomatic_complexity(parsed).unwrap_or_else(|err| {
                warn!(%err, "using generic cyclomatic complexity");
                walker::cyclomatic_complexity(root, self.config.cyclomatic)
            })
        } else {
            walker::cyclomatic_complexity(root, self.config.cyclomatic)
        };

        BaseMetrics {
            cyclomatic_complexity,
            cognitive_complexity: walker::cognitive_complexity(root),
            ast_sexp: walker::tree_dump(parsed, self.config.max_ast_dump_bytes),
        }
    }

    fn halstead(&self, parsed: &ParsedFile, source: &str) -> HalsteadMetrics {
        if !self.precise_python(parsed) {
            return metrics::estimate_generic(source);
        }
        python::halstead(parsed).unwrap_or_else(|err| {
            warn!(%err, "using generic Halstead estimator");
            metrics::estimate_generic(source)
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::walker::AST_UNAVAILABLE;

    #[test]
    fn test_unsupported_language() {
        let engine = Engine::default();
        let result = engine.analyze("puts 'hi' if x", ".rb");

        assert_eq!(result.cyclomatic_complexity(), 0);
        assert_eq!(result.cognitive_complexity(), 0);
        assert_eq!(result.ast_sexp(), AST_UNAVAILABLE);
        assert!(result.function_signatures().is_empty());
        assert!(result.class_hierarchies().is_empty());
        assert!(result.module_dependencies().is_empty());
        assert!(result.halstead_metrics().length > 0.0);
    }

    #[test]
    fn test_disabled_language_degrades() {
        let config = EngineConfig {
            languages: vec!["go".to_string()],
            ..Default::default()
        };
        let engine = Engine::from_config(config);
        let result = engine.analyze("def f():\n    return 1\n", ".py");
        assert_eq!(result.ast_sexp(), AST_UNAVAILABLE);
    }

    #[test]
    fn test_python_precise_and_generic() {
        let source = "def f(x):\n    if x:\n        return 1\n    return 0\n";

        let precise = Engine::default().analyze(source, ".py");
        assert_eq!(precise.cyclomatic_complexity(), 2);

        let generic = Engine::from_config(EngineConfig {
            precise_python: Some(false),
            ..Default::default()
        })
        .analyze(source, ".py");
        // No branching statement is a direct child of the module.
        assert_eq!(generic.cyclomatic_complexity(), 0);
        assert_eq!(*generic.halstead_metrics(), metrics::estimate_generic(source));
        assert_ne!(precise.halstead_metrics(), generic.halstead_metrics());
    }

    #[test]
    fn test_python_syntax_error_falls_back() {
        let source = "if x:\n    pass\ndef broken(:\n";
        let result = Engine::default().analyze(source, ".py");

        assert_eq!(*result.halstead_metrics(), metrics::estimate_generic(source));
        // The tree is still dumped; only the estimators fall back.
        assert!(result.ast_sexp().starts_with("(module"));
    }

    #[test]
    fn test_issues_are_attached() {
        let issues = vec![Issue::new("eslint", "no-var").with_line(1)];
        let result = Engine::default().analyze_with_issues("var a = 1;\n", ".js", issues.clone());
        assert_eq!(result.issues(), issues.as_slice());
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let files = vec![
            SourceFile::new("b.go", "package b\n"),
            SourceFile::new("a.py", "import os\n"),
            SourceFile::new("notes.txt", "hello"),
        ];
        let results = Engine::default().analyze_batch(&files);

        let paths: Vec<_> = results.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("b.go"), PathBuf::from("a.py"), PathBuf::from("notes.txt")]);
        assert_eq!(results[1].result.module_dependencies(), &["os"]);
        assert_eq!(results[2].result.ast_sexp(), AST_UNAVAILABLE);
    }
}
