//! Result aggregation: the immutable record handed back to callers.

use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::{normalize_dependencies, ClassHierarchy, FunctionSignature, Structure};
use crate::analysis::walker::AST_UNAVAILABLE;
use crate::error::AnalysisError;
use crate::metrics::HalsteadMetrics;

/// A finding reported by an external linter or scanner.
///
/// Different tools fill different fields; a missing field is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub tool: String,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "lenient_line",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub severity: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Issue {
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// Scanners disagree on whether numbers are numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn lenient_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Number(n)) => u32::try_from(n).ok(),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    }))
}

/// Tree-based metrics and the tree dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseMetrics {
    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    pub ast_sexp: String,
}

impl BaseMetrics {
    /// Zero metrics for a language without a grammar.
    pub fn unsupported() -> Self {
        Self {
            cyclomatic_complexity: 0,
            cognitive_complexity: 0,
            ast_sexp: AST_UNAVAILABLE.to_string(),
        }
    }

    /// Zero metrics with the failure reason in place of the dump.
    pub fn parse_failure(err: &AnalysisError) -> Self {
        Self {
            cyclomatic_complexity: 0,
            cognitive_complexity: 0,
            ast_sexp: crate::analysis::walker::failed_dump(err),
        }
    }
}

/// Complete analysis of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    cyclomatic_complexity: u32,
    cognitive_complexity: u32,
    halstead_metrics: HalsteadMetrics,
    #[serde(default)]
    issues: Vec<Issue>,
    ast_sexp: String,
    #[serde(default)]
    function_signatures: Vec<FunctionSignature>,
    #[serde(default)]
    class_hierarchies: Vec<ClassHierarchy>,
    #[serde(default)]
    module_dependencies: Vec<String>,
}

impl AnalysisResult {
    pub fn cyclomatic_complexity(&self) -> u32 {
        self.cyclomatic_complexity
    }

    pub fn cognitive_complexity(&self) -> u32 {
        self.cognitive_complexity
    }

    pub fn halstead_metrics(&self) -> &HalsteadMetrics {
        &self.halstead_metrics
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn ast_sexp(&self) -> &str {
        &self.ast_sexp
    }

    pub fn function_signatures(&self) -> &[FunctionSignature] {
        &self.function_signatures
    }

    pub fn class_hierarchies(&self) -> &[ClassHierarchy] {
        &self.class_hierarchies
    }

    pub fn module_dependencies(&self) -> &[String] {
        &self.module_dependencies
    }
}

/// Assemble the final record. Dependencies are sorted and deduplicated here
/// whatever order the extractor produced them in.
pub fn aggregate(
    base: BaseMetrics,
    structure: Structure,
    halstead: HalsteadMetrics,
    issues: Vec<Issue>,
) -> AnalysisResult {
    let Structure {
        function_signatures,
        class_hierarchies,
        mut module_dependencies,
    } = structure;
    normalize_dependencies(&mut module_dependencies);

    AnalysisResult {
        cyclomatic_complexity: base.cyclomatic_complexity,
        cognitive_complexity: base.cognitive_complexity,
        halstead_metrics: halstead,
        issues,
        ast_sexp: base.ast_sexp,
        function_signatures,
        class_hierarchies,
        module_dependencies,
    }
}
