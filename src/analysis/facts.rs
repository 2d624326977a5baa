//! Structural facts extracted from a syntax tree.

use serde::{Deserialize, Serialize};

/// Sentinel for declarations whose name could not be read.
pub const UNKNOWN_NAME: &str = "unknown";

/// Sentinel for function expressions that carry no name.
pub const ANONYMOUS_NAME: &str = "anonymous";

/// A function or method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Parameter names, in declaration order.
    pub parameters: Vec<String>,
    /// Return type annotation text, if declared.
    #[serde(default)]
    pub return_type: Option<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<String>, return_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
        }
    }
}

/// A class or type declaration with its direct members.
///
/// `methods` and `attributes` never include inherited members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHierarchy {
    pub name: String,
    /// Declared parents, in declaration order.
    pub parent_classes: Vec<String>,
    pub methods: Vec<String>,
    pub attributes: Vec<String>,
}

impl ClassHierarchy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_classes: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// Everything a `StructureExtractor` produces for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
    pub function_signatures: Vec<FunctionSignature>,
    pub class_hierarchies: Vec<ClassHierarchy>,
    pub module_dependencies: Vec<String>,
}

/// Sort ascending and drop duplicates, in place.
pub fn normalize_dependencies(deps: &mut Vec<String>) {
    deps.sort();
    deps.dedup();
}

/// Strip the quote characters a grammar keeps around string literals.
pub fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dependencies() {
        let mut deps = vec![
            "os".to_string(),
            "collections".to_string(),
            "os".to_string(),
            "abc".to_string(),
        ];
        normalize_dependencies(&mut deps);
        assert_eq!(deps, vec!["abc", "collections", "os"]);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'react'"), "react");
        assert_eq!(strip_quotes("\"fmt\""), "fmt");
        assert_eq!(strip_quotes("`embed`"), "embed");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
