//! JavaScript structure extractor.
//!
//! The walk over top-level statements lives here and is shared with the
//! TypeScript extractor, whose grammar is a superset of this one. Anything
//! a dialect adds (interfaces, abstract classes) is handed to a callback.

use crate::analysis::{
    strip_quotes, ClassHierarchy, FunctionSignature, ParsedFile, Structure, StructureExtractor,
    ANONYMOUS_NAME, UNKNOWN_NAME,
};
use crate::grammar::Language;

/// Tree-sitter query for extracting module sources.
const IMPORT_QUERY: &str = r#"
; import x from 'module'
(import_statement
  source: (string) @source)

; export * from 'module'
(export_statement
  source: (string) @source)

; require('module')
(call_expression
  function: (identifier) @require_func (#eq? @require_func "require")
  arguments: (arguments (string) @source))
"#;

/// JavaScript structure extractor.
pub struct JavaScriptExtractor;

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        extract_module(parsed, |_, _, _| {})
    }
}

/// Walk top-level statements, unwrapping `export` wrappers. Statements this
/// walk does not recognize are passed to `on_other`.
pub(super) fn extract_module<F>(parsed: &ParsedFile, mut on_other: F) -> anyhow::Result<Structure>
where
    F: FnMut(&ParsedFile, tree_sitter::Node, &mut Structure),
{
    let mut structure = Structure::default();
    let root = parsed.root();

    for child in root.named_children(&mut root.walk()) {
        let stmt = if child.kind() == "export_statement" {
            match child.child_by_field_name("declaration") {
                Some(decl) => decl,
                None => continue,
            }
        } else {
            child
        };

        match stmt.kind() {
            "function_declaration" | "generator_function_declaration" => {
                structure
                    .function_signatures
                    .push(function_signature(parsed, stmt, None));
            }
            "lexical_declaration" | "variable_declaration" => {
                for declarator in stmt.named_children(&mut stmt.walk()) {
                    if let Some(sig) = declarator_signature(parsed, declarator) {
                        structure.function_signatures.push(sig);
                    }
                }
            }
            "class_declaration" => {
                let class = extract_class(parsed, stmt, &mut structure.function_signatures);
                structure.class_hierarchies.push(class);
            }
            _ => on_other(parsed, stmt, &mut structure),
        }
    }

    structure.module_dependencies = parsed
        .capture_texts(IMPORT_QUERY, "source")?
        .iter()
        .map(|s| strip_quotes(s))
        .collect();

    Ok(structure)
}

/// `const f = (a) => ...` and `var g = function () {}`.
fn declarator_signature(parsed: &ParsedFile, declarator: tree_sitter::Node) -> Option<FunctionSignature> {
    if declarator.kind() != "variable_declarator" {
        return None;
    }
    let value = declarator.child_by_field_name("value")?;
    match value.kind() {
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            let name = parsed.field_text(declarator, "name");
            Some(function_signature(parsed, value, name))
        }
        _ => None,
    }
}

/// Signature of a function-like node. `name` overrides the node's own name
/// field, which function expressions usually lack.
pub(super) fn function_signature(
    parsed: &ParsedFile,
    func: tree_sitter::Node,
    name: Option<String>,
) -> FunctionSignature {
    let name = name.or_else(|| parsed.field_text(func, "name")).unwrap_or_else(|| {
        if func.kind() == "function_declaration" {
            UNKNOWN_NAME.to_string()
        } else {
            ANONYMOUS_NAME.to_string()
        }
    });

    let parameters = if let Some(params) = func.child_by_field_name("parameters") {
        params
            .named_children(&mut params.walk())
            .filter_map(|p| parameter_name(parsed, p))
            .collect()
    } else if let Some(single) = func.child_by_field_name("parameter") {
        // `x => x * 2`
        vec![parsed.node_text(single).to_string()]
    } else {
        Vec::new()
    };

    FunctionSignature::new(name, parameters, return_type(parsed, func))
}

fn parameter_name(parsed: &ParsedFile, param: tree_sitter::Node) -> Option<String> {
    match param.kind() {
        "identifier" => Some(parsed.node_text(param).to_string()),
        "assignment_pattern" => param
            .child_by_field_name("left")
            .and_then(|left| parameter_name(parsed, left)),
        "rest_pattern" => param
            .named_child(0)
            .and_then(|inner| parameter_name(parsed, inner)),
        // TypeScript wraps every parameter with its annotation.
        "required_parameter" | "optional_parameter" => param
            .child_by_field_name("pattern")
            .and_then(|pattern| parameter_name(parsed, pattern)),
        // Destructured parameters have no single name; keep the pattern text.
        "object_pattern" | "array_pattern" => Some(parsed.node_text(param).to_string()),
        _ => None,
    }
}

/// Return type annotation text without the leading colon.
fn return_type(parsed: &ParsedFile, func: tree_sitter::Node) -> Option<String> {
    let text = parsed.field_text(func, "return_type")?;
    let trimmed = text.trim_start_matches(':').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Class declaration with heritage and direct body members. Methods are
/// also appended to `signatures`.
pub(super) fn extract_class(
    parsed: &ParsedFile,
    class: tree_sitter::Node,
    signatures: &mut Vec<FunctionSignature>,
) -> ClassHierarchy {
    let name = parsed
        .field_text(class, "name")
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let mut hierarchy = ClassHierarchy::new(name);

    for child in class.named_children(&mut class.walk()) {
        if child.kind() == "class_heritage" {
            hierarchy.parent_classes = heritage_names(parsed, child);
        }
    }

    let Some(body) = class.child_by_field_name("body") else {
        return hierarchy;
    };

    for member in body.named_children(&mut body.walk()) {
        match member.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                let signature = function_signature(parsed, member, None);
                hierarchy.methods.push(signature.name.clone());
                signatures.push(signature);
            }
            "field_definition" => {
                if let Some(prop) = parsed.field_text(member, "property") {
                    hierarchy.attributes.push(prop);
                }
            }
            "public_field_definition" => {
                if let Some(prop) = parsed.field_text(member, "name") {
                    hierarchy.attributes.push(prop);
                }
            }
            _ => {}
        }
    }

    hierarchy
}

/// JavaScript puts the parent expression directly under `class_heritage`;
/// TypeScript nests `extends_clause` and `implements_clause`.
fn heritage_names(parsed: &ParsedFile, heritage: tree_sitter::Node) -> Vec<String> {
    let mut names = Vec::new();
    for child in heritage.named_children(&mut heritage.walk()) {
        match child.kind() {
            "extends_clause" | "implements_clause" => {
                for parent in child.named_children(&mut child.walk()) {
                    if parent.kind() != "type_arguments" {
                        names.push(parsed.node_text(parent).to_string());
                    }
                }
            }
            "comment" => {}
            _ => names.push(parsed.node_text(child).to_string()),
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::walker;
    use crate::grammar::GrammarRegistry;

    fn parse_js(source: &str) -> ParsedFile {
        let registry = GrammarRegistry::with_defaults();
        walker::parse(source, registry.resolve(".js").unwrap()).unwrap()
    }

    #[test]
    fn test_extract_functions() {
        let source = r#"
function add(a, b = 2, ...rest) { return a + b; }
const double = x => x * 2;
const greet = function (name) { return "hi " + name; };
export function exported(flag) {}
"#;
        let parsed = parse_js(source);
        let structure = JavaScriptExtractor::new().extract(&parsed).unwrap();
        let sigs = &structure.function_signatures;

        assert_eq!(sigs.len(), 4);
        assert_eq!(sigs[0].name, "add");
        assert_eq!(sigs[0].parameters, vec!["a", "b", "rest"]);
        assert_eq!(sigs[1].name, "double");
        assert_eq!(sigs[1].parameters, vec!["x"]);
        assert_eq!(sigs[2].name, "greet");
        assert_eq!(sigs[3].name, "exported");
        assert!(sigs.iter().all(|s| s.return_type.is_none()));
    }

    #[test]
    fn test_extract_classes() {
        let source = r#"
class Animal {
  legs = 4;
  speak() { return "..."; }
}

class Dog extends Animal {
  bark(times) { return "woof"; }
}
"#;
        let parsed = parse_js(source);
        let structure = JavaScriptExtractor::new().extract(&parsed).unwrap();

        let animal = &structure.class_hierarchies[0];
        assert_eq!(animal.name, "Animal");
        assert!(animal.parent_classes.is_empty());
        assert_eq!(animal.methods, vec!["speak"]);
        assert_eq!(animal.attributes, vec!["legs"]);

        let dog = &structure.class_hierarchies[1];
        assert_eq!(dog.parent_classes, vec!["Animal"]);
        assert_eq!(dog.methods, vec!["bark"]);
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
import React from "react";
import { join } from 'path';
export * from "./util";
const fs = require("fs");
const notImport = load("nope");
"#;
        let parsed = parse_js(source);
        let structure = JavaScriptExtractor::new().extract(&parsed).unwrap();
        let mut deps = structure.module_dependencies.clone();
        deps.sort();

        assert_eq!(deps, vec!["./util", "fs", "path", "react"]);
    }
}
