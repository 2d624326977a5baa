//! Python structure extractor.
//!
//! Extracts:
//! - Top-level function definitions (plain and decorated)
//! - Class definitions with superclasses, methods and class-level attributes
//! - Imported names (`import x`, `import x as y`, and both `x` and `y` of
//!   `from x import y`)

use crate::analysis::{
    ClassHierarchy, FunctionSignature, ParsedFile, Structure, StructureExtractor, UNKNOWN_NAME,
};
use crate::grammar::Language;

/// Tree-sitter query for extracting imported modules.
const IMPORT_QUERY: &str = r#"
; import module
(import_statement
  name: (dotted_name) @module)

; import module as alias
(import_statement
  name: (aliased_import
    name: (dotted_name) @module))

; from module import name: both the module and the imported names
(import_from_statement
  module_name: (dotted_name) @module)

(import_from_statement
  name: (dotted_name) @module)

(import_from_statement
  name: (aliased_import
    name: (dotted_name) @module))
"#;

/// Unwrap `@decorator` wrappers to the function or class they decorate.
pub(crate) fn unwrap_decorated(node: tree_sitter::Node) -> tree_sitter::Node {
    if node.kind() == "decorated_definition" {
        if let Some(inner) = node.child_by_field_name("definition") {
            return inner;
        }
    }
    node
}

/// Python structure extractor.
pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_signature(&self, parsed: &ParsedFile, func: tree_sitter::Node) -> FunctionSignature {
        let name = parsed
            .field_text(func, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let parameters = func
            .child_by_field_name("parameters")
            .map(|params| {
                params
                    .named_children(&mut params.walk())
                    .filter_map(|p| self.parameter_name(parsed, p))
                    .collect()
            })
            .unwrap_or_default();

        FunctionSignature::new(name, parameters, parsed.field_text(func, "return_type"))
    }

    fn parameter_name(&self, parsed: &ParsedFile, param: tree_sitter::Node) -> Option<String> {
        match param.kind() {
            "identifier" => Some(parsed.node_text(param).to_string()),
            "default_parameter" | "typed_default_parameter" => parsed.field_text(param, "name"),
            // `*args` / `**kwargs`
            "list_splat_pattern" | "dictionary_splat_pattern" => param
                .named_child(0)
                .map(|inner| parsed.node_text(inner).to_string()),
            // `x: int` and `*args: int` carry no name field.
            "typed_parameter" => parsed.field_text(param, "name").or_else(|| {
                param
                    .named_children(&mut param.walk())
                    .find(|c| c.kind() != "type")
                    .and_then(|c| self.parameter_name(parsed, c))
            }),
            _ => None,
        }
    }

    fn extract_class(
        &self,
        parsed: &ParsedFile,
        class: tree_sitter::Node,
        signatures: &mut Vec<FunctionSignature>,
    ) -> ClassHierarchy {
        let name = parsed
            .field_text(class, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let mut hierarchy = ClassHierarchy::new(name);

        if let Some(supers) = class.child_by_field_name("superclasses") {
            // Keyword arguments such as `metaclass=ABCMeta` are not parents.
            hierarchy.parent_classes = supers
                .named_children(&mut supers.walk())
                .filter(|c| matches!(c.kind(), "identifier" | "attribute"))
                .map(|c| parsed.node_text(c).to_string())
                .collect();
        }

        let Some(body) = class.child_by_field_name("body") else {
            return hierarchy;
        };

        for member in body.named_children(&mut body.walk()) {
            let member = unwrap_decorated(member);
            match member.kind() {
                "function_definition" => {
                    let signature = self.extract_signature(parsed, member);
                    hierarchy.methods.push(signature.name.clone());
                    signatures.push(signature);
                }
                "expression_statement" => {
                    for expr in member.named_children(&mut member.walk()) {
                        if expr.kind() != "assignment" {
                            continue;
                        }
                        if let Some(attr) = expr
                            .child_by_field_name("left")
                            .and_then(|left| self.attribute_name(parsed, left))
                        {
                            hierarchy.attributes.push(attr);
                        }
                    }
                }
                _ => {}
            }
        }

        hierarchy
    }

    /// `self.x = ...` yields `x`; a bare `x = ...` in the class body yields `x`.
    fn attribute_name(&self, parsed: &ParsedFile, target: tree_sitter::Node) -> Option<String> {
        match target.kind() {
            "identifier" => Some(parsed.node_text(target).to_string()),
            "attribute" => parsed.field_text(target, "attribute"),
            _ => None,
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        let mut structure = Structure::default();
        let root = parsed.root();

        for child in root.named_children(&mut root.walk()) {
            let def = unwrap_decorated(child);
            match def.kind() {
                "function_definition" => {
                    let signature = self.extract_signature(parsed, def);
                    structure.function_signatures.push(signature);
                }
                "class_definition" => {
                    let class = self.extract_class(parsed, def, &mut structure.function_signatures);
                    structure.class_hierarchies.push(class);
                }
                _ => {}
            }
        }

        structure.module_dependencies = parsed.capture_texts(IMPORT_QUERY, "module")?;
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::walker;
    use crate::grammar::GrammarRegistry;

    fn parse_python(source: &str) -> ParsedFile {
        let registry = GrammarRegistry::with_defaults();
        walker::parse(source, registry.resolve(".py").unwrap()).unwrap()
    }

    #[test]
    fn test_extract_functions() {
        let source = r#"
def plain(a, b):
    return a + b

def typed(x: int, y: str = "s", *args, **kwargs) -> bool:
    return True

@cache
def decorated(n=3):
    pass
"#;
        let parsed = parse_python(source);
        let structure = PythonExtractor::new().extract(&parsed).unwrap();

        assert_eq!(
            structure.function_signatures,
            vec![
                FunctionSignature::new("plain", vec!["a".into(), "b".into()], None),
                FunctionSignature::new(
                    "typed",
                    vec!["x".into(), "y".into(), "args".into(), "kwargs".into()],
                    Some("bool".into())
                ),
                FunctionSignature::new("decorated", vec!["n".into()], None),
            ]
        );
    }

    #[test]
    fn test_extract_classes() {
        let source = r#"
class Base:
    pass

class Child(Base, mixins.Loggable, metaclass=Meta):
    limit = 10

    def __init__(self, name):
        self.name = name

    @property
    def label(self) -> str:
        return self.name
"#;
        let parsed = parse_python(source);
        let structure = PythonExtractor::new().extract(&parsed).unwrap();

        assert_eq!(structure.class_hierarchies.len(), 2);
        let base = &structure.class_hierarchies[0];
        assert_eq!(base.name, "Base");
        assert!(base.parent_classes.is_empty());

        let child = &structure.class_hierarchies[1];
        assert_eq!(child.parent_classes, vec!["Base", "mixins.Loggable"]);
        assert_eq!(child.methods, vec!["__init__", "label"]);
        // Only direct body members; `self.name` inside __init__ is not one.
        assert_eq!(child.attributes, vec!["limit"]);

        assert!(structure
            .function_signatures
            .iter()
            .any(|s| s.name == "label" && s.return_type.as_deref() == Some("str")));
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
import os
import numpy as np
from collections import OrderedDict
from . import sibling
from typing import Optional as Opt, List
import os
"#;
        let parsed = parse_python(source);
        let structure = PythonExtractor::new().extract(&parsed).unwrap();
        let mut deps = structure.module_dependencies.clone();
        crate::analysis::normalize_dependencies(&mut deps);

        assert_eq!(
            deps,
            vec!["List", "OrderedDict", "Optional", "collections", "numpy", "os", "sibling", "typing"]
        );
    }
}
