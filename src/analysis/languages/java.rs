//! Java structure extractor using tree-sitter.

use crate::analysis::{
    ClassHierarchy, FunctionSignature, ParsedFile, Structure, StructureExtractor, UNKNOWN_NAME,
};
use crate::grammar::Language;

/// Java structure extractor.
///
/// Every Java function is a method, so signatures come from class and
/// interface bodies. Implemented interfaces are listed as parents after the
/// superclass.
pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_method(&self, parsed: &ParsedFile, method: tree_sitter::Node) -> FunctionSignature {
        let name = parsed
            .field_text(method, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let mut parameters = Vec::new();
        if let Some(params) = method.child_by_field_name("parameters") {
            for param in params.named_children(&mut params.walk()) {
                let param_name = match param.kind() {
                    "formal_parameter" => parsed.field_text(param, "name"),
                    // `String... args`
                    "spread_parameter" => param
                        .named_children(&mut param.walk())
                        .filter(|c| matches!(c.kind(), "variable_declarator" | "identifier"))
                        .last()
                        .and_then(|d| match d.kind() {
                            "identifier" => Some(parsed.node_text(d).to_string()),
                            _ => parsed.field_text(d, "name"),
                        }),
                    _ => None,
                };
                if let Some(param_name) = param_name {
                    parameters.push(param_name);
                }
            }
        }

        // Constructors have no `type` field.
        FunctionSignature::new(name, parameters, parsed.field_text(method, "type"))
    }

    fn extract_type(
        &self,
        parsed: &ParsedFile,
        decl: tree_sitter::Node,
        signatures: &mut Vec<FunctionSignature>,
    ) -> ClassHierarchy {
        let name = parsed
            .field_text(decl, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let mut hierarchy = ClassHierarchy::new(name);

        if let Some(superclass) = decl.child_by_field_name("superclass") {
            // `extends Base`: the named child is the type.
            if let Some(ty) = superclass.named_child(0) {
                hierarchy.parent_classes.push(parsed.node_text(ty).to_string());
            }
        }

        for child in decl.named_children(&mut decl.walk()) {
            if matches!(child.kind(), "super_interfaces" | "extends_interfaces") {
                hierarchy.parent_classes.extend(self.type_list(parsed, child));
            }
        }

        let Some(body) = decl.child_by_field_name("body") else {
            return hierarchy;
        };

        for member in body.named_children(&mut body.walk()) {
            match member.kind() {
                "method_declaration" => {
                    let signature = self.extract_method(parsed, member);
                    hierarchy.methods.push(signature.name.clone());
                    signatures.push(signature);
                }
                "constructor_declaration" => {
                    signatures.push(self.extract_method(parsed, member));
                }
                "field_declaration" | "constant_declaration" => {
                    for declarator in member.children_by_field_name("declarator", &mut member.walk()) {
                        if let Some(attr) = parsed.field_text(declarator, "name") {
                            hierarchy.attributes.push(attr);
                        }
                    }
                }
                _ => {}
            }
        }

        hierarchy
    }

    fn type_list(&self, parsed: &ParsedFile, clause: tree_sitter::Node) -> Vec<String> {
        let mut types = Vec::new();
        for child in clause.named_children(&mut clause.walk()) {
            if child.kind() == "type_list" {
                for ty in child.named_children(&mut child.walk()) {
                    types.push(parsed.node_text(ty).to_string());
                }
            }
        }
        types
    }

    /// `import java.util.List;` yields `java.util.List`; wildcard imports
    /// keep their `.*` suffix.
    fn extract_import(&self, parsed: &ParsedFile, import: tree_sitter::Node) -> Option<String> {
        let mut path = None;
        let mut wildcard = false;
        for child in import.named_children(&mut import.walk()) {
            match child.kind() {
                "scoped_identifier" | "identifier" if path.is_none() => {
                    path = Some(parsed.node_text(child).to_string());
                }
                "asterisk" => wildcard = true,
                _ => {}
            }
        }
        path.map(|p| if wildcard { format!("{}.*", p) } else { p })
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureExtractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        let mut structure = Structure::default();
        let root = parsed.root();

        for child in root.named_children(&mut root.walk()) {
            match child.kind() {
                "class_declaration" | "interface_declaration" => {
                    let hierarchy =
                        self.extract_type(parsed, child, &mut structure.function_signatures);
                    structure.class_hierarchies.push(hierarchy);
                }
                "import_declaration" => {
                    if let Some(path) = self.extract_import(parsed, child) {
                        structure.module_dependencies.push(path);
                    }
                }
                _ => {}
            }
        }

        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::walker;
    use crate::grammar::GrammarRegistry;

    fn parse_java(source: &str) -> ParsedFile {
        let registry = GrammarRegistry::with_defaults();
        walker::parse(source, registry.resolve(".java").unwrap()).unwrap()
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
package com.example;

import java.util.List;
import java.util.Map;
import java.io.*;
import static java.lang.Math.PI;

public class Test {}
"#;
        let parsed = parse_java(source);
        let structure = JavaExtractor::new().extract(&parsed).unwrap();
        let deps = &structure.module_dependencies;

        assert!(deps.contains(&"java.util.List".to_string()));
        assert!(deps.contains(&"java.util.Map".to_string()));
        assert!(deps.contains(&"java.io.*".to_string()));
        assert!(deps.contains(&"java.lang.Math.PI".to_string()));
    }

    #[test]
    fn test_extract_classes() {
        let source = r#"
public class OrderService extends BaseService implements Auditable, Closeable {
    private final Repository repo;
    private int retries = 3, timeout;

    public OrderService(Repository repo) {
        this.repo = repo;
    }

    public Order find(long id, String... tags) {
        return repo.get(id);
    }

    void close() {}
}

interface Auditable extends Named {
    String audit();
}
"#;
        let parsed = parse_java(source);
        let structure = JavaExtractor::new().extract(&parsed).unwrap();

        let service = &structure.class_hierarchies[0];
        assert_eq!(service.name, "OrderService");
        assert_eq!(
            service.parent_classes,
            vec!["BaseService", "Auditable", "Closeable"]
        );
        assert_eq!(service.methods, vec!["find", "close"]);
        assert_eq!(service.attributes, vec!["repo", "retries", "timeout"]);

        let auditable = &structure.class_hierarchies[1];
        assert_eq!(auditable.parent_classes, vec!["Named"]);
        assert_eq!(auditable.methods, vec!["audit"]);

        let find = structure
            .function_signatures
            .iter()
            .find(|s| s.name == "find")
            .unwrap();
        assert_eq!(find.parameters, vec!["id", "tags"]);
        assert_eq!(find.return_type.as_deref(), Some("Order"));

        let ctor = structure
            .function_signatures
            .iter()
            .find(|s| s.name == "OrderService")
            .unwrap();
        assert_eq!(ctor.return_type, None);
    }
}
