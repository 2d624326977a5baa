//! TypeScript structure extractor.
//!
//! Reuses the JavaScript walk and adds the declarations only TypeScript has.
//! Interfaces are reported as class hierarchies: `extends` types are parents,
//! method signatures are methods and property signatures are attributes.

use super::javascript::{extract_class, extract_module, function_signature};
use crate::analysis::{
    ClassHierarchy, ParsedFile, Structure, StructureExtractor, UNKNOWN_NAME,
};
use crate::grammar::Language;

pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_declaration(&self, parsed: &ParsedFile, node: tree_sitter::Node, structure: &mut Structure) {
        match node.kind() {
            "abstract_class_declaration" => {
                let class = extract_class(parsed, node, &mut structure.function_signatures);
                structure.class_hierarchies.push(class);
            }
            "interface_declaration" => {
                let interface = self.extract_interface(parsed, node);
                structure.class_hierarchies.push(interface);
            }
            // `declare function f(): void;`
            "function_signature" => {
                structure
                    .function_signatures
                    .push(function_signature(parsed, node, None));
            }
            _ => {}
        }
    }

    fn extract_interface(&self, parsed: &ParsedFile, node: tree_sitter::Node) -> ClassHierarchy {
        let name = parsed
            .field_text(node, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let mut hierarchy = ClassHierarchy::new(name);

        for child in node.named_children(&mut node.walk()) {
            if child.kind() == "extends_type_clause" {
                hierarchy.parent_classes = child
                    .named_children(&mut child.walk())
                    .map(|t| parsed.node_text(t).to_string())
                    .collect();
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            for member in body.named_children(&mut body.walk()) {
                let Some(member_name) = parsed.field_text(member, "name") else {
                    continue;
                };
                match member.kind() {
                    "method_signature" => hierarchy.methods.push(member_name),
                    "property_signature" => hierarchy.attributes.push(member_name),
                    _ => {}
                }
            }
        }

        hierarchy
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        extract_module(parsed, |parsed, node, structure| {
            self.extract_declaration(parsed, node, structure)
        })
    }
}
