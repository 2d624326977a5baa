//! Go structure extractor using tree-sitter.
//!
//! Extracts:
//! - Function declarations and methods (with receivers)
//! - Struct types: named fields are attributes, embedded types are parents
//! - Interface types: method elements are methods, embedded types are parents
//! - Import paths, including grouped imports
//!
//! Go declares methods outside the type body, so methods are attached to
//! their receiver's struct after the whole file has been walked.

use crate::analysis::{
    strip_quotes, ClassHierarchy, FunctionSignature, ParsedFile, Structure, StructureExtractor,
    UNKNOWN_NAME,
};
use crate::grammar::Language;

/// Tree-sitter query for extracting imports.
const IMPORT_QUERY: &str = r#"
(import_spec
  path: (_) @path)
"#;

/// Go structure extractor.
pub struct GoExtractor;

impl GoExtractor {
    /// Create a new Go extractor.
    pub fn new() -> Self {
        Self
    }

    fn extract_signature(&self, parsed: &ParsedFile, func: tree_sitter::Node) -> FunctionSignature {
        let name = parsed
            .field_text(func, "name")
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let parameters = func
            .child_by_field_name("parameters")
            .map(|list| self.parameter_names(parsed, list))
            .unwrap_or_default();

        FunctionSignature::new(name, parameters, parsed.field_text(func, "result"))
    }

    /// `func f(a, b int, rest ...string)` yields `a`, `b`, `rest`.
    fn parameter_names(&self, parsed: &ParsedFile, list: tree_sitter::Node) -> Vec<String> {
        let mut names = Vec::new();
        for decl in list.named_children(&mut list.walk()) {
            if !matches!(
                decl.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            ) {
                continue;
            }
            for name in decl.children_by_field_name("name", &mut decl.walk()) {
                names.push(parsed.node_text(name).to_string());
            }
        }
        names
    }

    /// Name of the type a method is declared on, with pointers and type
    /// arguments removed.
    fn receiver_type(&self, parsed: &ParsedFile, method: tree_sitter::Node) -> Option<String> {
        let receiver = method.child_by_field_name("receiver")?;
        let decl = receiver
            .named_children(&mut receiver.walk())
            .find(|c| c.kind() == "parameter_declaration")?;
        let mut ty = decl.child_by_field_name("type")?;

        loop {
            ty = match ty.kind() {
                "pointer_type" | "parenthesized_type" => ty.named_child(0)?,
                "generic_type" => ty.child_by_field_name("type")?,
                _ => return Some(parsed.node_text(ty).to_string()),
            };
        }
    }

    fn extract_type_spec(&self, parsed: &ParsedFile, spec: tree_sitter::Node) -> Option<ClassHierarchy> {
        let name = parsed.field_text(spec, "name")?;
        let ty = spec.child_by_field_name("type")?;
        let mut hierarchy = ClassHierarchy::new(name);

        match ty.kind() {
            "struct_type" => {
                let fields = ty
                    .named_children(&mut ty.walk())
                    .find(|c| c.kind() == "field_declaration_list")?;
                for field in fields.named_children(&mut fields.walk()) {
                    if field.kind() != "field_declaration" {
                        continue;
                    }
                    let mut named = false;
                    for name in field.children_by_field_name("name", &mut field.walk()) {
                        hierarchy.attributes.push(parsed.node_text(name).to_string());
                        named = true;
                    }
                    if !named {
                        if let Some(embedded) = field.child_by_field_name("type") {
                            let text = parsed.node_text(embedded);
                            hierarchy.parent_classes.push(text.trim_start_matches('*').to_string());
                        }
                    }
                }
            }
            "interface_type" => {
                for elem in ty.named_children(&mut ty.walk()) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => {
                            if let Some(method) = parsed.field_text(elem, "name") {
                                hierarchy.methods.push(method);
                            }
                        }
                        "type_elem" | "constraint_elem" | "type_identifier" | "qualified_type" => {
                            hierarchy.parent_classes.push(parsed.node_text(elem).to_string());
                        }
                        _ => {}
                    }
                }
            }
            _ => return None,
        }

        Some(hierarchy)
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure> {
        let mut structure = Structure::default();
        let mut receivers: Vec<(String, String)> = Vec::new();
        let root = parsed.root();

        for child in root.named_children(&mut root.walk()) {
            match child.kind() {
                "function_declaration" => {
                    let signature = self.extract_signature(parsed, child);
                    structure.function_signatures.push(signature);
                }
                "method_declaration" => {
                    let signature = self.extract_signature(parsed, child);
                    if let Some(receiver) = self.receiver_type(parsed, child) {
                        receivers.push((receiver, signature.name.clone()));
                    }
                    structure.function_signatures.push(signature);
                }
                "type_declaration" => {
                    for spec in child.named_children(&mut child.walk()) {
                        if spec.kind() != "type_spec" {
                            continue;
                        }
                        if let Some(hierarchy) = self.extract_type_spec(parsed, spec) {
                            structure.class_hierarchies.push(hierarchy);
                        }
                    }
                }
                _ => {}
            }
        }

        for (receiver, method) in receivers {
            if let Some(owner) = structure
                .class_hierarchies
                .iter_mut()
                .find(|h| h.name == receiver)
            {
                owner.methods.push(method);
            }
        }

        structure.module_dependencies = parsed
            .capture_texts(IMPORT_QUERY, "path")?
            .iter()
            .map(|p| strip_quotes(p))
            .collect();

        Ok(structure)
    }
}
