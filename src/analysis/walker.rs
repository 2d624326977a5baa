//! Tree walker: parsing, the canonical tree dump, and tree-based complexity.
//!
//! Both complexity scores here are node-kind heuristics over the raw
//! tree-sitter tree, shared by every language:
//!
//! - Cyclomatic (generic): count branching nodes among the *direct children
//!   of the root*. This shallow count is the default; `Recursive` counts
//!   every descendant instead.
//! - Cognitive: pre-order walk over every node; a nesting construct adds
//!   `depth + 1` (root is depth 0), a jump statement adds 1.

use phf::phf_set;
use tracing::debug;

use super::ParsedFile;
use crate::config::CyclomaticTraversal;
use crate::error::AnalysisError;
use crate::grammar::Grammar;

/// Placeholder dump for files without a grammar.
pub const AST_UNAVAILABLE: &str = "AST not available for this language or due to parsing error.";

/// Node kinds counted by the generic cyclomatic method.
static BRANCH_KINDS: phf::Set<&'static str> = phf_set! {
    "if_statement",
    "for_statement",
    "while_statement",
    "switch_statement",
    "case_statement",
    "else_clause",
    "catch_clause",
    "do_statement",
};

/// Node kinds weighted by nesting depth in the cognitive score.
static NESTING_KINDS: phf::Set<&'static str> = phf_set! {
    "if_statement",
    "for_statement",
    "while_statement",
    "switch_statement",
    "try_statement",
    "catch_clause",
    "do_statement",
};

/// Node kinds that add a flat 1 to the cognitive score.
static JUMP_KINDS: phf::Set<&'static str> = phf_set! {
    "break_statement",
    "continue_statement",
    "return_statement",
};

/// Parse source text with a grammar.
///
/// Malformed input still yields a tree (with ERROR nodes); only a parser
/// that returns nothing at all is a `ParseFailure`.
pub fn parse(source: &str, grammar: &Grammar) -> Result<ParsedFile, AnalysisError> {
    let language = grammar.language();
    let mut parser = grammar.new_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::ParseFailure {
            language: language.id(),
            reason: "parser returned no tree".to_string(),
        })?;

    if tree.root_node().has_error() {
        debug!(language = language.id(), "tree contains syntax errors");
    }

    Ok(ParsedFile {
        tree,
        source: source.as_bytes().to_vec(),
        language,
        grammar: grammar.ts_language().clone(),
    })
}

/// Canonical S-expression dump of the tree, optionally capped.
pub fn tree_dump(parsed: &ParsedFile, max_bytes: Option<usize>) -> String {
    let sexp = parsed.root().to_sexp();
    match max_bytes {
        Some(limit) if sexp.len() > limit => {
            let mut end = limit;
            while !sexp.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}…", &sexp[..end])
        }
        _ => sexp,
    }
}

/// Placeholder dump for a failed parse.
pub fn failed_dump(err: &AnalysisError) -> String {
    format!("Error generating AST: {}", err.reason())
}

/// Visit every node below and including `root` in pre-order, passing its
/// depth (root is 0). Uses the cursor as an explicit stack.
pub fn walk_preorder<'a, F>(root: tree_sitter::Node<'a>, mut visit: F)
where
    F: FnMut(tree_sitter::Node<'a>, usize),
{
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        visit(cursor.node(), depth);

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
            depth -= 1;
        }
    }
}

/// Generic cyclomatic complexity.
pub fn cyclomatic_complexity(root: tree_sitter::Node, traversal: CyclomaticTraversal) -> u32 {
    match traversal {
        CyclomaticTraversal::Shallow => root
            .children(&mut root.walk())
            .filter(|n| BRANCH_KINDS.contains(n.kind()))
            .count() as u32,
        CyclomaticTraversal::Recursive => {
            let mut count = 0u32;
            walk_preorder(root, |node, depth| {
                if depth > 0 && BRANCH_KINDS.contains(node.kind()) {
                    count += 1;
                }
            });
            count
        }
    }
}

/// Heuristic cognitive complexity.
pub fn cognitive_complexity(root: tree_sitter::Node) -> u32 {
    let mut score = 0u32;
    walk_preorder(root, |node, depth| {
        let kind = node.kind();
        if NESTING_KINDS.contains(kind) {
            score += depth as u32 + 1;
        }
        if JUMP_KINDS.contains(kind) {
            score += 1;
        }
    });
    score
}
