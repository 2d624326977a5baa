//! Core traits for structural extraction.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

use super::Structure;
use crate::grammar::Language;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Lives only for the duration of one analysis call; nothing in the final
/// `AnalysisResult` borrows from it.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// Language the tree was parsed as.
    pub language: Language,
    /// Grammar used to parse, needed to compile queries.
    pub grammar: tree_sitter::Language,
}

impl ParsedFile {
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Text of a node's field, if the field is present.
    pub fn field_text(&self, node: tree_sitter::Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.node_text(child).to_string())
    }

    /// Run a query over the whole tree and collect the text of every
    /// capture named `capture`, in match order.
    pub fn capture_texts(&self, query_source: &str, capture: &str) -> anyhow::Result<Vec<String>> {
        let query = Query::new(&self.grammar, query_source)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.root(), &self.source[..]);

        let mut texts = Vec::new();
        while let Some(m) = matches.next() {
            for c in m.captures {
                if query.capture_names()[c.index as usize] == capture {
                    texts.push(self.node_text(c.node).to_string());
                }
            }
        }
        Ok(texts)
    }
}

/// Language-specific structural extraction.
///
/// One implementation per supported language, selected by the `Language`
/// tag the grammar registry resolved.
pub trait StructureExtractor: Send + Sync {
    /// The language this extractor understands.
    fn language(&self) -> Language;

    /// Extract function signatures, class hierarchies and dependencies.
    ///
    /// Dependencies do not need to be sorted; the aggregator normalizes them.
    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<Structure>;
}
