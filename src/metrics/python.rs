//! Radon-compatible Python metrics computed over the tree-sitter tree.
//!
//! Halstead: operators are those of binary, unary, `not`, boolean,
//! augmented-assignment and comparison expressions. `x += 1` uses the same
//! operator as `x + 1`, while unary `-x` is distinct from binary `a - b`. A
//! chain `a and b and c` is one operator with three operands. Operands are
//! keyed by their text within the enclosing function, so `x` in two
//! functions counts as two distinct operands.
//!
//! Cyclomatic: every function, class and method is a block. A function
//! scores `1 +` its decision points; nested definitions are their own blocks
//! and do not add to the enclosing score. A class scores
//! `floor(total / methods) + (methods > 1)` where `total` is `1 +` its body
//! decisions plus its method scores, or `total` when it has no methods. The
//! file score is the sum over all blocks.
//!
//! Both fail on a tree with syntax errors.

use std::collections::BTreeMap;

use super::halstead::{HalsteadCounts, HalsteadMetrics};
use crate::analysis::{unwrap_decorated, ParsedFile};
use crate::error::AnalysisError;

const HALSTEAD_ESTIMATOR: &str = "python-halstead";
const COMPLEXITY_ESTIMATOR: &str = "python-cyclomatic";

fn reject_syntax_errors(parsed: &ParsedFile, estimator: &'static str) -> Result<(), AnalysisError> {
    let root = parsed.root();
    if root.has_error() {
        let position = first_error(root)
            .map(|n| {
                let p = n.start_position();
                format!(" at line {}, column {}", p.row + 1, p.column + 1)
            })
            .unwrap_or_default();
        return Err(AnalysisError::EstimatorFailure {
            estimator,
            reason: format!("invalid syntax{}", position),
        });
    }
    Ok(())
}

fn first_error(root: tree_sitter::Node) -> Option<tree_sitter::Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut children: Vec<_> = node.children(&mut node.walk()).collect();
            children.reverse();
            stack.extend(children);
        }
    }
    None
}

/// Unwrap `(expr)` to `expr`.
fn unparenthesize(mut node: tree_sitter::Node) -> tree_sitter::Node {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

#[derive(Default)]
struct Tally {
    operators: BTreeMap<String, usize>,
    operands: BTreeMap<(String, String), usize>,
}

impl Tally {
    fn operator(&mut self, key: impl Into<String>) {
        *self.operators.entry(key.into()).or_insert(0) += 1;
    }

    fn operand(&mut self, parsed: &ParsedFile, context: &str, node: tree_sitter::Node) {
        let text = parsed.node_text(unparenthesize(node)).to_string();
        *self
            .operands
            .entry((context.to_string(), text))
            .or_insert(0) += 1;
    }

    fn field_operand(&mut self, parsed: &ParsedFile, context: &str, node: tree_sitter::Node, field: &str) {
        if let Some(child) = node.child_by_field_name(field) {
            self.operand(parsed, context, child);
        }
    }
}

fn operator_kind(node: tree_sitter::Node) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

/// Halstead counts for a Python tree.
pub fn halstead_counts(parsed: &ParsedFile) -> Result<HalsteadCounts, AnalysisError> {
    reject_syntax_errors(parsed, HALSTEAD_ESTIMATOR)?;

    let mut tally = Tally::default();
    let mut stack = vec![(parsed.root(), String::new())];

    while let Some((node, context)) = stack.pop() {
        let mut child_context = context.clone();

        match node.kind() {
            "function_definition" => {
                if let Some(name) = parsed.field_text(node, "name") {
                    child_context = name;
                }
            }
            "binary_operator" => {
                if let Some(op) = operator_kind(node) {
                    tally.operator(op);
                }
                tally.field_operand(parsed, &context, node, "left");
                tally.field_operand(parsed, &context, node, "right");
            }
            "unary_operator" => {
                if let Some(op) = operator_kind(node) {
                    tally.operator(format!("unary{}", op));
                }
                tally.field_operand(parsed, &context, node, "argument");
            }
            "not_operator" => {
                tally.operator("not");
                tally.field_operand(parsed, &context, node, "argument");
            }
            "boolean_operator" => {
                if !is_chain_link(node) {
                    if let Some(op) = operator_kind(node) {
                        tally.operator(op);
                    }
                    for value in chain_values(node) {
                        tally.operand(parsed, &context, value);
                    }
                }
            }
            "augmented_assignment" => {
                if let Some(op) = operator_kind(node) {
                    tally.operator(op.trim_end_matches('='));
                }
                tally.field_operand(parsed, &context, node, "left");
                tally.field_operand(parsed, &context, node, "right");
            }
            "comparison_operator" => {
                for child in node.children(&mut node.walk()) {
                    if !child.is_named() {
                        tally.operator(child.kind());
                    } else if child.kind() != "comment" {
                        tally.operand(parsed, &context, child);
                    }
                }
            }
            _ => {}
        }

        let mut children: Vec<_> = node.named_children(&mut node.walk()).collect();
        children.reverse();
        stack.extend(children.into_iter().map(|c| (c, child_context.clone())));
    }

    Ok(HalsteadCounts::from_occurrences(&tally.operators, &tally.operands))
}

/// Radon-compatible Halstead metrics: `effort = difficulty * volume`.
pub fn halstead(parsed: &ParsedFile) -> Result<HalsteadMetrics, AnalysisError> {
    Ok(halstead_counts(parsed)?.standard_metrics())
}

/// True when `node` is the left operand of a parent with the same boolean
/// operator; the parent counts the whole chain.
fn is_chain_link(node: tree_sitter::Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    parent.kind() == "boolean_operator"
        && operator_kind(parent) == operator_kind(node)
        && parent
            .child_by_field_name("left")
            .is_some_and(|left| left.id() == node.id())
}

/// Operands of a same-operator chain, innermost left first.
fn chain_values(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let op = operator_kind(node);
    let mut rights = Vec::new();
    let mut current = node;

    loop {
        if let Some(right) = current.child_by_field_name("right") {
            rights.push(right);
        }
        match current.child_by_field_name("left") {
            Some(left) if left.kind() == "boolean_operator" && operator_kind(left) == op => {
                current = left;
            }
            Some(left) => {
                rights.push(left);
                break;
            }
            None => break,
        }
    }

    rights.reverse();
    rights
}

/// Decision points below `node`, not descending into nested definitions.
fn decisions(node: tree_sitter::Node) -> u32 {
    let mut score = 0u32;
    let mut stack: Vec<_> = node.named_children(&mut node.walk()).collect();

    while let Some(current) = stack.pop() {
        match current.kind() {
            "function_definition" | "class_definition" | "decorated_definition" => continue,
            "if_statement" | "elif_clause" | "conditional_expression" | "boolean_operator"
            | "for_in_clause" | "if_clause" | "assert_statement" | "case_clause"
            | "except_clause" | "except_group_clause" => score += 1,
            "for_statement" | "while_statement" => {
                score += 1;
                if current.child_by_field_name("alternative").is_some() {
                    score += 1;
                }
            }
            "try_statement" => {
                if current
                    .named_children(&mut current.walk())
                    .any(|c| c.kind() == "else_clause")
                {
                    score += 1;
                }
            }
            _ => {}
        }
        stack.extend(current.named_children(&mut current.walk()));
    }

    score
}

/// Definitions directly under `node`, looking through compound statements
/// (`if TYPE_CHECKING:` blocks) but not into other definitions.
fn definitions(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut found = Vec::new();
    let mut stack: Vec<_> = node.named_children(&mut node.walk()).collect();
    stack.reverse();

    while let Some(current) = stack.pop() {
        let def = unwrap_decorated(current);
        if matches!(def.kind(), "function_definition" | "class_definition") {
            found.push(def);
            continue;
        }
        let mut children: Vec<_> = current.named_children(&mut current.walk()).collect();
        children.reverse();
        stack.extend(children);
    }

    found
}

fn function_score(func: tree_sitter::Node) -> u32 {
    1 + func.child_by_field_name("body").map_or(0, decisions)
}

/// Class score followed by its method scores.
fn class_scores(class: tree_sitter::Node) -> Vec<u32> {
    let Some(body) = class.child_by_field_name("body") else {
        return vec![1];
    };

    let methods: Vec<u32> = definitions(body)
        .into_iter()
        .filter(|d| d.kind() == "function_definition")
        .map(function_score)
        .collect();

    let total = 1 + decisions(body) + methods.iter().sum::<u32>();
    let count = methods.len() as u32;
    let class_score = if count == 0 {
        total
    } else {
        total / count + u32::from(count > 1)
    };

    let mut scores = Vec::with_capacity(methods.len() + 1);
    scores.push(class_score);
    scores.extend(methods);
    scores
}

/// Radon-style block scores, in source order.
pub fn block_complexities(parsed: &ParsedFile) -> Result<Vec<u32>, AnalysisError> {
    reject_syntax_errors(parsed, COMPLEXITY_ESTIMATOR)?;

    let mut scores = Vec::new();
    for def in definitions(parsed.root()) {
        match def.kind() {
            "function_definition" => scores.push(function_score(def)),
            _ => scores.extend(class_scores(def)),
        }
    }
    Ok(scores)
}

/// Sum of all block scores.
pub fn cyclomatic_complexity(parsed: &ParsedFile) -> Result<u32, AnalysisError> {
    Ok(block_complexities(parsed)?.iter().sum())
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
    fn test_function_blocks() {
        let source = r#"
def simple():
    return 1

def branchy(x, items):
    if x > 0 and x < 10:
        return 1
    elif x == 0:
        return 0
    for i in items:
        pass
    else:
        pass
    return [y for y in items if y]
"#;
        let parsed = parse_python(source);
        // branchy: 1 + if + and + elif + for + for-else + comprehension for + comprehension if
        assert_eq!(block_complexities(&parsed).unwrap(), vec![1, 8]);
        assert_eq!(cyclomatic_complexity(&parsed).unwrap(), 9);
    }

    #[test]
    fn test_nested_definitions_are_excluded() {
        let source = r#"
def outer():
    def inner():
        if True:
            pass
    return inner
"#;
        let parsed = parse_python(source);
        assert_eq!(block_complexities(&parsed).unwrap(), vec![1]);
    }

    #[test]
    fn test_class_blocks() {
        let source = r#"
class Empty:
    pass

class Service:
    def start(self):
        return 1

    def stop(self, force):
        if force:
            return 2
        return 3
"#;
        let parsed = parse_python(source);
        // Empty: 1. Service: (1 + 1 + 2) / 2 + 1 = 3, then start=1, stop=2.
        assert_eq!(block_complexities(&parsed).unwrap(), vec![1, 3, 1, 2]);
    }

    #[test]
    fn test_try_and_assert() {
        let source = r#"
def guarded(x):
    assert x
    try:
        run(x)
    except ValueError:
        pass
    except KeyError:
        pass
    else:
        done()
"#;
        let parsed = parse_python(source);
        // 1 + assert + 2 handlers + try-else
        assert_eq!(block_complexities(&parsed).unwrap(), vec![5]);
    }

    #[test]
    fn test_halstead_counts() {
        let source = "def f(a, b):\n    c = a + b\n    c += 1\n    return -c\n";
        let parsed = parse_python(source);
        let counts = halstead_counts(&parsed).unwrap();

        // Operators: + (binary and augmented), unary-
        assert_eq!(counts.distinct_operators, 2);
        assert_eq!(counts.total_operators, 3);
        // Operands: a, b, c, 1 in context f
        assert_eq!(counts.distinct_operands, 4);
        assert_eq!(counts.total_operands, 5);
    }

    #[test]
    fn test_boolean_chain_is_one_operator() {
        let parsed = parse_python("x = a and b and c\n");
        let counts = halstead_counts(&parsed).unwrap();
        assert_eq!(counts.total_operators, 1);
        assert_eq!(counts.total_operands, 3);
    }

    #[test]
    fn test_comparison_operators() {
        let parsed = parse_python("ok = a < b <= c\nfound = k in d\n");
        let counts = halstead_counts(&parsed).unwrap();
        assert_eq!(counts.distinct_operators, 3);
        assert_eq!(counts.total_operators, 3);
        // a b c k d
        assert_eq!(counts.distinct_operands, 5);
    }

    #[test]
    fn test_halstead_metrics() {
        let parsed = parse_python("x = a + b\n");
        let metrics = halstead(&parsed).unwrap();
        // n1=1 n2=2 N1=1 N2=2: difficulty 0.5, volume 3*log2(3)
        assert_eq!(metrics.length, 3.0);
        assert_eq!(metrics.vocabulary, 3.0);
        assert_eq!(metrics.difficulty, 0.5);
        assert!((metrics.effort - 0.5 * 3.0 * 3f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn test_syntax_errors_fail() {
        let parsed = parse_python("def broken(:\n    pass\n");
        let err = halstead(&parsed).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::EstimatorFailure { estimator: "python-halstead", .. }
        ));
        assert!(cyclomatic_complexity(&parsed).is_err());
    }
}
