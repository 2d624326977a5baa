//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::aggregate::{AnalysisResult, Issue};
use crate::diff::{DiffCoordinate, Side};
use crate::engine::FileAnalysis;

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize analyses. A single-file run prints the bare result; a batch
/// prints an array of results, each carrying its `path`.
pub fn json_string(analyses: &[FileAnalysis], batch: bool) -> anyhow::Result<String> {
    let json = match analyses {
        [only] if !batch => serde_json::to_string_pretty(&only.result)?,
        _ => serde_json::to_string_pretty(analyses)?,
    };
    Ok(json)
}

/// Write results in JSON format.
pub fn write_json(analyses: &[FileAnalysis], batch: bool) -> anyhow::Result<()> {
    println!("{}", json_string(analyses, batch)?);
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_value<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored terminal format.
pub fn write_pretty(path: &str, analyses: &[FileAnalysis], show_ast: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "patchlens".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", path);
    print!("  {}", "Files:     ".dimmed());
    println!("{}", analyses.len());
    println!();

    for analysis in analyses {
        write_file(analysis, show_ast);
        println!();
    }
}

fn write_file(analysis: &FileAnalysis, show_ast: bool) {
    let result = &analysis.result;
    println!("  {}", analysis.path.display().to_string().bold());

    write_complexity(result);

    if !result.function_signatures().is_empty() {
        println!("    {}", "Functions".underline());
        for sig in result.function_signatures() {
            let ret = sig
                .return_type
                .as_deref()
                .map(|r| format!(" -> {}", r))
                .unwrap_or_default();
            println!("      {}({}){}", sig.name.cyan(), sig.parameters.join(", "), ret.dimmed());
        }
    }

    if !result.class_hierarchies().is_empty() {
        println!("    {}", "Classes".underline());
        for class in result.class_hierarchies() {
            let parents = if class.parent_classes.is_empty() {
                String::new()
            } else {
                format!(" : {}", class.parent_classes.join(", "))
            };
            println!("      {}{}", class.name.cyan(), parents.dimmed());
            if !class.methods.is_empty() {
                println!("        methods:    {}", class.methods.join(", "));
            }
            if !class.attributes.is_empty() {
                println!("        attributes: {}", class.attributes.join(", "));
            }
        }
    }

    if !result.module_dependencies().is_empty() {
        println!("    {}", "Dependencies".underline());
        println!("      {}", result.module_dependencies().join(", "));
    }

    if !result.issues().is_empty() {
        println!("    {}", "Issues".underline());
        for issue in result.issues() {
            write_issue(issue);
        }
    }

    if show_ast {
        println!("    {}", "AST".underline());
        println!("      {}", result.ast_sexp().dimmed());
    }
}

fn write_complexity(result: &AnalysisResult) {
    print!("    {}", "Cyclomatic: ".dimmed());
    write_colored_complexity(result.cyclomatic_complexity());
    print!("  {}", "Cognitive: ".dimmed());
    write_colored_complexity(result.cognitive_complexity());
    println!();

    let h = result.halstead_metrics();
    println!(
        "    {} length {:.0}  vocabulary {:.0}  difficulty {:.2}  effort {:.2}",
        "Halstead:".dimmed(),
        h.length,
        h.vocabulary,
        h.difficulty,
        h.effort
    );
}

fn write_colored_complexity(value: u32) {
    match value {
        v if v <= 10 => print!("{}", v.to_string().green()),
        v if v <= 20 => print!("{}", v.to_string().yellow()),
        v => print!("{}", v.to_string().red().bold()),
    }
}

fn write_issue(issue: &Issue) {
    let location = issue
        .line
        .map(|l| format!(":{}", l))
        .unwrap_or_default();
    let severity = issue
        .severity
        .as_deref()
        .or(issue.kind.as_deref())
        .unwrap_or("info");

    let tag = match severity.to_ascii_lowercase().as_str() {
        "error" | "high" | "2" | "fatal" => severity.red().bold(),
        "warning" | "medium" | "1" => severity.yellow(),
        _ => severity.normal(),
    };

    println!(
        "      [{}] {}{} {}",
        tag,
        issue.tool.cyan(),
        location.dimmed(),
        issue.message
    );
}

/// Write a diff coordinate in colored terminal format.
pub fn write_coordinate_pretty(target: &str, coordinate: Option<&DiffCoordinate>) {
    match coordinate {
        Some(c) => {
            let side = match c.side {
                Side::Old => "old (LEFT)".red(),
                Side::New => "new (RIGHT)".green(),
            };
            println!(
                "  {} {:?} at line {} on the {} side (hunk starts at {})",
                "✓".green(),
                target,
                c.line.to_string().bold(),
                side,
                c.start_line
            );
        }
        None => println!("  {} {:?} not found in diff", "✗".red(), target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::path::PathBuf;

    fn analyses() -> Vec<FileAnalysis> {
        let engine = Engine::default();
        vec![FileAnalysis {
            path: PathBuf::from("src/app.py"),
            result: engine.analyze("import os\n", ".py"),
        }]
    }

    #[test]
    fn test_single_result_is_bare_object() {
        let json = json_string(&analyses(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.is_object());
        assert!(value.get("path").is_none());
        assert_eq!(value["module_dependencies"], serde_json::json!(["os"]));
    }

    #[test]
    fn test_batch_is_array_with_paths() {
        let json = json_string(&analyses(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["path"], "src/app.py");
        assert!(entries[0]["halstead_metrics"].is_object());
    }
}
