//! Tests for the JSON output format.
//!
//! Review tooling consumes this shape directly, so field names and value
//! types are pinned here.

use std::path::PathBuf;

use patchlens::report;
use patchlens::{AnalysisResult, Engine, SourceFile};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn analyze_fixtures(names: &[&str]) -> Vec<patchlens::FileAnalysis> {
    let files: Vec<SourceFile> = names
        .iter()
        .map(|name| {
            let path = testdata_path().join(name);
            let source = std::fs::read_to_string(&path).expect("fixture should be readable");
            SourceFile::new(path, source)
        })
        .collect();
    Engine::default().analyze_batch(&files)
}

#[test]
fn test_single_file_fields() {
    let analyses = analyze_fixtures(&["sample.py"]);
    let json = report::json_string(&analyses, false).expect("should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "ast_sexp",
            "class_hierarchies",
            "cognitive_complexity",
            "cyclomatic_complexity",
            "function_signatures",
            "halstead_metrics",
            "issues",
            "module_dependencies",
        ]
    );

    assert!(value["cyclomatic_complexity"].is_u64());
    for key in ["length", "vocabulary", "difficulty", "effort"] {
        assert!(value["halstead_metrics"][key].is_f64(), "{} should be a float", key);
    }

    let signature = &value["function_signatures"][0];
    assert!(signature["name"].is_string());
    assert!(signature["parameters"].is_array());
    assert!(signature.get("return_type").is_some());

    let class = &value["class_hierarchies"][0];
    for key in ["name", "parent_classes", "methods", "attributes"] {
        assert!(class.get(key).is_some(), "class hierarchy should have {}", key);
    }
}

#[test]
fn test_batch_entries_carry_paths() {
    let analyses = analyze_fixtures(&["sample.go", "sample.ts"]);
    let json = report::json_string(&analyses, true).expect("should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["path"].as_str().unwrap().ends_with("sample.go"));
    assert!(entries[1]["path"].as_str().unwrap().ends_with("sample.ts"));
    assert!(entries[1]["module_dependencies"].is_array());
}

#[test]
fn test_result_deserializes_back() {
    let analyses = analyze_fixtures(&["Sample.java"]);
    let json = report::json_string(&analyses, false).unwrap();

    let restored: AnalysisResult = serde_json::from_str(&json).expect("should deserialize");
    let original = &analyses[0].result;
    assert_eq!(restored.cyclomatic_complexity(), original.cyclomatic_complexity());
    assert_eq!(restored.function_signatures(), original.function_signatures());
    assert_eq!(restored.class_hierarchies(), original.class_hierarchies());
    assert_eq!(restored.module_dependencies(), original.module_dependencies());
    assert_eq!(restored.ast_sexp(), original.ast_sexp());
}
