//! Integration tests for the diff line locator against a real patch.

use std::path::PathBuf;

use patchlens::{find, locate, try_locate, AnalysisError, DiffCoordinate, Side};

fn sample_diff() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("sample.diff");
    std::fs::read_to_string(path).expect("sample diff should be readable")
}

fn coordinate(line: u32, start_line: u32, side: Side) -> DiffCoordinate {
    DiffCoordinate {
        line,
        start_line,
        start_side: side,
        side,
    }
}

#[test]
fn test_first_hunk() {
    let diff = sample_diff();

    assert_eq!(locate(&diff, "import os"), coordinate(1, 1, Side::New));
    assert_eq!(locate(&diff, "import sys"), coordinate(2, 1, Side::Old));
    assert_eq!(locate(&diff, "import re"), coordinate(2, 1, Side::New));
    assert_eq!(locate(&diff, "import json"), coordinate(3, 1, Side::New));
    assert_eq!(locate(&diff, "def main():"), coordinate(6, 1, Side::New));
}

#[test]
fn test_second_hunk() {
    let diff = sample_diff();

    assert_eq!(locate(&diff, "    config = load(args)"), coordinate(41, 41, Side::New));
    assert_eq!(locate(&diff, "    return execute(config)"), coordinate(41, 40, Side::Old));
    assert_eq!(locate(&diff, "    result = execute(config)"), coordinate(42, 41, Side::New));
    assert_eq!(locate(&diff, "    return result"), coordinate(43, 41, Side::New));
    assert_eq!(locate(&diff, "# end"), coordinate(45, 41, Side::New));
}

#[test]
fn test_headers_and_misses() {
    let diff = sample_diff();

    assert_eq!(find(&diff, "++ b/app.py"), None);
    assert_eq!(find(&diff, "index 3b18e51..a9c2f0d 100644"), None);
    assert_eq!(find(&diff, "import"), None);
    assert_eq!(locate(&diff, "import"), DiffCoordinate::default());
    assert_eq!(
        try_locate(&diff, "missing"),
        Err(AnalysisError::NoDiffMatch("missing".to_string()))
    );
}

#[test]
fn test_coordinate_json() {
    let diff = sample_diff();
    let json = serde_json::to_value(locate(&diff, "import sys")).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"line": 2, "start_line": 1, "start_side": "LEFT", "side": "LEFT"})
    );
}
