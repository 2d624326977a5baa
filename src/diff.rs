//! Unified-diff line locator.
//!
//! Given the patch text of one file and the literal text of a source line,
//! find the position a review comment must be attached to: the line number
//! and which side of the diff (old or new) the line lives on.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;

lazy_static! {
    static ref HUNK_HEADER: Regex = Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap();
}

/// Which column of the diff a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The pre-change file (deleted lines).
    #[serde(rename = "LEFT")]
    Old,
    /// The post-change file (added and context lines).
    #[serde(rename = "RIGHT")]
    New,
}

/// A resolved position in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCoordinate {
    pub line: u32,
    /// First line of the enclosing hunk on `start_side`.
    pub start_line: u32,
    pub start_side: Side,
    pub side: Side,
}

impl DiffCoordinate {
    fn at(line: u32, start_line: u32, side: Side) -> Self {
        Self {
            line,
            start_line,
            start_side: side,
            side,
        }
    }
}

impl Default for DiffCoordinate {
    /// Returned by `locate` when nothing matches.
    fn default() -> Self {
        Self::at(1, 1, Side::New)
    }
}

/// Cursor state while scanning one diff.
#[derive(Debug, Default)]
struct HunkCursor {
    old_line: u32,
    new_line: u32,
    old_start: u32,
    new_start: u32,
    in_hunk: bool,
}

impl HunkCursor {
    fn reset(&mut self, old_start: u32, new_start: u32) {
        self.old_line = old_start;
        self.new_line = new_start;
        self.old_start = old_start;
        self.new_start = new_start;
        self.in_hunk = true;
    }
}

/// Old and new start lines of a hunk header, or `None` when the header is
/// malformed or a start does not fit in a `u32`.
fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let caps = HUNK_HEADER.captures(line)?;
    let old_start = caps[1].parse().ok()?;
    let new_start = caps[2].parse().ok()?;
    Some((old_start, new_start))
}

/// Find `target` in `diff`. `None` when no line matches exactly.
///
/// The first match wins. Context and added lines resolve to the new side,
/// deleted lines to the old side.
pub fn find(diff: &str, target: &str) -> Option<DiffCoordinate> {
    let mut cursor = HunkCursor::default();

    for line in diff.lines() {
        if line.starts_with("@@") {
            match parse_hunk_header(line) {
                Some((old_start, new_start)) => cursor.reset(old_start, new_start),
                // Lines under an unreadable header have no known position.
                None => cursor.in_hunk = false,
            }
            continue;
        }

        // File headers before the first hunk are not content.
        if !cursor.in_hunk {
            continue;
        }

        let mut chars = line.chars();
        let Some(marker) = chars.next() else {
            continue;
        };
        let content = chars.as_str();

        match marker {
            ' ' => {
                if content == target {
                    return Some(DiffCoordinate::at(cursor.new_line, cursor.new_start, Side::New));
                }
                cursor.old_line = cursor.old_line.saturating_add(1);
                cursor.new_line = cursor.new_line.saturating_add(1);
            }
            '-' => {
                if content == target {
                    return Some(DiffCoordinate::at(cursor.old_line, cursor.old_start, Side::Old));
                }
                cursor.old_line = cursor.old_line.saturating_add(1);
            }
            '+' => {
                if content == target {
                    return Some(DiffCoordinate::at(cursor.new_line, cursor.new_start, Side::New));
                }
                cursor.new_line = cursor.new_line.saturating_add(1);
            }
            // `\ No newline at end of file`
            _ => {}
        }
    }

    None
}

/// Like `find`, but a miss is the `NoDiffMatch` error.
pub fn try_locate(diff: &str, target: &str) -> Result<DiffCoordinate, AnalysisError> {
    find(diff, target).ok_or_else(|| AnalysisError::NoDiffMatch(target.to_string()))
}

/// Locate `target` in `diff`, falling back to line 1 on the new side.
///
/// The fallback is indistinguishable from a real match on line 1; callers
/// that need to tell them apart use `find`.
pub fn locate(diff: &str, target: &str) -> DiffCoordinate {
    match try_locate(diff, target) {
        Ok(coordinate) => coordinate,
        Err(err) => {
            debug!(%err, "using default diff coordinate");
            DiffCoordinate::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "@@ -1,2 +1,3 @@\n a\n-b\n+b2\n+c";

    #[test]
    fn test_sample_scenarios() {
        assert_eq!(locate(SAMPLE, "c"), DiffCoordinate::at(3, 1, Side::New));
        assert_eq!(locate(SAMPLE, "b"), DiffCoordinate::at(2, 1, Side::Old));
        assert_eq!(locate(SAMPLE, "a"), DiffCoordinate::at(1, 1, Side::New));
        assert_eq!(locate(SAMPLE, "b2"), DiffCoordinate::at(2, 1, Side::New));
    }

    #[test]
    fn test_default_when_missing() {
        assert_eq!(find(SAMPLE, "zzz"), None);
        assert_eq!(locate(SAMPLE, "zzz"), DiffCoordinate::default());
        assert_eq!(
            try_locate(SAMPLE, "zzz"),
            Err(AnalysisError::NoDiffMatch("zzz".to_string()))
        );
        assert_eq!(locate("", "anything"), DiffCoordinate::at(1, 1, Side::New));
    }

    #[test]
    fn test_second_hunk_resets_cursors() {
        let diff = "\
--- a/app.py
+++ b/app.py
@@ -1,3 +1,3 @@
 import os
-import sys
+import re

@@ -20,4 +20,5 @@ def main():
     setup()
-    run()
+    run(fast=True)
+    report()
     return 0
";
        assert_eq!(locate(diff, "    report()"), DiffCoordinate::at(22, 20, Side::New));
        assert_eq!(locate(diff, "    run()"), DiffCoordinate::at(21, 20, Side::Old));
        assert_eq!(locate(diff, "    return 0"), DiffCoordinate::at(23, 20, Side::New));
        assert_eq!(locate(diff, "import re"), DiffCoordinate::at(2, 1, Side::New));
    }

    #[test]
    fn test_file_headers_are_not_content() {
        let diff = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n";
        // `++ b/x` would otherwise look like an added line.
        assert_eq!(find(diff, "++ b/x"), None);
        assert_eq!(find(diff, "new"), Some(DiffCoordinate::at(1, 1, Side::New)));
    }

    #[test]
    fn test_first_match_wins() {
        let diff = "@@ -5,2 +5,3 @@\n dup\n+dup\n dup\n";
        assert_eq!(locate(diff, "dup"), DiffCoordinate::at(5, 5, Side::New));
    }

    #[test]
    fn test_no_newline_marker_is_ignored() {
        let diff = "@@ -1,1 +1,2 @@\n-a\n\\ No newline at end of file\n+a\n+b\n";
        assert_eq!(locate(diff, "b"), DiffCoordinate::at(2, 1, Side::New));
    }

    #[test]
    fn test_crlf_diff() {
        let diff = "@@ -1,1 +1,2 @@\r\n x\r\n+y\r\n";
        assert_eq!(locate(diff, "y"), DiffCoordinate::at(2, 1, Side::New));
    }

    #[test]
    fn test_line_numbers_saturate_at_u32_max() {
        let diff = "@@ -4294967295 +4294967295 @@\n x\n-y\n z\n+w\n";
        assert_eq!(locate(diff, "x"), DiffCoordinate::at(u32::MAX, u32::MAX, Side::New));
        assert_eq!(locate(diff, "y"), DiffCoordinate::at(u32::MAX, u32::MAX, Side::Old));
        assert_eq!(locate(diff, "w"), DiffCoordinate::at(u32::MAX, u32::MAX, Side::New));
    }

    #[test]
    fn test_out_of_range_header_is_skipped() {
        let diff = "@@ -1,1 +1,1 @@\n a\n@@ -99999999999 +99999999999 @@\n b\n@@ -7 +8 @@\n c\n";
        assert_eq!(parse_hunk_header("@@ -99999999999 +1 @@"), None);
        assert_eq!(parse_hunk_header("@@ -3,2 +4 @@ fn main()"), Some((3, 4)));

        assert_eq!(find(diff, "b"), None);
        assert_eq!(find(diff, "c"), Some(DiffCoordinate::at(8, 8, Side::New)));
        assert_eq!(find(diff, "a"), Some(DiffCoordinate::at(1, 1, Side::New)));
    }

    #[test]
    fn test_side_serializes_as_review_side() {
        let json = serde_json::to_string(&DiffCoordinate::at(4, 2, Side::Old)).unwrap();
        assert_eq!(
            json,
            r#"{"line":4,"start_line":2,"start_side":"LEFT","side":"LEFT"}"#
        );
    }

    proptest! {
        #[test]
        fn added_line_round_trip(
            new_start in 1u32..10_000,
            count in 1usize..40,
            pick in 0usize..40,
        ) {
            let k = pick % count;
            let mut diff = format!("@@ -{},0 +{},{} @@\n", new_start, new_start, count);
            for i in 0..count {
                diff.push_str(&format!("+added line {}\n", i));
            }

            let coordinate = locate(&diff, &format!("added line {}", k));
            prop_assert_eq!(coordinate.side, Side::New);
            prop_assert_eq!(coordinate.line, new_start + k as u32);
            prop_assert_eq!(coordinate.start_line, new_start);
        }

        #[test]
        fn absent_text_yields_default(body in "[a-z \\n+-]{0,200}") {
            let diff = format!("@@ -1,1 +1,1 @@\n{}", body);
            prop_assert_eq!(locate(&diff, "NOT-PRESENT"), DiffCoordinate::default());
        }
    }
}
