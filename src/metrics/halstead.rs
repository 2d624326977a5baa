//! Halstead metrics.
//!
//! `estimate_generic` is a token-level approximation used for every language
//! without a dedicated estimator. It does not understand syntax: it splits
//! text into word tokens and single punctuation characters and checks each
//! against one fixed operator vocabulary. Multi-character entries in that
//! vocabulary (`==`, `&&`, `>>>`) can never match a single-character token;
//! the numbers are comparable between files, not faithful Halstead values.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Word tokens and single punctuation characters.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w+\b|[+\-*/=><!&|~^%{}()\[\];,.]").unwrap();
}

/// Fixed operator vocabulary of the generic estimator.
static OPERATORS: phf::Set<&'static str> = phf_set! {
    "+", "-", "*", "/", "=", ">", "<", "==", "!=", "&&", "||", "!", "++", "--",
    "+=", "-=", "*=", "/=", "%=", "&", "|", "^", "~", "<<", ">>", ">>>",
    "instanceof", "new", "delete", "typeof", "void", "in", "this", "super",
    "null", "true", "false", "{", "}", "(", ")", "[", "]", ";", ",", ".",
};

/// The four Halstead values reported for a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HalsteadMetrics {
    pub length: f64,
    pub vocabulary: f64,
    pub difficulty: f64,
    pub effort: f64,
}

/// Operator and operand tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalsteadCounts {
    /// n1
    pub distinct_operators: usize,
    /// n2
    pub distinct_operands: usize,
    /// N1
    pub total_operators: usize,
    /// N2
    pub total_operands: usize,
}

impl HalsteadCounts {
    /// Tally occurrence maps. Each key is one distinct operator or operand.
    pub fn from_occurrences<A: Ord, B: Ord>(
        operators: &BTreeMap<A, usize>,
        operands: &BTreeMap<B, usize>,
    ) -> Self {
        Self {
            distinct_operators: operators.len(),
            distinct_operands: operands.len(),
            total_operators: operators.values().sum(),
            total_operands: operands.values().sum(),
        }
    }

    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    /// `(n1/2) * (N2/n2)`, 0 when there are no operands.
    pub fn difficulty(&self) -> f64 {
        if self.distinct_operands == 0 {
            return 0.0;
        }
        (self.distinct_operators as f64 / 2.0)
            * (self.total_operands as f64 / self.distinct_operands as f64)
    }

    /// `length * log2(vocabulary)`, 0 for an empty vocabulary.
    pub fn volume(&self) -> f64 {
        let vocabulary = self.vocabulary();
        if vocabulary == 0 {
            return 0.0;
        }
        self.length() as f64 * (vocabulary as f64).log2()
    }

    /// Metrics of the generic estimator: `effort = difficulty * length`.
    pub fn generic_metrics(&self) -> HalsteadMetrics {
        if self.vocabulary() == 0 {
            return HalsteadMetrics::default();
        }
        let length = self.length() as f64;
        let difficulty = self.difficulty();
        HalsteadMetrics {
            length,
            vocabulary: self.vocabulary() as f64,
            difficulty,
            effort: difficulty * length,
        }
    }

    /// Textbook metrics: `effort = difficulty * volume`.
    pub fn standard_metrics(&self) -> HalsteadMetrics {
        let difficulty = self.difficulty();
        HalsteadMetrics {
            length: self.length() as f64,
            vocabulary: self.vocabulary() as f64,
            difficulty,
            effort: difficulty * self.volume(),
        }
    }
}

/// Tokenize `source` and tally operators and operands.
pub fn count_generic(source: &str) -> HalsteadCounts {
    let mut operators: BTreeMap<String, usize> = BTreeMap::new();
    let mut operands: BTreeMap<String, usize> = BTreeMap::new();

    for token in TOKEN_PATTERN.find_iter(source) {
        let text = token.as_str();
        if OPERATORS.contains(text) {
            *operators.entry(text.to_string()).or_insert(0) += 1;
        } else if !text.trim().is_empty() {
            *operands.entry(text.to_string()).or_insert(0) += 1;
        }
    }

    HalsteadCounts::from_occurrences(&operators, &operands)
}

/// Approximate Halstead metrics for any language.
pub fn estimate_generic(source: &str) -> HalsteadMetrics {
    count_generic(source).generic_metrics()
}
