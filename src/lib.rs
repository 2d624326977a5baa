//! Patchlens - multi-language static analysis for code review.
//!
//! Patchlens parses a source file with tree-sitter and reports what a
//! reviewer needs to know about it: cyclomatic and cognitive complexity,
//! Halstead metrics, function signatures, class hierarchies and module
//! dependencies. It also maps a source line onto a unified diff so review
//! comments land on the right line and side.
//!
//! # Architecture
//!
//! - `grammar`: language identifiers and the grammar registry
//! - `analysis`: tree walking and per-language structure extraction
//! - `metrics`: Halstead estimators and the precise Python path
//! - `diff`: unified-diff line locator
//! - `aggregate`: the final `AnalysisResult` record
//! - `engine`: runs the pipeline for one file or a batch
//! - `config`: YAML engine configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use patchlens::Engine;
//!
//! let engine = Engine::default();
//! let result = engine.analyze("def f(x):\n    return x\n", ".py");
//! assert_eq!(result.function_signatures()[0].name, "f");
//! ```

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod metrics;
pub mod report;

pub use aggregate::{aggregate, AnalysisResult, BaseMetrics, Issue};
pub use analysis::{ClassHierarchy, FunctionSignature, ParsedFile, Structure, StructureExtractor};
pub use config::{CyclomaticTraversal, EngineConfig};
pub use diff::{find, locate, try_locate, DiffCoordinate, Side};
pub use engine::{Engine, FileAnalysis, SourceFile};
pub use error::AnalysisError;
pub use grammar::{Grammar, GrammarRegistry, GrammarStatus, Language};
pub use metrics::{HalsteadCounts, HalsteadMetrics};
