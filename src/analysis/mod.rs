//! Tree-based code analysis.
//!
//! This module turns source text into a tree-sitter tree and reads two kinds
//! of information from it:
//! - Tree metrics (cyclomatic and cognitive complexity, the S-expression dump)
//! - Structure (function signatures, class hierarchies, module dependencies)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Source text │──▶│ Grammar      │──▶│ walker     │──▶│ ParsedFile   │
//! └─────────────┘   │ Registry     │   │ ::parse    │   └──────┬───────┘
//!                   └──────────────┘   └────────────┘          │
//!                            ┌─────────────────────────────────┤
//!                            ▼                                 ▼
//!                   ┌──────────────┐                  ┌────────────────┐
//!                   │ walker       │                  │ Structure      │
//!                   │ (complexity, │                  │ Extractors     │
//!                   │  tree dump)  │                  │ (per language) │
//!                   └──────────────┘                  └────────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Add a variant to `grammar::Language` and its grammar crate
//! 2. Create a module in `src/analysis/languages/` implementing `StructureExtractor`
//! 3. Register the extractor in `languages/mod.rs`
//!
//! See `languages/go.rs` for a reference implementation.

mod facts;
mod languages;
mod traits;
pub mod walker;

pub use facts::{
    normalize_dependencies, strip_quotes, ClassHierarchy, FunctionSignature, Structure,
    ANONYMOUS_NAME, UNKNOWN_NAME,
};
pub use languages::{
    extractor_for, GoExtractor, JavaExtractor, JavaScriptExtractor, PythonExtractor,
    TypeScriptExtractor,
};
pub use traits::{ParsedFile, StructureExtractor};

pub(crate) use languages::unwrap_decorated;
