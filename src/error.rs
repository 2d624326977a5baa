//! Error taxonomy for the analysis engine.
//!
//! None of these errors escape `Engine::analyze`: every component converts
//! them into degraded-but-valid output and logs the cause.

use thiserror::Error;

/// Errors raised inside the analysis pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The extension is not in the registry, or its grammar failed to load.
    #[error("unsupported language: {0:?}")]
    UnsupportedLanguage(String),

    /// The grammar produced no tree for the source.
    #[error("failed to parse {language} source: {reason}")]
    ParseFailure {
        language: &'static str,
        reason: String,
    },

    /// A language-specific metrics delegate gave up.
    #[error("{estimator} estimator failed: {reason}")]
    EstimatorFailure {
        estimator: &'static str,
        reason: String,
    },

    /// No diff line carries the requested text.
    #[error("no diff line matches {0:?}")]
    NoDiffMatch(String),
}

impl AnalysisError {
    /// Short reason text used in placeholders and log fields.
    pub fn reason(&self) -> String {
        match self {
            AnalysisError::ParseFailure { reason, .. } => reason.clone(),
            AnalysisError::EstimatorFailure { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
