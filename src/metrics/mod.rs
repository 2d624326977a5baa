//! Complexity estimators that are not plain tree walks.
//!
//! - `halstead`: the generic token-level Halstead estimator, for any text
//! - `python`: radon-compatible Halstead and block cyclomatic complexity

pub mod halstead;
pub mod python;

pub use halstead::{estimate_generic, HalsteadCounts, HalsteadMetrics};
