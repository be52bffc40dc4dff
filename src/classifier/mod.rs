//! The probabilistic classifier behind the scoring pipeline.
//!
//! The pipeline only sees the [`Classifier`] trait: a column list and a
//! probability for a row laid out in that order. Tests plug in scripted
//! stubs; production loads a [`LogisticModel`] artifact.

pub mod logistic;

pub use logistic::LogisticModel;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    /// Signed contribution to the decision value.
    pub weight: f64,
}

pub trait Classifier: Send + Sync {
    /// Feature columns in the order `predict_probability` expects.
    fn expected_columns(&self) -> &[String];

    /// Probability that the row is malicious. Callers must not assume the
    /// result is finite or inside `[0, 1]`.
    fn predict_probability(&self, row: &[f64]) -> f64;

    /// Per-feature contributions, largest magnitude first. Empty when the
    /// classifier cannot attribute its output.
    fn feature_contributions(&self, _row: &[f64]) -> Vec<FeatureContribution> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "classifier"
    }
}
