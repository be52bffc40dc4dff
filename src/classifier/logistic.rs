//! Logistic-regression artifact.
//!
//! ```json
//! {
//!   "columns": ["is_https", "url_len", ...],
//!   "coefficients": [-0.8, 0.35, ...],
//!   "intercept": -1.2,
//!   "metadata": { "name": "url-lr", "trained_on": "2025-11-02" }
//! }
//! ```

use super::{Classifier, FeatureContribution};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    columns: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default)]
    metadata: ModelMetadata,
}

impl LogisticModel {
    pub fn new(
        columns: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ModelError> {
        let model = Self {
            columns,
            coefficients,
            intercept,
            metadata: ModelMetadata::default(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&content)?;
        log::info!(
            "Loaded logistic model from {} ({} columns)",
            path.display(),
            model.columns.len()
        );
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.columns.is_empty() {
            return Err(ModelError::NoColumns);
        }
        if self.columns.len() != self.coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                columns: self.columns.len(),
                coefficients: self.coefficients.len(),
            });
        }

        let mut seen = HashSet::new();
        for (column, weight) in self.columns.iter().zip(&self.coefficients) {
            if !seen.insert(column.as_str()) {
                return Err(ModelError::DuplicateColumn(column.clone()));
            }
            if !weight.is_finite() {
                return Err(ModelError::NonFiniteWeight(column.clone()));
            }
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFiniteWeight("intercept".to_string()));
        }
        Ok(())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// `intercept + w·x`. A short row is treated as zero-filled.
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict_probability(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision_function(row))
    }

    fn feature_contributions(&self, row: &[f64]) -> Vec<FeatureContribution> {
        let mut contributions: Vec<FeatureContribution> = self
            .columns
            .iter()
            .zip(&self.coefficients)
            .zip(row)
            .map(|((column, weight), value)| FeatureContribution {
                feature: column.clone(),
                weight: weight * value,
            })
            .filter(|c| c.weight != 0.0)
            .collect();
        contributions.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));
        contributions
    }

    fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("logistic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_probability_is_sigmoid_of_decision() {
        let model = LogisticModel::new(columns(&["a", "b"]), vec![2.0, -1.0], 0.5).unwrap();
        assert!((model.decision_function(&[1.0, 3.0]) - (-0.5)).abs() < 1e-12);

        let expected = 1.0 / (1.0 + 0.5f64.exp());
        assert!((model.predict_probability(&[1.0, 3.0]) - expected).abs() < 1e-12);
        assert!((model.predict_probability(&[0.0, 0.0]) - sigmoid(0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_is_stable_for_large_inputs() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_json() {
        let model = LogisticModel::from_json(
            r#"{"columns": ["is_ip", "is_https"], "coefficients": [1.5, -0.5], "intercept": -2.0,
                "metadata": {"name": "fixture"}}"#,
        )
        .unwrap();
        assert_eq!(model.expected_columns(), &["is_ip".to_string(), "is_https".to_string()]);
        assert_eq!(model.name(), "fixture");
        assert_eq!(model.intercept(), -2.0);
    }

    #[test]
    fn test_metadata_is_optional() {
        let model =
            LogisticModel::from_json(r#"{"columns": ["x"], "coefficients": [1.0], "intercept": 0.0}"#)
                .unwrap();
        assert_eq!(model.metadata(), &ModelMetadata::default());
        assert_eq!(model.name(), "logistic");
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            LogisticModel::new(vec![], vec![], 0.0),
            Err(ModelError::NoColumns)
        ));
        assert!(matches!(
            LogisticModel::new(columns(&["a", "b"]), vec![1.0], 0.0),
            Err(ModelError::ShapeMismatch {
                columns: 2,
                coefficients: 1
            })
        ));
        assert!(matches!(
            LogisticModel::new(columns(&["a", "a"]), vec![1.0, 1.0], 0.0),
            Err(ModelError::DuplicateColumn(name)) if name == "a"
        ));
        assert!(matches!(
            LogisticModel::new(columns(&["a"]), vec![f64::NAN], 0.0),
            Err(ModelError::NonFiniteWeight(_))
        ));
        assert!(matches!(
            LogisticModel::new(columns(&["a"]), vec![1.0], f64::INFINITY),
            Err(ModelError::NonFiniteWeight(name)) if name == "intercept"
        ));
        assert!(matches!(
            LogisticModel::from_json("{not json"),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn test_contributions_sorted_by_magnitude() {
        let model =
            LogisticModel::new(columns(&["a", "b", "c"]), vec![0.5, -3.0, 1.0], 0.0).unwrap();
        let contributions = model.feature_contributions(&[2.0, 1.0, 0.0]);
        let names: Vec<&str> = contributions.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(contributions[0].weight, -3.0);
        assert_eq!(contributions[1].weight, 1.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = LogisticModel::new(columns(&["a"]), vec![1.0], -1.0).unwrap();
        fs::write(&path, model.to_json().unwrap()).unwrap();

        let loaded = LogisticModel::load_from_file(&path).unwrap();
        assert_eq!(loaded, model);

        let missing = LogisticModel::load_from_file(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ModelError::Io { .. })));
    }
}
