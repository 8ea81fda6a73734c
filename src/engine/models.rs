//! Predictor interfaces and the artifact formats we know how to load.
//!
//! The engine only depends on [`CostRegressor`] and [`DelayClassifier`]; any
//! model family that maps a feature vector to a cost or to per-class
//! probabilities can sit behind them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::encoder::{FeatureVector, Schema};

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("feature width mismatch: model expects {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite value")]
    NonFinite,

    #[error("classifier returned {actual} probabilities for {expected} classes")]
    MalformedOutput { expected: usize, actual: usize },

    #[error("classifier has no '{0}' class")]
    MissingClass(String),

    #[error("{0}")]
    Backend(String),
}

/// Point estimate of total project cost
pub trait CostRegressor: Send + Sync {
    fn estimate_cost(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// Binary delay classifier exposing per-class probabilities
pub trait DelayClassifier: Send + Sync {
    /// Class labels, index-aligned with [`DelayClassifier::predict_proba`]
    fn classes(&self) -> &[String];

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

fn check_width(expected: usize, features: &FeatureVector) -> Result<(), ModelError> {
    if features.is_empty() || features.len() != expected {
        return Err(ModelError::FeatureMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

fn dot(coefficients: &[f64], features: &FeatureVector) -> f64 {
    coefficients
        .iter()
        .zip(features.values())
        .map(|(c, x)| c * x)
        .sum()
}

/// Ordinary linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl CostRegressor for LinearRegressor {
    fn estimate_cost(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        check_width(self.coefficients.len(), features)?;
        let value = self.intercept + dot(&self.coefficients, features);
        if !value.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(value)
    }
}

/// Two-class logistic regression.
///
/// The decision function scores `classes[1]`; `classes[0]` gets the complement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub classes: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl DelayClassifier for LogisticClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        check_width(self.coefficients.len(), features)?;
        if self.classes.len() != 2 {
            return Err(ModelError::Backend(format!(
                "logistic classifier needs exactly 2 classes, has {}",
                self.classes.len()
            )));
        }
        let z = self.intercept + dot(&self.coefficients, features);
        let p = 1.0 / (1.0 + (-z).exp());
        if !p.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(vec![1.0 - p, p])
    }
}

/// Cost model artifact as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostArtifact {
    Linear(LinearRegressor),
}

impl CostArtifact {
    pub fn width(&self) -> usize {
        match self {
            Self::Linear(m) => m.coefficients.len(),
        }
    }

    pub fn into_model(self) -> Arc<dyn CostRegressor> {
        match self {
            Self::Linear(m) => Arc::new(m),
        }
    }
}

/// Delay model artifact as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayArtifact {
    Logistic(LogisticClassifier),
}

impl DelayArtifact {
    pub fn width(&self) -> usize {
        match self {
            Self::Logistic(m) => m.coefficients.len(),
        }
    }

    pub fn into_model(self) -> Arc<dyn DelayClassifier> {
        match self {
            Self::Logistic(m) => Arc::new(m),
        }
    }
}

/// Loaded, read-only predictors together with the layout they were trained on.
///
/// Cloning shares the underlying models.
#[derive(Clone)]
pub struct ModelBundle {
    pub schema: Arc<Schema>,
    pub cost: Arc<dyn CostRegressor>,
    pub delay: Arc<dyn DelayClassifier>,
    /// Label of the "delayed" outcome in the classifier's class list
    pub positive_class: String,
}

impl ModelBundle {
    pub fn new(
        schema: Schema,
        cost: Arc<dyn CostRegressor>,
        delay: Arc<dyn DelayClassifier>,
        positive_class: impl Into<String>,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            cost,
            delay,
            positive_class: positive_class.into(),
        }
    }

    /// Raw cost estimate
    pub fn cost(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.cost.estimate_cost(features)
    }

    /// Raw probability of the delayed outcome, in [0, 1].
    ///
    /// Looks the positive class up by label; class order is not stable across
    /// artifacts.
    pub fn delay_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let classes = self.delay.classes();
        let index = classes
            .iter()
            .position(|c| *c == self.positive_class)
            .ok_or_else(|| ModelError::MissingClass(self.positive_class.clone()))?;

        let proba = self.delay.predict_proba(features)?;
        if proba.len() != classes.len() {
            return Err(ModelError::MalformedOutput {
                expected: classes.len(),
                actual: proba.len(),
            });
        }

        let p = proba[index];
        if !p.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(p.clamp(0.0, 1.0))
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("schema_width", &self.schema.len())
            .field("positive_class", &self.positive_class)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier {
        classes: Vec<String>,
        proba: Vec<f64>,
    }

    impl DelayClassifier for FixedClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            Ok(self.proba.clone())
        }
    }

    fn bundle(classes: &[&str], proba: Vec<f64>, positive: &str) -> ModelBundle {
        ModelBundle::new(
            Schema::from_columns(["workers"]),
            Arc::new(LinearRegressor {
                intercept: 0.0,
                coefficients: vec![1.0],
            }),
            Arc::new(FixedClassifier {
                classes: classes.iter().map(|c| c.to_string()).collect(),
                proba,
            }),
            positive,
        )
    }

    #[test]
    fn linear_regressor_checks_width() {
        let model = LinearRegressor {
            intercept: 100.0,
            coefficients: vec![2.0, 3.0],
        };
        assert_eq!(
            model.estimate_cost(&FeatureVector::new(vec![10.0, 1.0])),
            Ok(123.0)
        );
        assert_eq!(
            model.estimate_cost(&FeatureVector::new(vec![10.0])),
            Err(ModelError::FeatureMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn logistic_scores_second_class() {
        let model = LogisticClassifier {
            classes: vec!["0".to_string(), "1".to_string()],
            intercept: 0.0,
            coefficients: vec![0.0],
        };
        let proba = model.predict_proba(&FeatureVector::new(vec![5.0])).unwrap();
        assert_eq!(proba, vec![0.5, 0.5]);
    }

    #[test]
    fn positive_class_found_by_label_not_position() {
        let features = FeatureVector::new(vec![1.0]);

        let ordered = bundle(&["0", "1"], vec![0.2, 0.8], "1");
        assert_eq!(ordered.delay_probability(&features), Ok(0.8));

        let reversed = bundle(&["delayed", "on_time"], vec![0.8, 0.2], "delayed");
        assert_eq!(reversed.delay_probability(&features), Ok(0.8));
    }

    #[test]
    fn missing_positive_class_is_an_error() {
        let b = bundle(&["0", "1"], vec![0.2, 0.8], "delayed");
        assert_eq!(
            b.delay_probability(&FeatureVector::new(vec![1.0])),
            Err(ModelError::MissingClass("delayed".to_string()))
        );
    }

    #[test]
    fn malformed_probability_output_is_an_error() {
        let b = bundle(&["0", "1"], vec![1.0], "1");
        assert!(matches!(
            b.delay_probability(&FeatureVector::new(vec![1.0])),
            Err(ModelError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn artifacts_deserialize_by_kind() {
        let cost: CostArtifact = serde_json::from_str(
            r#"{"kind":"linear","intercept":5.0,"coefficients":[1.0,2.0]}"#,
        )
        .unwrap();
        assert_eq!(cost.width(), 2);

        let delay: DelayArtifact = serde_json::from_str(
            r#"{"kind":"logistic","classes":["0","1"],"intercept":0.0,"coefficients":[1.0]}"#,
        )
        .unwrap();
        assert_eq!(delay.width(), 1);
        assert_eq!(delay.into_model().classes(), &["0".to_string(), "1".to_string()]);
    }
}
