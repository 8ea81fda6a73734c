//! Deterministic model fixtures shared by engine and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::encoder::{FeatureVector, Schema};
use super::models::{DelayClassifier, LinearRegressor, ModelBundle, ModelError};
use super::{CalibrationTable, RiskEngine, SearchSettings};

pub const DEFAULT_COLUMNS: &[&str] = &[
    "area_m2",
    "duration_months",
    "workers",
    "num_screens",
    "project_type_Building Finishing",
    "project_type_Commercial Fit-Out",
    "project_type_Digital Screens",
    "project_type_Electrical Works",
    "project_type_HVAC Installation",
    "project_type_Residential Construction",
    "project_type_Security Systems",
    "project_type_Smart Home Systems",
    "project_size_Large",
    "project_size_Medium",
    "project_size_Small",
];

/// Delay probability `0.80 - 0.04 * workers - 0.03 * months`, bounded to
/// [0.01, 0.99]. Classes are listed delayed-first on purpose.
struct ToyDelayModel {
    classes: Vec<String>,
    width: usize,
    workers: Option<usize>,
    months: Option<usize>,
}

impl DelayClassifier for ToyDelayModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.width {
            return Err(ModelError::FeatureMismatch {
                expected: self.width,
                actual: features.len(),
            });
        }
        let read = |slot: Option<usize>| slot.and_then(|i| features.values().get(i).copied()).unwrap_or(0.0);
        let p = (0.80 - 0.04 * read(self.workers) - 0.03 * read(self.months)).clamp(0.01, 0.99);
        Ok(vec![p, 1.0 - p])
    }
}

/// Always returns the same delayed probability and counts calls
struct FixedDelayModel {
    classes: Vec<String>,
    probability: f64,
    calls: Arc<AtomicUsize>,
}

impl DelayClassifier for FixedDelayModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0 - self.probability, self.probability])
    }
}

/// 500 SAR per square metre, nothing else
fn toy_cost(columns: &[&str]) -> LinearRegressor {
    let coefficients = columns
        .iter()
        .map(|c| if *c == "area_m2" { 500.0 } else { 0.0 })
        .collect();
    LinearRegressor {
        intercept: 0.0,
        coefficients,
    }
}

fn position(columns: &[&str], name: &str) -> Option<usize> {
    columns.iter().position(|c| *c == name)
}

pub fn toy_bundle(columns: &[&str]) -> ModelBundle {
    let schema = Schema::from_columns(columns.iter().copied());
    let delay = ToyDelayModel {
        classes: vec!["1".to_string(), "0".to_string()],
        width: schema.len(),
        workers: position(columns, "workers"),
        months: position(columns, "duration_months"),
    };
    let cost = toy_cost(columns);
    ModelBundle::new(schema, Arc::new(cost), Arc::new(delay), "1")
}

pub fn fixed_delay_bundle(probability: f64) -> (ModelBundle, Arc<AtomicUsize>) {
    let schema = Schema::from_columns(DEFAULT_COLUMNS.iter().copied());
    let calls = Arc::new(AtomicUsize::new(0));
    let delay = FixedDelayModel {
        classes: vec!["0".to_string(), "1".to_string()],
        probability,
        calls: calls.clone(),
    };
    let cost = toy_cost(DEFAULT_COLUMNS);
    (
        ModelBundle::new(schema, Arc::new(cost), Arc::new(delay), "1"),
        calls,
    )
}

pub fn engine_with(bundle: ModelBundle) -> RiskEngine {
    RiskEngine::new(bundle, CalibrationTable::default(), SearchSettings::default())
}

pub fn engine() -> RiskEngine {
    engine_with(toy_bundle(DEFAULT_COLUMNS))
}
