//! Risk estimation and recommendation engine.
//!
//! Pipeline per request: encode -> predict -> calibrate -> classify, then,
//! for anything above Low risk, a bounded search that re-runs the first three
//! stages on perturbed copies of the request.

pub mod calibration;
pub mod classifier;
pub mod encoder;
pub mod models;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use thiserror::Error;

pub use calibration::CalibrationTable;
pub use classifier::{classify, RiskLevel};
pub use encoder::{encode, Schema};
pub use models::{ModelBundle, ModelError};
pub use search::{SearchOutcome, SearchSettings, TierPlan};

use crate::domain::{PredictionResult, ProjectRequest};

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Project type or size not present in the schema
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// Inference failed; no default is ever substituted
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        Self::ModelUnavailable(err.to_string())
    }
}

/// Calibrated model output for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrated {
    pub cost: f64,
    /// Percent
    pub delay_probability: f64,
}

/// Stateless engine over a loaded model bundle.
///
/// Clones share the models and calibration table.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    models: ModelBundle,
    calibration: Arc<CalibrationTable>,
    search: SearchSettings,
}

impl RiskEngine {
    pub fn new(models: ModelBundle, calibration: CalibrationTable, search: SearchSettings) -> Self {
        Self {
            models,
            calibration: Arc::new(calibration),
            search,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.models.schema
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    fn check_categories(&self, request: &ProjectRequest) -> Result<(), EngineError> {
        let schema = self.schema();
        if !schema.recognizes_type(&request.project_type) {
            return Err(EngineError::InvalidCategory(format!(
                "unknown project type '{}'",
                request.project_type
            )));
        }
        if !schema.recognizes_size(request.project_size) {
            return Err(EngineError::InvalidCategory(format!(
                "unknown project size '{}'",
                request.project_size
            )));
        }
        Ok(())
    }

    /// Encode, run both models and apply calibration
    pub fn evaluate(&self, request: &ProjectRequest) -> Result<Calibrated, EngineError> {
        let features = encode(&self.calibration.normalize(request), self.schema());
        let raw_cost = self.models.cost(&features)?;
        let raw_delay = self.models.delay_probability(&features)? * 100.0;

        let calibrated = Calibrated {
            cost: self.calibration.calibrate_cost(raw_cost, request),
            delay_probability: self.calibration.calibrate_delay(raw_delay, request),
        };

        tracing::trace!(
            raw_cost,
            raw_delay,
            cost = calibrated.cost,
            delay = calibrated.delay_probability,
            "evaluated request"
        );

        Ok(calibrated)
    }

    /// Calibrated probability as reported, i.e. rounded to one decimal
    fn reported_delay(&self, request: &ProjectRequest) -> Result<f64, EngineError> {
        Ok(round_to_tenth(self.evaluate(request)?.delay_probability))
    }

    /// Smallest workforce increase reaching `target` (percent)
    pub fn search_workers(
        &self,
        request: &ProjectRequest,
        target: f64,
    ) -> Result<SearchOutcome<u32>, EngineError> {
        search::search_workers(request, target, &self.search, |r| self.reported_delay(r))
    }

    /// Smallest duration extension reaching `target` (percent)
    pub fn search_duration(
        &self,
        request: &ProjectRequest,
        target: f64,
    ) -> Result<SearchOutcome<f64>, EngineError> {
        search::search_duration(request, target, &self.search, |r| self.reported_delay(r))
    }

    /// Full prediction for one project
    pub fn predict(&self, request: &ProjectRequest) -> Result<PredictionResult, EngineError> {
        self.check_categories(request)?;

        let calibrated = self.evaluate(request)?;
        let delay_probability = round_to_tenth(calibrated.delay_probability);
        let risk_level = classify(delay_probability);

        let mut plans = Vec::new();
        for (tier, target) in self.search.targets_for(risk_level) {
            plans.push(TierPlan {
                tier,
                target,
                workers: self.search_workers(request, target)?,
                duration: self.search_duration(request, target)?,
            });
        }

        tracing::debug!(
            project_type = %request.project_type,
            project_size = %request.project_size,
            delay_probability,
            risk = %risk_level,
            tiers_searched = plans.len(),
            "prediction complete"
        );

        Ok(PredictionResult {
            estimated_cost: calibrated.cost.round(),
            delay_probability,
            risk_level,
            recommendations: search::assemble_recommendations(request, &plans, &self.search),
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
