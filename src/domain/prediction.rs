//! Prediction payloads exchanged with the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::{ProjectRequest, ProjectSize};
use crate::engine::RiskLevel;

/// Engine output for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Whole currency units (SAR)
    pub estimated_cost: f64,
    /// Percent, one decimal place
    pub delay_probability: f64,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

/// Request DTO for `POST /predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub project_type: String,
    pub project_size: String,
    pub area_m2: f64,
    pub duration_months: f64,
    pub workers: i64,
    #[serde(default)]
    pub num_screens: Option<i64>,
}

impl PredictRequest {
    pub const MIN_DURATION_MONTHS: f64 = 0.5;

    /// Range checks that belong to the caller of the engine.
    ///
    /// Category names are not checked here; the engine rejects those against
    /// the loaded schema.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.area_m2.is_finite() && self.area_m2 > 0.0) {
            return Err("area_m2 must be a positive number".to_string());
        }
        if !(self.duration_months.is_finite()
            && self.duration_months >= Self::MIN_DURATION_MONTHS)
        {
            return Err(format!(
                "duration_months must be at least {}",
                Self::MIN_DURATION_MONTHS
            ));
        }
        if self.workers < 1 || self.workers > i64::from(u32::MAX) {
            return Err("workers must be a positive integer".to_string());
        }
        if let Some(screens) = self.num_screens {
            if screens < 0 || screens > i64::from(u32::MAX) {
                return Err("num_screens must be a non-negative integer".to_string());
            }
        }
        Ok(())
    }

    /// Convert a validated DTO into an engine request.
    pub fn into_project_request(self, size: ProjectSize) -> ProjectRequest {
        ProjectRequest::new(
            self.project_type,
            size,
            self.area_m2,
            self.duration_months,
            self.workers as u32,
            self.num_screens.map(|n| n as u32),
        )
    }
}

/// One entry of the recent-predictions log
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub project_type: String,
    pub project_size: ProjectSize,
    pub area_m2: f64,
    pub duration_months: f64,
    pub workers: u32,
    pub estimated_cost: f64,
    pub delay_probability: f64,
    pub risk_level: RiskLevel,
}

impl PredictionRecord {
    pub fn new(request: &ProjectRequest, result: &PredictionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            project_type: request.project_type.clone(),
            project_size: request.project_size,
            area_m2: request.area_m2,
            duration_months: request.duration_months,
            workers: request.workers,
            estimated_cost: result.estimated_cost,
            delay_probability: result.delay_probability,
            risk_level: result.risk_level,
        }
    }
}

/// Catalog of categories recognized by the loaded schema
#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub project_types: Vec<String>,
    pub project_sizes: Vec<ProjectSize>,
}
