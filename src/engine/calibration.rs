//! Domain calibration applied on top of raw model output.
//!
//! All category rules live in one [`CalibrationTable`] keyed by project type
//! and size; nothing here branches on a specific category name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ProjectRequest, ProjectSize};

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("cost band for '{project_type}' has invalid rates [{min_rate}, {max_rate}]")]
    InvalidBand {
        project_type: String,
        min_rate: f64,
        max_rate: f64,
    },

    #[error("delay floor {floor} is outside [0, 100]")]
    InvalidFloor { floor: f64 },

    #[error("probability bounds [{min}, {max}] are invalid")]
    InvalidBounds { min: f64, max: f64 },
}

/// Realistic cost per square metre (SAR) for a category, optionally per size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBand {
    pub project_type: String,
    #[serde(default)]
    pub project_size: Option<ProjectSize>,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl CostBand {
    fn matches(&self, request: &ProjectRequest) -> bool {
        self.project_type == request.project_type
            && self
                .project_size
                .map_or(true, |size| size == request.project_size)
    }
}

/// Minimum delay probability for under-resourced projects.
///
/// Applies when the workforce is at or below `max_workers` and the optional
/// type, size, area and schedule conditions hold. A schedule condition only
/// ever releases the floor for longer durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayFloor {
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub project_size: Option<ProjectSize>,
    pub max_workers: u32,
    #[serde(default)]
    pub min_area_m2: Option<f64>,
    /// Only applies to schedules at or below this many months
    #[serde(default)]
    pub max_duration_months: Option<f64>,
    /// Percent
    pub floor: f64,
}

impl DelayFloor {
    fn applies(&self, request: &ProjectRequest) -> bool {
        request.workers <= self.max_workers
            && self
                .project_type
                .as_ref()
                .map_or(true, |t| *t == request.project_type)
            && self
                .project_size
                .map_or(true, |size| size == request.project_size)
            && self
                .min_area_m2
                .map_or(true, |area| request.area_m2 >= area)
            && self
                .max_duration_months
                .map_or(true, |months| request.duration_months <= months)
    }
}

/// Declarative calibration rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    #[serde(default)]
    pub cost_bands: Vec<CostBand>,
    #[serde(default)]
    pub delay_floors: Vec<DelayFloor>,
    /// Calibrated probabilities never exceed this (percent)
    #[serde(default = "default_max_probability")]
    pub max_probability: f64,
    #[serde(default)]
    pub min_probability: f64,
    /// Project types whose screen count is a model input; zero elsewhere
    #[serde(default)]
    pub screen_types: Vec<String>,
}

fn default_max_probability() -> f64 {
    95.0
}

impl CalibrationTable {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for band in &self.cost_bands {
            let valid = band.min_rate.is_finite()
                && band.max_rate.is_finite()
                && band.min_rate >= 0.0
                && band.min_rate <= band.max_rate;
            if !valid {
                return Err(CalibrationError::InvalidBand {
                    project_type: band.project_type.clone(),
                    min_rate: band.min_rate,
                    max_rate: band.max_rate,
                });
            }
        }

        if let Some(bad) = self
            .delay_floors
            .iter()
            .find(|f| !(0.0..=100.0).contains(&f.floor))
        {
            return Err(CalibrationError::InvalidFloor { floor: bad.floor });
        }

        if !(0.0 <= self.min_probability
            && self.min_probability <= self.max_probability
            && self.max_probability <= 100.0)
        {
            return Err(CalibrationError::InvalidBounds {
                min: self.min_probability,
                max: self.max_probability,
            });
        }

        Ok(())
    }

    /// Band for the request; a size-specific band beats a type-wide one
    pub fn cost_band(&self, request: &ProjectRequest) -> Option<&CostBand> {
        let mut matching = self.cost_bands.iter().filter(|b| b.matches(request));
        let first = matching.next()?;
        if first.project_size.is_some() {
            return Some(first);
        }
        Some(
            matching
                .find(|b| b.project_size.is_some())
                .unwrap_or(first),
        )
    }

    pub fn counts_screens(&self, project_type: &str) -> bool {
        self.screen_types.iter().any(|t| t == project_type)
    }

    /// Request as the models should see it: screen counts are dropped for
    /// categories without screens.
    pub fn normalize(&self, request: &ProjectRequest) -> ProjectRequest {
        let mut normalized = request.clone();
        if !self.counts_screens(&request.project_type) {
            normalized.num_screens = 0;
        }
        normalized
    }

    /// Clamp a raw cost into the category band, if one is configured
    pub fn calibrate_cost(&self, raw_cost: f64, request: &ProjectRequest) -> f64 {
        let cost = match self.cost_band(request) {
            Some(band) => raw_cost
                .max(band.min_rate * request.area_m2)
                .min(band.max_rate * request.area_m2),
            None => raw_cost,
        };
        cost.max(0.0)
    }

    /// Highest applicable delay floor, if any (percent)
    pub fn delay_floor(&self, request: &ProjectRequest) -> Option<f64> {
        self.delay_floors
            .iter()
            .filter(|f| f.applies(request))
            .map(|f| f.floor)
            .reduce(f64::max)
    }

    /// Raise a raw delay probability (percent) to any applicable floor, then
    /// bound it.
    pub fn calibrate_delay(&self, raw_percent: f64, request: &ProjectRequest) -> f64 {
        let floored = match self.delay_floor(request) {
            Some(floor) => raw_percent.max(floor),
            None => raw_percent,
        };
        floored.max(self.min_probability).min(self.max_probability)
    }
}

fn band(project_type: &str, size: Option<ProjectSize>, min_rate: f64, max_rate: f64) -> CostBand {
    CostBand {
        project_type: project_type.to_string(),
        project_size: size,
        min_rate,
        max_rate,
    }
}

impl Default for CalibrationTable {
    /// Bands and floors for the standard BuildWise catalog
    fn default() -> Self {
        use ProjectSize::*;

        Self {
            cost_bands: vec![
                band("Residential Construction", Some(Small), 1500.0, 2800.0),
                band("Residential Construction", Some(Medium), 1700.0, 3200.0),
                band("Residential Construction", Some(Large), 2000.0, 3800.0),
                band("Building Finishing", None, 500.0, 1500.0),
                band("Commercial Fit-Out", None, 1200.0, 3500.0),
                band("Electrical Works", None, 250.0, 900.0),
                band("HVAC Installation", None, 1800.0, 4500.0),
                band("Smart Home Systems", None, 200.0, 1000.0),
                band("Security Systems", None, 100.0, 600.0),
            ],
            delay_floors: vec![
                DelayFloor {
                    project_type: None,
                    project_size: Some(Large),
                    max_workers: 5,
                    min_area_m2: None,
                    max_duration_months: Some(6.0),
                    floor: 70.0,
                },
                DelayFloor {
                    project_type: None,
                    project_size: Some(Medium),
                    max_workers: 3,
                    min_area_m2: None,
                    max_duration_months: None,
                    floor: 55.0,
                },
                DelayFloor {
                    project_type: Some("Electrical Works".to_string()),
                    project_size: Some(Large),
                    max_workers: 10,
                    min_area_m2: Some(2000.0),
                    max_duration_months: None,
                    floor: 75.0,
                },
                DelayFloor {
                    project_type: Some("Commercial Fit-Out".to_string()),
                    project_size: Some(Large),
                    max_workers: 8,
                    min_area_m2: Some(1500.0),
                    max_duration_months: Some(9.0),
                    floor: 72.0,
                },
            ],
            max_probability: default_max_probability(),
            min_probability: 0.0,
            screen_types: vec!["Digital Screens".to_string()],
        }
    }
}
