use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::EngineError;

/// Project scale as reported by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
}

impl ProjectSize {
    pub const ALL: [ProjectSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

impl fmt::Display for ProjectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectSize {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Small" => Ok(Self::Small),
            "Medium" => Ok(Self::Medium),
            "Large" => Ok(Self::Large),
            other => Err(EngineError::InvalidCategory(format!(
                "unknown project size '{}'",
                other
            ))),
        }
    }
}

/// A single project description submitted for risk estimation.
///
/// Numeric ranges are validated by the caller; the engine encodes whatever
/// it is given. `num_screens` only reaches the models for the screen
/// categories listed in the calibration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project_type: String,
    pub project_size: ProjectSize,
    pub area_m2: f64,
    pub duration_months: f64,
    pub workers: u32,
    #[serde(default)]
    pub num_screens: u32,
}

impl ProjectRequest {
    pub fn new(
        project_type: impl Into<String>,
        project_size: ProjectSize,
        area_m2: f64,
        duration_months: f64,
        workers: u32,
        num_screens: Option<u32>,
    ) -> Self {
        Self {
            project_type: project_type.into(),
            project_size,
            area_m2,
            duration_months,
            workers,
            num_screens: num_screens.unwrap_or(0),
        }
    }

    /// Copy of this request with a different workforce
    pub fn with_workers(&self, workers: u32) -> Self {
        Self {
            workers,
            ..self.clone()
        }
    }

    /// Copy of this request with a different duration
    pub fn with_duration(&self, duration_months: f64) -> Self {
        Self {
            duration_months,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parses_exact_names() {
        assert_eq!("Large".parse::<ProjectSize>().unwrap(), ProjectSize::Large);
        assert_eq!(" Small ".parse::<ProjectSize>().unwrap(), ProjectSize::Small);
        assert!(matches!(
            "Huge".parse::<ProjectSize>(),
            Err(EngineError::InvalidCategory(_))
        ));
    }

    #[test]
    fn perturbations_keep_other_fields() {
        let req = ProjectRequest::new("HVAC Installation", ProjectSize::Large, 1000.0, 3.0, 2, None);
        let more = req.with_workers(7);
        assert_eq!(more.workers, 7);
        assert_eq!(more.duration_months, 3.0);
        assert_eq!(more.project_type, "HVAC Installation");

        let longer = req.with_duration(4.5);
        assert_eq!(longer.duration_months, 4.5);
        assert_eq!(longer.workers, 2);
        assert_eq!(longer.num_screens, 0);
    }
}
