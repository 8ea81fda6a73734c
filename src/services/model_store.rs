//! Loads the model artifacts once at startup.
//!
//! Expected layout of the model directory:
//! - `schema.json`: ordered list of feature column names
//! - `cost_model.json`: cost regressor artifact
//! - `delay_model.json`: delay classifier artifact
//! - `calibration.json` (optional): calibration table

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::models::{CostArtifact, DelayArtifact};
use crate::engine::{CalibrationTable, ModelBundle, RiskEngine, Schema, SearchSettings};

pub const SCHEMA_FILE: &str = "schema.json";
pub const COST_MODEL_FILE: &str = "cost_model.json";
pub const DELAY_MODEL_FILE: &str = "delay_model.json";
pub const CALIBRATION_FILE: &str = "calibration.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolved artifact locations
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn load_schema(&self) -> Result<Schema> {
        let columns: Vec<String> = read_json(&self.path(SCHEMA_FILE))?;
        let schema = Schema::from_columns(columns);
        if schema.is_empty() {
            bail!("{} lists no columns", SCHEMA_FILE);
        }
        Ok(schema)
    }

    /// Load schema and both models, checking they agree on feature width
    pub fn load_models(&self, positive_class: &str) -> Result<ModelBundle> {
        let schema = self.load_schema()?;
        let cost: CostArtifact = read_json(&self.path(COST_MODEL_FILE))?;
        let delay: DelayArtifact = read_json(&self.path(DELAY_MODEL_FILE))?;

        if cost.width() != schema.len() {
            bail!(
                "cost model expects {} features but schema has {}",
                cost.width(),
                schema.len()
            );
        }
        if delay.width() != schema.len() {
            bail!(
                "delay model expects {} features but schema has {}",
                delay.width(),
                schema.len()
            );
        }

        let delay = delay.into_model();
        if !delay.classes().iter().any(|c| c == positive_class) {
            bail!(
                "delay model classes {:?} do not include '{}'",
                delay.classes(),
                positive_class
            );
        }

        tracing::info!(
            dir = %self.dir.display(),
            features = schema.len(),
            project_types = schema.project_types().len(),
            "Model artifacts loaded"
        );

        Ok(ModelBundle::new(
            schema,
            cost.into_model(),
            delay,
            positive_class,
        ))
    }

    /// Calibration table from disk, or the built-in one if none is present
    pub fn load_calibration(&self) -> Result<CalibrationTable> {
        let path = self.path(CALIBRATION_FILE);
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "No calibration table found - using built-in defaults"
            );
            return Ok(CalibrationTable::default());
        }

        let table: CalibrationTable = read_json(&path)?;
        table
            .validate()
            .with_context(|| format!("Invalid calibration table {}", path.display()))?;

        tracing::info!(
            cost_bands = table.cost_bands.len(),
            delay_floors = table.delay_floors.len(),
            "Calibration table loaded"
        );
        Ok(table)
    }

    pub fn load_engine(&self, positive_class: &str, search: SearchSettings) -> Result<RiskEngine> {
        let models = self.load_models(positive_class)?;
        let calibration = self.load_calibration()?;
        Ok(RiskEngine::new(models, calibration, search))
    }
}
