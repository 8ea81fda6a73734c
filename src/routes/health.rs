use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub models: ModelHealth,
}

#[derive(Serialize)]
pub struct ModelHealth {
    pub features: usize,
    pub project_types: usize,
    pub cost_bands: usize,
    pub delay_floors: usize,
}

/// Health check endpoint.
///
/// Models are loaded before the listener starts, so a running process always
/// has them.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine = &state.engine;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models: ModelHealth {
            features: engine.schema().len(),
            project_types: engine.schema().project_types().len(),
            cost_bands: engine.calibration().cost_bands.len(),
            delay_floors: engine.calibration().delay_floors.len(),
        },
    })
}
