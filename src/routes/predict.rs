//! Risk prediction endpoints.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::domain::{
    CatalogResponse, PredictRequest, PredictionRecord, PredictionResult, ProjectSize,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::request_id::request_id;

/// Estimate cost and delay risk for a project.
///
/// POST /predict
pub async fn predict(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PredictRequest>,
) -> ApiResult<Json<DataResponse<PredictionResult>>> {
    req.validate().map_err(ApiError::BadRequest)?;
    let size: ProjectSize = req.project_size.parse()?;
    let request = req.into_project_request(size);

    tracing::info!(
        request_id = request_id(&headers).as_deref().unwrap_or("-"),
        project_type = %request.project_type,
        project_size = %request.project_size,
        area_m2 = request.area_m2,
        duration_months = request.duration_months,
        workers = request.workers,
        "Running prediction"
    );

    // Search may issue dozens of inference calls; keep them off the reactor
    let engine = state.engine.clone();
    let (request, result) = tokio::task::spawn_blocking(move || {
        let result = engine.predict(&request);
        (request, result)
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("prediction task failed: {}", e)))?;
    let result = result?;

    tracing::info!(
        estimated_cost = result.estimated_cost,
        delay_probability = result.delay_probability,
        risk = %result.risk_level,
        recommendations = result.recommendations.len(),
        "Prediction complete"
    );

    state
        .predictions
        .record(PredictionRecord::new(&request, &result));

    Ok(Json(DataResponse::new(result)))
}

/// Most recent predictions, newest first.
///
/// GET /predictions
pub async fn list_predictions(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Paginated<PredictionRecord> {
    let (total, items) = state
        .predictions
        .page(pagination.offset() as usize, pagination.limit() as usize);

    Paginated::new(items, &pagination, total as u64)
}

/// Categories the loaded models understand.
///
/// GET /catalog
pub async fn catalog(State(state): State<Arc<AppState>>) -> Json<DataResponse<CatalogResponse>> {
    let schema = state.engine.schema();
    Json(DataResponse::new(CatalogResponse {
        project_types: schema.project_types(),
        project_sizes: schema.project_sizes(),
    }))
}
