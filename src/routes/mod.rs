pub mod health;
pub mod predict;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/catalog", get(predict::catalog))
        .route("/predict", post(predict::predict))
        .route("/predictions", get(predict::list_predictions))
}
