mod api;
mod app;
mod config;
mod domain;
mod engine;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::Result;

use services::ModelStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env, settings.log_format);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        model_dir = %settings.model_dir,
        "Starting BuildWise backend"
    );

    // Artifacts are resolved once and shared read-only by every request
    let engine = ModelStore::new(&settings.model_dir)
        .load_engine(&settings.positive_class_label, settings.search.clone())?;

    let state = app::AppState::new(settings.clone(), engine);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
