use crate::config::{Environment, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
///
/// Search probes log at trace level under `buildwise_backend::engine`, so
/// they only show up when asked for explicitly.
fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "buildwise_backend=debug,tower_http=debug,info",
        Environment::Staging => "buildwise_backend=debug,tower_http=info,info",
        Environment::Prod => "buildwise_backend=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
    }

    tracing::info!(format = ?format, "Logging initialized for {:?} environment", env);
}
