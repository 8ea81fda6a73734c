use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::engine::SearchSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT` value, or JSON in production and pretty elsewhere
    pub fn resolve(raw: Option<&str>, env: &Environment) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("json") => Self::Json,
            Some("compact") => Self::Compact,
            Some("pretty") => Self::Pretty,
            _ if matches!(env, Environment::Prod) => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,
    pub log_format: LogFormat,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Model artifacts
    pub model_dir: String,
    pub positive_class_label: String,

    // Prediction log
    pub prediction_log_capacity: usize,

    // Recommendation search
    pub search: SearchSettings,
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_format = LogFormat::resolve(env::var("LOG_FORMAT").ok().as_deref(), &env);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Model artifacts
        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "./models".to_string());
        let positive_class_label =
            env::var("POSITIVE_CLASS_LABEL").unwrap_or_else(|_| "1".to_string());

        let prediction_log_capacity = parse_var("PREDICTION_LOG_CAPACITY", 500)?;

        // Recommendation search
        let defaults = SearchSettings::default();
        let search = SearchSettings {
            max_extra_workers: parse_var("SEARCH_MAX_EXTRA_WORKERS", defaults.max_extra_workers)?,
            max_extra_months: parse_var("SEARCH_MAX_EXTRA_MONTHS", defaults.max_extra_months)?,
            duration_step: parse_var("SEARCH_DURATION_STEP", defaults.duration_step)?,
            medium_target: parse_var("SEARCH_MEDIUM_TARGET", defaults.medium_target)?,
            low_target: parse_var("SEARCH_LOW_TARGET", defaults.low_target)?,
        };
        search
            .validate()
            .context("Invalid SEARCH_* settings")?;

        Ok(Settings {
            env,
            server_addr,
            log_format,
            cors_allow_origins,
            model_dir,
            positive_class_label,
            prediction_log_capacity,
            search,
        })
    }
}
