//! Service layer modules.
//!
//! Contains model artifact loading and the recent-predictions log.

pub mod model_store;
pub mod prediction_log;

pub use model_store::ModelStore;
pub use prediction_log::PredictionLog;
