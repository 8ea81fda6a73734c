//! Domain types and DTOs
//!
//! These types define the data flowing between the HTTP layer and the risk engine.

pub mod prediction;
pub mod project;

// Re-export commonly used types
pub use prediction::*;
pub use project::*;
