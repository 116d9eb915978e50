//! HTTP request handlers.
//!
//! - [`patients`] - Patient CRUD, search and chart
//! - [`records`] - Generic CRUD for related records and reference data
//! - [`health`] - Health check endpoints

pub mod health;
pub mod patients;
pub mod records;

// Re-export handlers for convenience
pub use health::{health_handler, liveness_handler, readiness_handler};
