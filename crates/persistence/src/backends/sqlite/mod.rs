//! SQLite backend implementation.
//!
//! This module provides a complete SQLite implementation of the storage
//! traits. It supports both in-memory databases (great for testing) and
//! file-based databases.
//!
//! # Features
//!
//! - In-memory and file-based modes
//! - One pooled connection and, for writes, one transaction per operation
//! - Foreign keys enforced on every pooled connection
//! - Patient search with correlated `EXISTS` filters
//!
//! # Example
//!
//! ```no_run
//! use hospital_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an in-memory database
//! let backend = SqliteBackend::in_memory()?;
//!
//! // Initialize the schema
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! Every table is generated from [`crate::schema`]. Patient-owned tables
//! reference `patients(patient_id)` with `ON DELETE CASCADE`; other
//! references are plain foreign keys. The schema version lives in a
//! `schema_version` table.

mod backend;
mod query_builder;
mod records;
mod schema;
mod search;
mod storage;
mod values;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use query_builder::{SqlFragment, SqlParam};
pub use schema::SCHEMA_VERSION;
pub use search::PatientSearchBuilder;
