//! Hospital Patient Records Persistence Layer
//!
//! This crate stores patients and their medical records in a relational
//! schema and provides the patient search used by the REST layer.
//!
//! # Architecture
//!
//! - [`schema`] - Declarative table descriptions (columns, keys, defaults)
//! - [`types`] - Patient, related record and pagination types
//! - [`error`] - Error types for all operations
//! - [`core`] - Storage traits
//! - [`backends`] - Backend implementations (SQLite)
//!
//! # Quick Start
//!
//! ```no_run
//! use hospital_persistence::backends::sqlite::SqliteBackend;
//! use hospital_persistence::core::{PatientSearchProvider, PatientStorage};
//! use hospital_persistence::types::{PatientInput, PatientQuery};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! let input: PatientInput = serde_json::from_value(json!({
//!     "mrn": "MRN-0001",
//!     "first_name": "Ada",
//!     "last_name": "Lovelace",
//!     "date_of_birth": "1985-12-10",
//!     "gender": "female",
//!     "biological_sex": "female"
//! }))?;
//! let stored = backend.create_patient(input).await?;
//!
//! let matches = backend
//!     .search_patients(&PatientQuery::new().with_gender("female"))
//!     .await?;
//! assert_eq!(matches[0].patient_id, stored.patient.patient_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes

#![warn(missing_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod schema;
pub mod types;

pub use error::{StorageError, StorageResult};
