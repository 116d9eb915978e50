//! Core storage traits and abstractions.
//!
//! This module provides the foundational traits for the persistence layer:
//!
//! - [`PatientStorage`] - Patient CRUD and the patient chart
//! - [`PatientSearchProvider`] - Filtered patient search
//! - [`RecordStorage`] - Generic CRUD for related records and reference data
//!
//! # Trait Hierarchy
//!
//! ```text
//! PatientStorage
//!     └── PatientSearchProvider
//!
//! RecordStorage
//! ```

mod records;
mod search;
mod storage;

pub use records::RecordStorage;
pub use search::PatientSearchProvider;
pub use storage::PatientStorage;
