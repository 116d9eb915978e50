//! Core patient storage trait.
//!
//! This module defines the [`PatientStorage`] trait, which provides the
//! fundamental CRUD operations for patients.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Pagination, PatientChart, PatientInput, StoredPatient};

/// Core storage trait for patients.
///
/// Patients are addressed by their server-assigned `patient_id`. Reads return
/// `None` for unknown ids; mutating operations on unknown ids fail with
/// `StorageError::Resource(NotFound)`.
///
/// # Example
///
/// ```ignore
/// use hospital_persistence::core::PatientStorage;
///
/// async fn example<S: PatientStorage>(storage: &S, input: PatientInput) -> StorageResult<()> {
///     let created = storage.create_patient(input.clone()).await?;
///     let id = created.patient.patient_id.to_string();
///
///     let read = storage.read_patient(&id).await?;
///     assert!(read.is_some());
///
///     storage.update_patient(&id, input).await?;
///     storage.delete_patient(&id).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait PatientStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend is reachable and answering queries.
    async fn health_check(&self) -> StorageResult<()>;

    /// Creates a new patient with a freshly assigned `patient_id`.
    ///
    /// # Errors
    ///
    /// * `StorageError::Backend` - On constraint violations such as a duplicate `mrn`
    async fn create_patient(&self, input: PatientInput) -> StorageResult<StoredPatient>;

    /// Reads a patient by ID.
    async fn read_patient(&self, id: &str) -> StorageResult<Option<StoredPatient>>;

    /// Lists patients in insertion order.
    async fn list_patients(&self, page: Pagination) -> StorageResult<Vec<StoredPatient>>;

    /// Replaces every declared field of an existing patient.
    ///
    /// Omitted optional fields are cleared. `created_at` is preserved and
    /// `updated_at` refreshed.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(NotFound)` - If the patient doesn't exist
    async fn update_patient(&self, id: &str, input: PatientInput) -> StorageResult<StoredPatient>;

    /// Permanently deletes a patient and the records it owns.
    ///
    /// # Returns
    ///
    /// The patient as it was before deletion.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(NotFound)` - If the patient doesn't exist
    async fn delete_patient(&self, id: &str) -> StorageResult<StoredPatient>;

    /// Reads a patient together with every record it owns.
    async fn read_chart(&self, id: &str) -> StorageResult<Option<PatientChart>>;
}
