//! Patient search trait.

use async_trait::async_trait;

use crate::core::PatientStorage;
use crate::error::StorageResult;
use crate::types::{PatientQuery, PatientSummary};

/// Storage that can filter patients by demographics, risk factors and
/// diagnoses.
#[async_trait]
pub trait PatientSearchProvider: PatientStorage {
    /// Returns the summaries of every patient matching `query`.
    ///
    /// Present filters are ANDed; a patient matching through several related
    /// rows appears once. Results are in insertion order and not paginated.
    /// Contradictory age bounds yield an empty result rather than an error.
    async fn search_patients(&self, query: &PatientQuery) -> StorageResult<Vec<PatientSummary>>;
}
