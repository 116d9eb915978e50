//! Related record storage trait.
//!
//! [`RecordStorage`] provides CRUD for every [`Record`] type through a single
//! set of generic operations. Patient-owned records are always addressed
//! through their owning patient; reference data is addressed without one.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Pagination, Record};

/// Generic CRUD over the declared record tables.
///
/// The `owner` argument is the owning patient's id for patient-owned tables
/// and `None` for reference data.
///
/// # Errors
///
/// Every operation fails with:
///
/// * `StorageError::Validation(MissingOwner)` - If a patient-owned table is addressed without an owner
/// * `StorageError::Validation(InvalidRecord)` - If reference data is addressed with an owner
/// * `StorageError::Resource(NotFound)` - If the owning patient doesn't exist
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Creates a record with a freshly assigned id.
    async fn create_record<R: Record>(&self, owner: Option<&str>, input: R::Input) -> StorageResult<R>;

    /// Reads a record by id. A record belonging to another patient is `None`.
    async fn read_record<R: Record>(&self, owner: Option<&str>, id: &str) -> StorageResult<Option<R>>;

    /// Lists records in insertion order.
    async fn list_records<R: Record>(
        &self,
        owner: Option<&str>,
        page: Pagination,
    ) -> StorageResult<Vec<R>>;

    /// Replaces every declared column of an existing record.
    ///
    /// Omitted optional columns are cleared; omitted columns with a time
    /// default keep their stored value.
    async fn update_record<R: Record>(
        &self,
        owner: Option<&str>,
        id: &str,
        input: R::Input,
    ) -> StorageResult<R>;

    /// Permanently deletes a record, returning its prior state.
    async fn delete_record<R: Record>(&self, owner: Option<&str>, id: &str) -> StorageResult<R>;
}
