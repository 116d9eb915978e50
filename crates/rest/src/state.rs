//! Application state for the patient records API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the storage backend and the server configuration.

use std::sync::Arc;

use hospital_persistence::core::PatientStorage;

use crate::config::ServerConfig;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`PatientStorage`])
///
/// # Example
///
/// ```rust,ignore
/// use hospital_rest::{AppState, ServerConfig};
/// use hospital_persistence::backends::sqlite::SqliteBackend;
/// use std::sync::Arc;
///
/// let backend = SqliteBackend::in_memory()?;
/// let config = ServerConfig::default();
/// let state = AppState::new(Arc::new(backend), config);
/// ```
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: PatientStorage> AppState<S> {
    /// Creates a new AppState with the given storage and configuration.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a clone of the storage Arc.
    pub fn storage_arc(&self) -> Arc<S> {
        Arc::clone(&self.storage)
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the default page size for list endpoints.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// Builds an absolute `Location` URL for a record created under `path`.
    pub fn location(&self, path: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url().trim_end_matches('/'),
            path.trim_matches('/'),
            id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hospital_persistence::error::StorageResult;
    use hospital_persistence::types::{Pagination, PatientChart, PatientInput, StoredPatient};

    // Mock storage for testing
    struct MockStorage;

    #[async_trait]
    impl PatientStorage for MockStorage {
        fn backend_name(&self) -> &'static str {
            "mock"
        }

        async fn health_check(&self) -> StorageResult<()> {
            Ok(())
        }

        async fn create_patient(&self, _input: PatientInput) -> StorageResult<StoredPatient> {
            unimplemented!()
        }

        async fn read_patient(&self, _id: &str) -> StorageResult<Option<StoredPatient>> {
            unimplemented!()
        }

        async fn list_patients(&self, _page: Pagination) -> StorageResult<Vec<StoredPatient>> {
            unimplemented!()
        }

        async fn update_patient(
            &self,
            _id: &str,
            _input: PatientInput,
        ) -> StorageResult<StoredPatient> {
            unimplemented!()
        }

        async fn delete_patient(&self, _id: &str) -> StorageResult<StoredPatient> {
            unimplemented!()
        }

        async fn read_chart(&self, _id: &str) -> StorageResult<Option<PatientChart>> {
            unimplemented!()
        }
    }

    #[test]
    fn test_app_state_creation() {
        let storage = Arc::new(MockStorage);
        let config = ServerConfig::default();
        let state = AppState::new(storage, config);

        assert_eq!(state.storage().backend_name(), "mock");
        assert_eq!(state.default_page_size(), 10);
    }

    #[test]
    fn test_app_state_clone() {
        let state = AppState::new(Arc::new(MockStorage), ServerConfig::default());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.storage_arc(), &cloned.storage_arc()));
    }

    #[test]
    fn test_location() {
        let config = ServerConfig {
            base_url: "http://example.org/".to_string(),
            ..Default::default()
        };
        let state = AppState::new(Arc::new(MockStorage), config);

        assert_eq!(
            state.location("/patients/", "abc"),
            "http://example.org/patients/abc"
        );
        assert_eq!(
            state.location("/patients/p1/allergies", "a1"),
            "http://example.org/patients/p1/allergies/a1"
        );
    }
}
