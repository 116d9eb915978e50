//! Pagination extractor.
//!
//! Extracts `skip` / `limit` query parameters for list endpoints.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use hospital_persistence::core::PatientStorage;
use hospital_persistence::types::Pagination as Window;
use serde::Deserialize;

use crate::error::RestError;
use crate::state::AppState;

/// Axum extractor for pagination parameters.
///
/// `skip` defaults to 0 and `limit` to the configured default page size.
/// When a maximum page size is configured, `limit` is capped at it.
///
/// # Example
///
/// ```rust,ignore
/// use hospital_rest::extractors::Pagination;
///
/// async fn list_handler(pagination: Pagination) {
///     let window = pagination.window();
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    skip: usize,
    limit: usize,
}

/// Query parameters for pagination.
#[derive(Debug, Deserialize)]
struct PaginationQuery {
    skip: Option<usize>,
    limit: Option<usize>,
}

impl Pagination {
    /// Creates a new Pagination with the given values.
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    /// Returns the number of records to skip.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Returns the page size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the storage window for this page.
    pub fn window(&self) -> Window {
        Window::new(self.skip, self.limit)
    }
}

impl<S> FromRequestParts<AppState<S>> for Pagination
where
    S: PatientStorage + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: format!("Invalid pagination parameters: {}", e.body_text()),
            })?;

        let config = state.config();
        let limit = config.clamp_page_size(query.limit.unwrap_or(config.default_page_size));

        Ok(Pagination::new(query.skip.unwrap_or(0), limit))
    }
}
