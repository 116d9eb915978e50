//! Axum extractors for request data.
//!
//! - [`JsonBody`] - Deserialize a JSON request body, rejecting with 422
//! - [`Pagination`] - Extract `skip` / `limit` parameters

mod json_body;
mod pagination;

pub use json_body::{JsonBody, JsonBodyRejection};
pub use pagination::Pagination;
