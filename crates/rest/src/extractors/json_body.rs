//! JSON body extractor.
//!
//! Deserializes request bodies into typed payloads. Anything that prevents
//! the body from becoming the expected shape (invalid JSON, a missing
//! required field, a value of the wrong type) is reported as 422.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::RestError;

/// Axum extractor for a JSON request body of type `T`.
///
/// Unknown fields are ignored.
///
/// # Example
///
/// ```rust,ignore
/// use hospital_rest::extractors::JsonBody;
/// use hospital_persistence::types::PatientInput;
///
/// async fn create_handler(JsonBody(input): JsonBody<PatientInput>) {
///     println!("MRN: {}", input.mrn);
/// }
/// ```
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

/// Error type for JSON body extraction failures.
#[derive(Debug)]
pub enum JsonBodyRejection {
    /// The body could not be read.
    Unreadable {
        /// Status reported by the body reader (e.g. 413).
        status: StatusCode,
        /// Reader message.
        message: String,
    },
    /// The request declared a non-JSON content type.
    NotJson(String),
    /// The body is not valid JSON for the expected shape.
    Invalid(String),
}

impl From<JsonBodyRejection> for RestError {
    fn from(rejection: JsonBodyRejection) -> Self {
        match rejection {
            JsonBodyRejection::Unreadable { status, message }
                if status == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                RestError::PayloadTooLarge { message }
            }
            JsonBodyRejection::Unreadable { message, .. } => RestError::BadRequest { message },
            JsonBodyRejection::NotJson(content_type) => RestError::UnprocessableEntity {
                message: format!("Expected a JSON body, got content type '{}'", content_type),
            },
            JsonBodyRejection::Invalid(message) => RestError::UnprocessableEntity { message },
        }
    }
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        RestError::from(self).into_response()
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // A missing content type is read as JSON
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        if !content_type.contains("json") {
            return Err(JsonBodyRejection::NotJson(content_type));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            JsonBodyRejection::Unreadable {
                status: e.status(),
                message: e.body_text(),
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| JsonBodyRejection::Invalid(e.to_string()))
    }
}
