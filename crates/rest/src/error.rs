//! Error types for the patient records API.
//!
//! Every error is rendered as a JSON body of the form `{"detail": "..."}`
//! with a matching HTTP status code.
//!
//! # Error Mapping
//!
//! | Storage Error | HTTP Status |
//! |--------------|-------------|
//! | NotFound | 404 |
//! | ValidationError | 400 |
//! | Unavailable | 503 |
//! | any other BackendError | 500 |
//!
//! Request bodies that fail to deserialize are rejected with 422 before they
//! reach storage. Datastore failures never leak their message to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hospital_persistence::error::{BackendError, ResourceError, StorageError, ValidationError};
use std::fmt;
use tracing::error;

/// Detail returned for every 500 response.
const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Record not found (HTTP 404).
    NotFound {
        /// The record label (e.g., "Patient").
        resource_type: String,
        /// The requested ID.
        id: String,
    },

    /// Bad request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Request body could not be read as the expected shape (HTTP 422).
    UnprocessableEntity {
        /// Error message.
        message: String,
    },

    /// Request body exceeds the configured limit (HTTP 413).
    PayloadTooLarge {
        /// Error message.
        message: String,
    },

    /// Storage is not answering (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message. Logged, never returned to the client.
        message: String,
    },
}

impl RestError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the client-facing `detail` text.
    pub fn detail(&self) -> String {
        match self {
            RestError::NotFound { resource_type, .. } => format!("{} not found", resource_type),
            RestError::BadRequest { message }
            | RestError::UnprocessableEntity { message }
            | RestError::PayloadTooLarge { message }
            | RestError::ServiceUnavailable { message } => message.clone(),
            RestError::InternalError { .. } => INTERNAL_ERROR_DETAIL.to_string(),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { resource_type, id } => {
                write!(f, "{} not found: {}", resource_type, id)
            }
            RestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RestError::UnprocessableEntity { message } => {
                write!(f, "Unprocessable entity: {}", message)
            }
            RestError::PayloadTooLarge { message } => {
                write!(f, "Payload too large: {}", message)
            }
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = serde_json::json!({ "detail": self.detail() });
        (status, Json(body)).into_response()
    }
}

// Implement conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { resource_type, id } => {
                RestError::NotFound { resource_type, id }
            }
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable { .. } => RestError::ServiceUnavailable {
                message: err.to_string(),
            },
            _ => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RestError::NotFound {
            resource_type: "Patient".to_string(),
            id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Patient not found: 123");
        assert_eq!(err.detail(), "Patient not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let err = RestError::InternalError {
            message: "UNIQUE constraint failed: patients.mrn".to_string(),
        };
        assert_eq!(err.detail(), "Internal server error");
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err: RestError = StorageError::not_found("Allergy", "abc").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail(), "Allergy not found");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: RestError = StorageError::Validation(ValidationError::MissingOwner {
            table: "patient_allergies".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_errors() {
        let err: RestError = StorageError::Backend(BackendError::Unavailable {
            backend_name: "sqlite".to_string(),
            message: "pool timed out".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: RestError = StorageError::Backend(BackendError::QueryError {
            message: "syntax error".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
