//! Error handling for the OutageMap server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use outagemap::{OutageMapError, dedup::SelectionError, storage::StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// OutageMap library error
    #[error(transparent)]
    OutageMap(#[from] OutageMapError),

    /// Classification or resolution error
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        ServerError::OutageMap(OutageMapError::Storage(err))
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::Validation(_) => StatusCode::BAD_REQUEST,
        StorageError::AlreadyConfirmed(_) | StorageError::AlreadyMerged(_) => StatusCode::CONFLICT,
        StorageError::Authorization(_) => StatusCode::FORBIDDEN,
        e if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::OutageMap(OutageMapError::Storage(e)) => storage_status(e),
            ServerError::OutageMap(OutageMapError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::OutageMap(OutageMapError::Selection(e)) | ServerError::Selection(e) => {
                match e {
                    SelectionError::Validation(_) | SelectionError::NoSelection => {
                        StatusCode::BAD_REQUEST
                    }
                    SelectionError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
                }
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::OutageMap(OutageMapError::Storage(StorageError::NotFound(_))) => "not_found",
            ServerError::OutageMap(OutageMapError::Validation(_)) => "validation_error",
            ServerError::OutageMap(OutageMapError::Selection(SelectionError::Store { .. }))
            | ServerError::Selection(SelectionError::Store { .. }) => "store_unavailable",
            ServerError::OutageMap(_) => "outagemap_error",
            ServerError::Selection(_) => "selection_error",
            ServerError::Auth(_) => "authentication_error",
            ServerError::Validation(_) => "validation_error",
            ServerError::NotFound(_) => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Internal(_) => "internal_error",
            ServerError::Serialization(_) => "serialization_error",
        }
    }

    /// Extra context for the client. A failed store call returns the draft
    /// and point so the same selection can be retried.
    fn details(&self) -> Option<serde_json::Value> {
        let selection = match self {
            ServerError::Selection(e) | ServerError::OutageMap(OutageMapError::Selection(e)) => e,
            _ => return None,
        };
        match selection {
            SelectionError::Store { draft, point, .. } => Some(serde_json::json!({
                "retryable": true,
                "draft": draft,
                "point": point,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
            details: self.details(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Helper function to create a bad request error
pub fn bad_request(message: &str) -> ServerError {
    ServerError::BadRequest(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use outagemap::geo::DEFAULT_ORIGIN;
    use outagemap::models::{ReportDraft, ServiceType, ValidationError};

    #[test]
    fn test_status_codes() {
        let missing: ServerError = StorageError::NotFound("r1".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let invalid = ServerError::Selection(SelectionError::Validation(
            ValidationError::IncompleteDraft("provider"),
        ));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let offline = ServerError::Selection(SelectionError::Store {
            source: StorageError::Connection("down".into()),
            draft: ReportDraft::new(ServiceType::Water, "AyA"),
            point: DEFAULT_ORIGIN,
        });
        assert_eq!(offline.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let details = offline.details().unwrap();
        assert_eq!(details["retryable"], true);
        assert_eq!(details["draft"]["provider"], "AyA");
    }
}
