//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

pub use crate::api::ApiError;
use crate::db::repository::RepositoryError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Missing, unknown or revoked credentials
    Unauthorized(String),
    /// Write rejected by a uniqueness invariant
    Conflict(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                let details = e.context().to_string();
                let (status, code) = match &e {
                    RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    RepositoryError::ValidationError { .. } => {
                        (StatusCode::BAD_REQUEST, "BAD_REQUEST")
                    }
                    RepositoryError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
                    RepositoryError::Unauthorized { .. } => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
                    }
                    RepositoryError::ConfigurationError { .. }
                    | RepositoryError::InternalError { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                (
                    status,
                    ApiError::new(code, e.message()).with_details(details),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!(code = %body.code, message = %body.message, "Request failed");
        } else {
            warn!(status = status.as_u16(), code = %body.code, message = %body.message, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_status() {
        let cases = [
            (RepositoryError::not_found("x"), StatusCode::NOT_FOUND),
            (RepositoryError::validation("x"), StatusCode::BAD_REQUEST),
            (RepositoryError::conflict("x"), StatusCode::CONFLICT),
            (RepositoryError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (RepositoryError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let (got, body) = AppError::from(err).status_and_body();
            assert_eq!(got, status);
            assert_eq!(body.message, "x");
        }
    }

    #[test]
    fn test_conflict_body() {
        let (status, body) = AppError::Conflict("order taken".into()).status_and_body();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "CONFLICT");
        assert_eq!(body.details, None);
    }
}
