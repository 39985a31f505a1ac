//! Error types for client operations.
//!
//! Every failure carries the request it belongs to so callers can log or
//! display it without threading the method and path around themselves.

use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;

use crate::api::ApiError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// The request a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    /// Resource path relative to the base URL, e.g. `/subjects/42`
    pub path: String,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.method, self.path)
    }
}

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response within the configured timeout.
    #[error("Timeout error: no response within {timeout:?} {context}")]
    Timeout {
        context: RequestContext,
        timeout: Duration,
    },

    /// Connection, TLS, or other failure before a response arrived.
    #[error("Transport error: {source} {context}")]
    Transport {
        context: RequestContext,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Request failed with status {status} {context}")]
    Status {
        context: RequestContext,
        status: StatusCode,
        /// Raw response body, `None` when empty
        body: Option<String>,
    },

    /// A 2xx body did not match the expected shape.
    #[error("Failed to decode response body: {source} {context}")]
    Decode {
        context: RequestContext,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Status { body, .. } => body.as_deref(),
            ClientError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Structured server error, when the body follows the `ApiError` layout.
    pub fn api_error(&self) -> Option<ApiError> {
        self.body().and_then(|body| serde_json::from_str(body).ok())
    }

    pub fn context(&self) -> Option<&RequestContext> {
        match self {
            ClientError::Timeout { context, .. }
            | ClientError::Transport { context, .. }
            | ClientError::Status { context, .. }
            | ClientError::Decode { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode, body: Option<&str>) -> ClientError {
        ClientError::Status {
            context: RequestContext::new(Method::GET, "/subjects/42"),
            status,
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn test_status_error_accessors() {
        let err = status_error(StatusCode::NOT_FOUND, Some("{\"code\":\"NOT_FOUND\",\"message\":\"Subject not found\"}"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());
        let api_error = err.api_error().unwrap();
        assert_eq!(api_error.code, "NOT_FOUND");
        assert_eq!(api_error.message, "Subject not found");
    }

    #[test]
    fn test_display_includes_request() {
        let err = status_error(StatusCode::UNAUTHORIZED, None);
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("[GET /subjects/42]"));
        assert!(err.body().is_none());
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err = ClientError::Timeout {
            context: RequestContext::new(Method::POST, "/auth/login"),
            timeout: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert_eq!(err.context().unwrap().path, "/auth/login");
    }

    #[test]
    fn test_config_error_has_no_context() {
        let err = ClientError::Config("bad".to_string());
        assert!(err.context().is_none());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
