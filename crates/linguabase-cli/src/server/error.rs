//! HTTP mapping of core errors
//!
//! Every handler failure becomes a JSON body `{"kind", "detail"}`, with the
//! field-level `violations` added for schema errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linguabase_core::{Error, ErrorKind};
use linguabase_schemas::{Rule, ValidationContext, ValidationErrors};
use serde::Serialize;
use tracing::{error, warn};

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// A core error on its way to an HTTP client
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::SchemaViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::UpstreamError { status: 404, .. } => StatusCode::NOT_FOUND,
            Error::UpstreamError { status: 503, .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::UpstreamError { .. }
            | Error::Malformed { .. }
            | Error::PersistenceFailure { .. }
            | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A request body that is not JSON at all
    pub fn unreadable_body(reason: impl std::fmt::Display) -> Self {
        Self::invalid_request(
            format!("request body is not valid JSON: {}", reason),
            Rule::Type,
            "a JSON document",
            "unparsable body",
        )
    }

    /// A single violation at the root of the request
    pub fn invalid_request(message: String, rule: Rule, expected: &str, actual: &str) -> Self {
        let errors = ValidationErrors::from(
            ValidationContext::root().error(message, rule, expected, actual),
        );
        Self(Error::invalid_request(errors))
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = %self.0.kind(), status = status.as_u16(), "request failed: {}", self.0);
        } else {
            warn!(kind = %self.0.kind(), status = status.as_u16(), "request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            kind: self.0.kind(),
            detail: self.0.detail(),
            violations: self.0.violations().cloned(),
        };
        (status, Json(body)).into_response()
    }
}
