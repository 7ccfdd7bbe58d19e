//! API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_core::RelayError;
use serde::Serialize;

/// Error returned on the HTTP boundary, rendered in the common
/// chat-completion error shape.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorBodyInner,
}

#[derive(Debug, Serialize)]
struct ErrorBodyInner {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
    code: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400 with a validation code.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    /// 503 service unavailable.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            message,
        )
    }
}

impl From<RelayError> for ApiError {
    fn from(error: RelayError) -> Self {
        let status = match &error {
            RelayError::Validation { .. } => StatusCode::BAD_REQUEST,
            RelayError::SandboxUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::BackendUnavailable { .. } => StatusCode::BAD_GATEWAY,
            RelayError::GlobalTimeoutExceeded { .. } | RelayError::SandboxReadTimeout { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            code: error.code().to_string(),
            message: error.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorBodyInner {
                message: self.message,
                error_type: if self.status.is_client_error() {
                    "invalid_request_error".to_string()
                } else {
                    "server_error".to_string()
                },
                code: self.code,
            },
        };

        (self.status, Json(body)).into_response()
    }
}
