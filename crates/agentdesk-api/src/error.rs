//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The body
//! is always `{"error": message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No route matched the request method and path.
    #[error("Route not found")]
    RouteNotFound,

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// An invalid query parameter was provided.
    #[error("{0}")]
    InvalidQuery(String),

    /// A UUID could not be parsed from the request path.
    #[error("{0}")]
    InvalidUuid(String),

    /// The request body failed field validation.
    #[error("{0}")]
    Validation(String),

    /// The request body could not be decoded.
    #[error("Invalid request body")]
    InvalidBody,

    /// The request body exceeded the read limit or could not be read.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The write collides with an existing record.
    #[error("{0}")]
    Conflict(String),

    /// An internal error occurred. The message is generic; the cause has
    /// already been logged.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidQuery(_) | Self::InvalidUuid(_) | Self::Validation(_) | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log a store failure and turn it into a generic 500.
    pub fn store_failure(context: &str, err: &agentdesk_db::DbError) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_owned())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
