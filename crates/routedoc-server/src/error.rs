//! HTTP error responses produced by the framework itself.
//!
//! Every error the pipeline answers on its own (validation failures, body
//! problems, unhandled errors) goes through [`ApiError`], so clients always
//! see the same JSON shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use routedoc_core::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Framework-level error answered directly to the client.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - Unusable input that is not a parameter problem.
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// 400 Bad Request - One or more declared parameters failed validation.
    ValidationFailed {
        errors: Vec<ValidationError>,
    },

    /// 404 Not Found - Resource does not exist.
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// 415 Unsupported Media Type - Body is not acceptable JSON.
    UnsupportedMediaType {
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Optional details (logged, never sent to the client).
        details: Option<String>,
    },
}

impl ApiError {
    #[inline]
    #[must_use]
    pub fn internal(details: impl Into<String>) -> Self {
        Self::InternalError {
            details: Some(details.into()),
        }
    }

    #[inline]
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "message": "Validation failed",
    "errors": [{
        "message": "missing required parameter `species` in `body`",
        "parameter": "species",
        "in": "body"
    }]
}))]
pub struct ErrorResponse {
    /// Human-readable error message.
    #[schema(example = "Validation failed")]
    pub message: String,

    /// Per-parameter problems, present on validation failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub errors: Option<Vec<ValidationError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::UnsupportedMediaType { message } => ErrorResponse {
                message,
                errors: None,
            },

            Self::ValidationFailed { errors } => ErrorResponse {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },

            Self::InternalError { details } => {
                tracing::error!(details = ?details, "Internal server error");
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message } => write!(f, "Bad Request: {message}"),
            Self::ValidationFailed { errors } => {
                write!(f, "Validation failed: {} error(s)", errors.len())
            }
            Self::NotFound { message } => write!(f, "Not Found: {message}"),
            Self::UnsupportedMediaType { message } => {
                write!(f, "Unsupported Media Type: {message}")
            }
            Self::InternalError { .. } => f.write_str("Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {}
