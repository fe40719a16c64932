//! Service error types with HTTP status code mapping.
//!
//! [`MeshimapError`] is the central error type. Each variant maps to a
//! specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1003,
///     "message": "sign-in required",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// Absence of a bookmark or visit record is never an error; those
/// lookups return `false` or `None`.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                      |
/// |-----------|-------------------|----------------------------------|
/// | 1000–1999 | Validation / Auth | 400 / 401 / 422                  |
/// | 2000–2999 | Not Found         | 404 Not Found                    |
/// | 3000–3999 | Upstream / Server | 502 Bad Gateway / 500            |
#[derive(Debug, thiserror::Error)]
pub enum MeshimapError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The geocoder found no coordinate for the given address.
    #[error("no location found for address: {0}")]
    AddressNotFound(String),

    /// The action needs a signed-in user and none was supplied.
    #[error("sign-in required")]
    Unauthenticated,

    /// Shop with the given ID was not found.
    #[error("shop not found: {0}")]
    ShopNotFound(String),

    /// User profile with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Document store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Geocoding service failure.
    #[error("geocoder error: {0}")]
    Geocoder(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MeshimapError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::AddressNotFound(_) => 1002,
            Self::Unauthenticated => 1003,
            Self::ShopNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::Store(_) => 3001,
            Self::Geocoder(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AddressNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::ShopNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Geocoder(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for MeshimapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("document (de)serialization failed: {err}"))
    }
}

impl IntoResponse for MeshimapError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
