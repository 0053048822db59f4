//! Server error types with HTTP status code mapping.
//!
//! [`PokerError`] is the central error type for the server. Domain,
//! repository and transport code all return it; each variant maps to a
//! numeric code, an HTTP status and a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::RoomId;

/// Structured JSON error response body.
///
/// All REST error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "room not found: sprint-42"
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
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                 |
/// |-----------|-------------------|-----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request             |
/// | 2000–2999 | Not Found / State | 404 Not Found / 409 Conflict|
/// | 3000–3999 | Server            | 500 / 503                   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PokerError {
    /// The estimate label is not `""`, `"?"`, `"∞"` or a base-10 integer.
    #[error("invalid point: {0}")]
    InvalidPointLabel(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No participant with the given name in the room.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No room with the given identifier, neither cached nor stored.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// The participant name is already taken in the room.
    ///
    /// Recoverable: joining twice refreshes the participant instead.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// Durable storage failed; the current transaction is aborted.
    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PokerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidPointLabel(_) => 1002,
            Self::UserNotFound(_) => 2001,
            Self::RoomNotFound(_) => 2002,
            Self::UserAlreadyExists(_) => 2003,
            Self::Internal(_) => 3000,
            Self::RepositoryUnavailable(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidPointLabel(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound(_) | Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists(_) => StatusCode::CONFLICT,
            Self::RepositoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for errors that abort a transaction because the
    /// backing store could not be reached.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RepositoryUnavailable(_) | Self::Internal(_))
    }
}

impl From<sqlx::Error> for PokerError {
    fn from(err: sqlx::Error) -> Self {
        Self::RepositoryUnavailable(err.to_string())
    }
}

impl IntoResponse for PokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_request() {
        let err = PokerError::InvalidPointLabel("abc".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
        assert_eq!(err.to_string(), "invalid point: abc");
    }

    #[test]
    fn not_found_maps_to_404() {
        let Ok(room_id) = RoomId::new("r1") else {
            panic!("valid room id");
        };
        let err = PokerError::RoomNotFound(room_id);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "room not found: r1");
        assert!(!err.is_fatal());
    }

    #[test]
    fn repository_errors_are_fatal() {
        let err = PokerError::RepositoryUnavailable("connection refused".to_string());
        assert!(err.is_fatal());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn into_response_carries_status() {
        let response = PokerError::UserAlreadyExists("alice".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
