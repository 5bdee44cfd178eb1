//! Response types for the HRIS API.
//!
//! This module defines the error body, the mapping from [`HrisError`] to
//! HTTP status codes, and the helpers handlers use to build JSON responses.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::HrisError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed request body error.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid path or query parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new("INVALID_PARAMETER", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<HrisError> for ApiErrorResponse {
    fn from(err: HrisError) -> Self {
        let message = err.to_string();
        let (status, error) = match err {
            HrisError::ConfigNotFound { path } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", path),
            ),
            HrisError::ConfigParseError { path, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration parse error", path),
            ),
            HrisError::Database { message } => {
                error!(error = %message, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Internal database error"),
                )
            }
            HrisError::NotFound { entity, .. } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details("NOT_FOUND", message, entity),
            ),
            HrisError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, field),
            ),
            HrisError::Conflict { .. } => (StatusCode::CONFLICT, ApiError::new("CONFLICT", message)),
            HrisError::FaceNotEnrolled { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("FACE_NOT_ENROLLED", message),
            ),
            HrisError::FaceMismatch { .. } => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("FACE_MISMATCH", message),
            ),
            HrisError::AttendanceComplete { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("ATTENDANCE_COMPLETE", message),
            ),
            HrisError::ClockTooSoon { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("CLOCK_TOO_SOON", message),
            ),
            HrisError::Upstream { .. } => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("UPSTREAM_ERROR", message),
            ),
            HrisError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiError::new("RATE_LIMITED", message),
            ),
        };
        Self { status, error }
    }
}

/// Converts a domain result into an API result, logging failures.
pub(super) trait Traced<T> {
    /// Maps the error to an [`ApiErrorResponse`] and logs it with the correlation id.
    fn traced(self, correlation_id: Uuid) -> Result<T, ApiErrorResponse>;
}

impl<T> Traced<T> for Result<T, HrisError> {
    fn traced(self, correlation_id: Uuid) -> Result<T, ApiErrorResponse> {
        self.map_err(|err| {
            warn!(correlation_id = %correlation_id, error = %err, "Request failed");
            err.into()
        })
    }
}

/// Builds a JSON response with an explicit content type.
pub(super) fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_validation_maps_to_bad_request_with_field() {
        let response: ApiErrorResponse = HrisError::validation("email", "bad").into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.details.as_deref(), Some("email"));
    }

    #[test]
    fn test_face_mismatch_is_unauthorized() {
        let response: ApiErrorResponse = HrisError::FaceMismatch {
            distance: 0.71,
            threshold: 0.6,
        }
        .into();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_attendance_complete_is_conflict() {
        let response: ApiErrorResponse = HrisError::AttendanceComplete {
            employee_id: 4,
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        }
        .into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "ATTENDANCE_COMPLETE");
    }

    #[test]
    fn test_database_details_are_hidden() {
        let response: ApiErrorResponse = HrisError::Database {
            message: "disk I/O error at /var/lib/hris".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.error.message.contains("/var/lib"));
    }

    #[test]
    fn test_upstream_and_rate_limit_statuses() {
        let upstream: ApiErrorResponse = HrisError::Upstream {
            message: "timeout".to_string(),
        }
        .into();
        let limited: ApiErrorResponse = HrisError::RateLimited { limit: 60 }.into();
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    }
}
