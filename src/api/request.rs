//! Request types for the HRIS API.
//!
//! Most endpoints accept the model input types directly; this module holds
//! the request bodies and query strings that have no model counterpart, and
//! turns axum extractor rejections into JSON errors.

use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::FaceDescriptor;

use super::response::{ApiError, ApiErrorResponse};

/// Body of `POST /employees/{id}/face`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceEnrollmentRequest {
    /// The descriptor computed from the enrolment photo.
    pub descriptor: FaceDescriptor,
}

/// Body of `POST /attendance/clock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockRequest {
    /// The employee at the kiosk.
    pub employee_id: i64,
    /// The descriptor captured at the kiosk.
    pub descriptor: FaceDescriptor,
}

/// Query string of `GET /wage-rates/lookup`.
#[derive(Debug, Clone, Deserialize)]
pub struct WageLookupQuery {
    /// PSGC region code.
    pub region_code: String,
    /// Date to look up; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Query string of `GET /employees/{id}/wage-compliance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplianceQuery {
    /// Date to check against; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Query string of `GET /org-units`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeDeletedQuery {
    /// Include soft-deleted rows.
    #[serde(default)]
    pub include_deleted: bool,
}

/// Query string of `GET /psgc/regions/resolve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRegionQuery {
    /// Free-text region name.
    pub name: String,
}

/// Query string of `DELETE /psgc/cache`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheQuery {
    /// Only drop keys starting with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Unwraps a JSON body or produces a 400 response.
pub(super) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") || body_text.contains("unknown variant") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
                }
                JsonRejection::MissingJsonContentType(_) => ApiError::new(
                    "MISSING_CONTENT_TYPE",
                    "Content-Type must be application/json",
                ),
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(ApiErrorResponse::bad_request(error))
        }
    }
}

/// Unwraps a path parameter or produces a 400 response.
pub(super) fn path_param<T>(
    path: Result<Path<T>, PathRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    path.map(|Path(value)| value).map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid path parameter"
        );
        ApiErrorResponse::bad_request(ApiError::invalid_parameter(rejection.body_text()))
    })
}

/// Unwraps a query string or produces a 400 response.
pub(super) fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(value)| value).map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid query string"
        );
        ApiErrorResponse::bad_request(ApiError::invalid_parameter(rejection.body_text()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_request_deserializes() {
        let json = r#"{"employee_id": 7, "descriptor": [0.1, -0.2, 0.3]}"#;
        let request: ClockRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.employee_id, 7);
        assert_eq!(request.descriptor.as_slice().len(), 3);
    }

    #[test]
    fn test_lookup_date_is_optional() {
        let query: WageLookupQuery =
            serde_json::from_str(r#"{"region_code": "130000000"}"#).unwrap();
        assert!(query.date.is_none());
    }
}
