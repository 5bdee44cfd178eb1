//! Attendance endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use crate::api::request::{ClockRequest, json_body, path_param, query_params};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::face::{self, ClockAction};
use crate::models::{AttendanceView, ManualAttendanceInput};
use crate::repo::{AttendanceQuery, AttendanceRepository};

/// GET /attendance
pub(super) async fn list_attendance(
    State(state): State<AppState>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let rows = state
        .with_db(|conn| AttendanceRepository::new(conn).list(&query))
        .traced(correlation_id)?;

    let views: Vec<AttendanceView> = rows.into_iter().map(AttendanceView::from).collect();
    Ok(json_response(StatusCode::OK, views))
}

/// POST /attendance
pub(super) async fn create_manual_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ManualAttendanceInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let row = state
        .with_db(|conn| face::record_manual_attendance(conn, &input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        attendance_id = row.id,
        employee_id = row.employee_id,
        actor = %actor.user,
        "Manual attendance recorded"
    );
    Ok(json_response(StatusCode::CREATED, AttendanceView::from(row)))
}

/// POST /attendance/clock
pub(super) async fn clock(
    State(state): State<AppState>,
    payload: Result<Json<ClockRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let now = state.now();
    let settings = &state.config().attendance;

    let outcome = state
        .with_db(|conn| {
            face::process_clock(conn, request.employee_id, &request.descriptor, now, settings)
        })
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = request.employee_id,
        action = ?outcome.action,
        distance = outcome.face_match.distance,
        "Clock processed"
    );
    let status = match outcome.action {
        ClockAction::TimeIn => StatusCode::CREATED,
        ClockAction::TimeOut => StatusCode::OK,
    };
    Ok(json_response(status, outcome))
}

/// DELETE /attendance/{id}
pub(super) async fn delete_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    state
        .with_db(|conn| AttendanceRepository::new(conn).soft_delete(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        attendance_id = id,
        actor = %actor.user,
        "Attendance deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
