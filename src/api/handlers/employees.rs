//! Employee endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::request::{
    ComplianceQuery, FaceEnrollmentRequest, json_body, path_param, query_params,
};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::face;
use crate::models::EmployeeInput;
use crate::repo::{EmployeeQuery, EmployeeRepository};
use crate::wage::check_compliance;

/// Summary returned after enrolling a face.
#[derive(Debug, Serialize)]
struct FaceEnrollment {
    employee_id: i64,
    descriptor_length: usize,
    enrolled_by: String,
}

/// GET /employees
pub(super) async fn list_employees(
    State(state): State<AppState>,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let employees = state
        .with_db(|conn| EmployeeRepository::new(conn).list(&query))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        count = employees.len(),
        "Employees listed"
    );
    Ok(json_response(StatusCode::OK, employees))
}

/// POST /employees
pub(super) async fn create_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let employee = state
        .with_db(|conn| EmployeeRepository::new(conn).create(&input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = employee.id,
        actor = %actor.user,
        "Employee created"
    );
    Ok(json_response(StatusCode::CREATED, employee))
}

/// GET /employees/{id}
pub(super) async fn get_employee(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;

    let employee = state
        .with_db(|conn| EmployeeRepository::new(conn).require(id))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, employee))
}

/// PUT /employees/{id}
pub(super) async fn update_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let employee = state
        .with_db(|conn| EmployeeRepository::new(conn).update(id, &input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = id,
        actor = %actor.user,
        "Employee updated"
    );
    Ok(json_response(StatusCode::OK, employee))
}

/// DELETE /employees/{id}
pub(super) async fn delete_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    state
        .with_db(|conn| EmployeeRepository::new(conn).soft_delete(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = id,
        actor = %actor.user,
        "Employee deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /employees/{id}/restore
pub(super) async fn restore_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    let employee = state
        .with_db(|conn| EmployeeRepository::new(conn).restore(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = id,
        actor = %actor.user,
        "Employee restored"
    );
    Ok(json_response(StatusCode::OK, employee))
}

/// GET /employees/{id}/wage-compliance
pub(super) async fn wage_compliance(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<ComplianceQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let as_of = query_params(query, correlation_id)?
        .date
        .unwrap_or_else(|| state.today());

    let compliance = state
        .with_db(|conn| check_compliance(conn, id, as_of))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = id,
        region_code = %compliance.region_code,
        compliant = compliance.compliant,
        shortfall = %compliance.shortfall,
        "Wage compliance checked"
    );
    Ok(json_response(StatusCode::OK, compliance))
}

/// POST /employees/{id}/face
pub(super) async fn enroll_face(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FaceEnrollmentRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let request = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);
    let settings = &state.config().attendance;

    let enrolled = state
        .with_db(|conn| face::enroll_face(conn, id, &request.descriptor, settings, &actor))
        .traced(correlation_id)?;

    Ok(json_response(
        StatusCode::CREATED,
        FaceEnrollment {
            employee_id: enrolled.employee_id,
            descriptor_length: enrolled.descriptor.as_slice().len(),
            enrolled_by: actor.user,
        },
    ))
}

/// DELETE /employees/{id}/face
pub(super) async fn remove_face(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;

    state
        .with_db(|conn| face::remove_face(conn, id))
        .traced(correlation_id)?;

    Ok(StatusCode::NO_CONTENT)
}
